//! Conversions between collateral amounts and peg units
//!
//! Amounts carry 18 decimals and so do peg values; a feed's answer is lifted
//! to 18 decimals by `Price::feed_scale`, so for an 8-decimal feed
//! `value = amount * answer * 1e10 / 1e18`. Results truncate toward zero.

use alloy_primitives::{Address, U256};

use crate::error::{EngineError, EngineResult, OracleFault};
use crate::math::{mul_div, PRECISION};
use crate::oracle::Price;

/// Value of `amount` collateral in peg units
pub fn value_in_peg_units(price: &Price, amount: U256) -> U256 {
    mul_div(price.scaled(), amount, PRECISION)
}

/// Collateral amount worth `peg_amount` peg units
pub fn token_amount_for_peg_value(
    asset: Address,
    price: &Price,
    peg_amount: U256,
) -> EngineResult<U256> {
    if peg_amount.is_zero() {
        return Err(EngineError::InvalidAmount);
    }
    let scaled = price.scaled();
    if scaled.is_zero() {
        return Err(EngineError::OracleUnavailable {
            asset,
            fault: OracleFault::NonPositivePrice(0),
        });
    }
    Ok(mul_div(peg_amount, PRECISION, scaled))
}
