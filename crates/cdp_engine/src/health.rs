//! Health factor calculation
//!
//! health_factor = (collateral_value * 50 / 100) * 1e18 / debt
//!
//! A value of at least 1e18 means the threshold-adjusted collateral covers the
//! debt, i.e. the position is at least 200% collateralized. Debt-free accounts
//! report `U256::MAX` and can never be liquidated.

use alloy_primitives::U256;

use crate::math::{mul_div, percent_of, LIQUIDATION_THRESHOLD_PCT, MIN_HEALTH_FACTOR, PRECISION};

/// Pure health factor for a debt and a collateral value (both in peg units)
pub fn calculate_health_factor(total_debt: U256, collateral_value: U256) -> U256 {
    if total_debt.is_zero() {
        return U256::MAX;
    }
    let adjusted = percent_of(collateral_value, LIQUIDATION_THRESHOLD_PCT);
    mul_div(adjusted, PRECISION, total_debt)
}

pub fn is_healthy(health_factor: U256) -> bool {
    health_factor >= MIN_HEALTH_FACTOR
}

/// Liquidatable iff broken
pub fn is_liquidatable(health_factor: U256) -> bool {
    !is_healthy(health_factor)
}
