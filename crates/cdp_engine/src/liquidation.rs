//! Liquidation quote and outcome

use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::error::EngineResult;
use crate::math::{checked_add, percent_of, LIQUIDATION_BONUS_PCT};
use crate::oracle::Price;
use crate::valuation::token_amount_for_peg_value;

/// Collateral a liquidator receives for covering `debt_to_cover`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LiquidationQuote {
    pub debt_to_cover: U256,
    /// Debt-equivalent collateral at the current price
    pub collateral_seized: U256,
    pub bonus: U256,
    pub total_seized: U256,
}

pub fn quote(asset: Address, price: &Price, debt_to_cover: U256) -> EngineResult<LiquidationQuote> {
    let collateral_seized = token_amount_for_peg_value(asset, price, debt_to_cover)?;
    let bonus = percent_of(collateral_seized, LIQUIDATION_BONUS_PCT);
    let total_seized = checked_add(collateral_seized, bonus)?;

    Ok(LiquidationQuote {
        debt_to_cover,
        collateral_seized,
        bonus,
        total_seized,
    })
}

/// Result of a successful liquidation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LiquidationOutcome {
    pub user: Address,
    pub liquidator: Address,
    pub asset: Address,
    pub quote: LiquidationQuote,
    pub starting_health_factor: U256,
    pub ending_health_factor: U256,
}
