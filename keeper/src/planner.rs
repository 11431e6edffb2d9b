//! Liquidation planning
//!
//! Picks the collateral asset a broken account holds the most value in and
//! sizes `debt_to_cover` so the seizure, bonus included, fits that deposit.

use cdp_engine::math::{mul_div, percent_of, LIQUIDATION_BONUS_PCT, LIQUIDATION_PRECISION};
use cdp_engine::{Address, Engine, EngineError, Token, U256};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidationPlan {
    pub user: Address,
    pub asset: Address,
    pub debt_to_cover: U256,
    /// Collateral the liquidator expects, bonus included
    pub expected_seizure: U256,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("account {0} has no debt")]
    NoDebt(Address),
    #[error("account {0} has no collateral")]
    NoCollateral(Address),
    #[error("liquidator {0} holds no synthetic balance")]
    NoFunds(Address),
    #[error("close factor leaves nothing to cover")]
    NothingToCover,
    #[error("seizure {needed} exceeds deposit {available}")]
    SeizureTooLarge { needed: U256, available: U256 },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Plan one liquidation of `user` funded by `liquidator`'s synthetic balance
pub fn plan(
    engine: &Engine,
    user: Address,
    liquidator: Address,
    close_factor_pct: u64,
) -> Result<LiquidationPlan, PlanError> {
    let debt = engine.debt_of(user);
    if debt.is_zero() {
        return Err(PlanError::NoDebt(user));
    }

    let (asset, deposited, value) = largest_holding(engine, user)?.ok_or(PlanError::NoCollateral(user))?;

    let funds = engine.synthetic().balance_of(liquidator);
    if funds.is_zero() {
        return Err(PlanError::NoFunds(liquidator));
    }

    // value / 1.1: the most debt this deposit can pay out with the bonus
    let coverable = mul_div(
        value,
        U256::from(LIQUIDATION_PRECISION),
        U256::from(LIQUIDATION_PRECISION + LIQUIDATION_BONUS_PCT),
    );
    let debt_to_cover = percent_of(debt, close_factor_pct).min(funds).min(coverable);
    if debt_to_cover.is_zero() {
        return Err(PlanError::NothingToCover);
    }

    let quote = engine.quote_liquidation(asset, debt_to_cover)?;
    if quote.total_seized > deposited {
        return Err(PlanError::SeizureTooLarge {
            needed: quote.total_seized,
            available: deposited,
        });
    }

    Ok(LiquidationPlan {
        user,
        asset,
        debt_to_cover,
        expected_seizure: quote.total_seized,
    })
}

/// `(asset, deposited, value)` of the user's most valuable deposit
fn largest_holding(engine: &Engine, user: Address) -> Result<Option<(Address, U256, U256)>, PlanError> {
    let mut best: Option<(Address, U256, U256)> = None;
    for asset in engine.supported_assets() {
        let deposited = engine.collateral_balance(user, asset);
        if deposited.is_zero() {
            continue;
        }
        let value = engine.peg_value_of_token(asset, deposited)?;
        if best.map_or(true, |(_, _, v)| value > v) {
            best = Some((asset, deposited, value));
        }
    }
    Ok(best)
}
