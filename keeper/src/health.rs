//! Account health snapshots read from the engine

use anyhow::Result;
use cdp_engine::health::{is_healthy, is_liquidatable};
use cdp_engine::math::{percent_of, LIQUIDATION_PRECISION, MIN_HEALTH_FACTOR};
use cdp_engine::{Address, Engine, U256};
use serde::Serialize;

/// Health snapshot of one account at the current prices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountHealth {
    pub user: Address,
    /// 1e18 = exactly at the minimum
    pub health_factor: U256,
    pub debt: U256,
    pub collateral_value: U256,
}

impl AccountHealth {
    /// Check if account can be liquidated
    pub fn needs_liquidation(&self) -> bool {
        is_liquidatable(self.health_factor)
    }

    /// Healthy, but within `buffer_pct` percent of the minimum
    pub fn in_warning_zone(&self, buffer_pct: u64) -> bool {
        let ceiling = percent_of(MIN_HEALTH_FACTOR, LIQUIDATION_PRECISION + buffer_pct);
        is_healthy(self.health_factor) && self.health_factor < ceiling
    }
}

/// Read one account's debt, collateral value and health factor
pub fn assess(engine: &Engine, user: Address) -> Result<AccountHealth> {
    let info = engine.account_info(user)?;
    Ok(AccountHealth {
        user,
        health_factor: engine.calculate_health_factor(info.debt_minted, info.collateral_value),
        debt: info.debt_minted,
        collateral_value: info.collateral_value,
    })
}

/// Assess every account except `skip`
///
/// Accounts whose collateral cannot be priced are logged and left out.
pub fn scan(engine: &Engine, skip: &[Address]) -> Vec<AccountHealth> {
    engine
        .accounts()
        .into_iter()
        .filter(|user| !skip.contains(user))
        .filter_map(|user| match assess(engine, user) {
            Ok(health) => Some(health),
            Err(e) => {
                log::warn!("Cannot assess {}: {:#}", user, e);
                None
            }
        })
        .collect()
}
