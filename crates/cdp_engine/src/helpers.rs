//! Invariant checking helpers

use alloy_primitives::{Address, U256};

use crate::engine::Engine;
use crate::error::EngineResult;
use crate::health::{is_healthy, is_liquidatable};
use crate::math::add_u256;
use crate::state::Ledgers;
use crate::token::{SyntheticAsset, Token};

/// Per-asset totals equal the sum of positions, total debt equals the sum of debts
pub fn totals_consistent(ledgers: &Ledgers) -> bool {
    let assets_ok = ledgers.collateral.assets().all(|(asset, total)| {
        let summed = ledgers
            .collateral
            .positions()
            .filter(|(_, a, _)| *a == asset)
            .fold(U256::ZERO, |acc, (_, _, amount)| add_u256(acc, amount));
        summed == total
    });
    let debt_summed = ledgers
        .debt
        .debts()
        .fold(U256::ZERO, |acc, (_, debt)| add_u256(acc, debt));

    assets_ok && debt_summed == ledgers.debt.total()
}

/// Every account with debt is at or above the minimum health factor
pub fn solvency_ok(engine: &Engine) -> EngineResult<bool> {
    for user in engine.accounts() {
        if engine.debt_of(user).is_zero() {
            continue;
        }
        if !is_healthy(engine.health_factor(user)?) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Synthetic supply does not exceed the peg value held in custody
pub fn supply_backed(engine: &Engine) -> EngineResult<bool> {
    Ok(engine.synthetic().total_supply() <= engine.total_collateral_value()?)
}

/// The engine's token balances cover every ledger total
pub fn custody_covers_ledger(engine: &Engine) -> bool {
    engine.supported_assets().into_iter().all(|asset| {
        engine
            .collateral_token(asset)
            .map(|token| token.balance_of(engine.address()) >= engine.total_collateral(asset))
            .unwrap_or(false)
    })
}

/// Accounts below the minimum health factor, lowest first
pub fn liquidatable_accounts(engine: &Engine) -> EngineResult<Vec<(Address, U256)>> {
    let mut broken = Vec::new();
    for user in engine.accounts() {
        let health_factor = engine.health_factor(user)?;
        if is_liquidatable(health_factor) {
            broken.push((user, health_factor));
        }
    }
    broken.sort_by_key(|&(user, health_factor)| (health_factor, user));
    Ok(broken)
}
