//! Adversarial ledger steps: arbitrary mutations, rejected ones leave no trace

use cdp_engine::{EngineResult, Ledgers, U256};

use crate::generators::{asset_address, user_address, LedgerOp};
use crate::sanitizer::Sanitize;

pub fn apply(ledgers: &mut Ledgers, op: LedgerOp) -> EngineResult<()> {
    match op {
        LedgerOp::Credit { user, asset, amount } => ledgers
            .collateral
            .credit(user_address(user), asset_address(asset), U256::from(amount))
            .map(|_| ()),
        LedgerOp::Debit { user, asset, amount } => ledgers
            .collateral
            .debit(user_address(user), asset_address(asset), U256::from(amount))
            .map(|_| ()),
        LedgerOp::Mint { user, amount } => ledgers
            .debt
            .record_mint(user_address(user), U256::from(amount))
            .map(|_| ()),
        LedgerOp::Burn { user, amount } => ledgers
            .debt
            .record_burn(user_address(user), U256::from(amount))
            .map(|_| ()),
    }
}

/// Apply a sanitized op; on rejection return the untouched state
pub fn adversary_step(ledgers: Ledgers, op: LedgerOp) -> Ledgers {
    let mut next = ledgers.clone();
    match apply(&mut next, op.sanitize()) {
        Ok(()) => next,
        Err(_) => ledgers,
    }
}
