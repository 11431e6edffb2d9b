//! Collateral and debt ledgers
//!
//! The ledgers mirror what the engine has actually received or minted. All
//! increments are checked for overflow and all decrements for underflow; a
//! zero balance is kept as a valid terminal state rather than removed.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::math::checked_add;

/// Deposited collateral per (user, asset), with per-asset totals
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollateralLedger {
    positions: BTreeMap<(Address, Address), U256>,
    totals: BTreeMap<Address, U256>,
}

impl CollateralLedger {
    pub fn balance(&self, user: Address, asset: Address) -> U256 {
        self.positions.get(&(user, asset)).copied().unwrap_or_default()
    }

    /// Sum of all users' deposits of `asset`
    pub fn total(&self, asset: Address) -> U256 {
        self.totals.get(&asset).copied().unwrap_or_default()
    }

    /// Add to a position, returning the new balance
    pub fn credit(&mut self, user: Address, asset: Address, amount: U256) -> EngineResult<U256> {
        let balance = checked_add(self.balance(user, asset), amount)?;
        let total = checked_add(self.total(asset), amount)?;
        self.positions.insert((user, asset), balance);
        self.totals.insert(asset, total);
        Ok(balance)
    }

    /// Remove from a position, returning the new balance
    pub fn debit(&mut self, user: Address, asset: Address, amount: U256) -> EngineResult<U256> {
        let available = self.balance(user, asset);
        let balance = available
            .checked_sub(amount)
            .ok_or(EngineError::InsufficientCollateral {
                user,
                asset,
                available,
                requested: amount,
            })?;
        let total = self
            .total(asset)
            .checked_sub(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        self.positions.insert((user, asset), balance);
        self.totals.insert(asset, total);
        Ok(balance)
    }

    pub fn users(&self) -> impl Iterator<Item = Address> + '_ {
        self.positions.keys().map(|(user, _)| *user)
    }

    /// `(user, asset, amount)` in address order
    pub fn positions(&self) -> impl Iterator<Item = (Address, Address, U256)> + '_ {
        self.positions
            .iter()
            .map(|(&(user, asset), &amount)| (user, asset, amount))
    }

    pub fn assets(&self) -> impl Iterator<Item = (Address, U256)> + '_ {
        self.totals.iter().map(|(&asset, &total)| (asset, total))
    }
}

/// Outstanding synthetic debt per user
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DebtLedger {
    debts: BTreeMap<Address, U256>,
    total: U256,
}

impl DebtLedger {
    pub fn debt(&self, user: Address) -> U256 {
        self.debts.get(&user).copied().unwrap_or_default()
    }

    pub fn total(&self) -> U256 {
        self.total
    }

    pub fn record_mint(&mut self, user: Address, amount: U256) -> EngineResult<U256> {
        let debt = checked_add(self.debt(user), amount)?;
        self.total = checked_add(self.total, amount)?;
        self.debts.insert(user, debt);
        Ok(debt)
    }

    pub fn record_burn(&mut self, user: Address, amount: U256) -> EngineResult<U256> {
        let owed = self.debt(user);
        let debt = owed.checked_sub(amount).ok_or(EngineError::InsufficientDebt {
            user,
            owed,
            requested: amount,
        })?;
        self.total = self
            .total
            .checked_sub(amount)
            .ok_or(EngineError::ArithmeticOverflow)?;
        self.debts.insert(user, debt);
        Ok(debt)
    }

    pub fn users(&self) -> impl Iterator<Item = Address> + '_ {
        self.debts.keys().copied()
    }

    pub fn debts(&self) -> impl Iterator<Item = (Address, U256)> + '_ {
        self.debts.iter().map(|(&user, &debt)| (user, debt))
    }
}

/// Both ledgers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledgers {
    pub collateral: CollateralLedger,
    pub debt: DebtLedger,
}

impl Ledgers {
    /// Every user that has ever held a position, in address order
    pub fn accounts(&self) -> Vec<Address> {
        let users: BTreeSet<Address> = self.collateral.users().chain(self.debt.users()).collect();
        users.into_iter().collect()
    }
}

/// Prior value of one ledger entry; `None` means the key was absent
#[derive(Clone, Copy, Debug)]
enum Prior {
    Position { user: Address, asset: Address, balance: Option<U256> },
    AssetTotal { asset: Address, total: Option<U256> },
    Debt { user: Address, debt: Option<U256> },
    DebtTotal(U256),
}

/// Entries a transaction is about to touch, restored newest first on rollback
#[derive(Debug, Default)]
pub struct UndoLog {
    entries: Vec<Prior>,
}

impl UndoLog {
    /// Remember a collateral position and its asset total before they change
    pub fn save_collateral(&mut self, ledger: &CollateralLedger, user: Address, asset: Address) {
        self.entries.push(Prior::Position {
            user,
            asset,
            balance: ledger.positions.get(&(user, asset)).copied(),
        });
        self.entries.push(Prior::AssetTotal {
            asset,
            total: ledger.totals.get(&asset).copied(),
        });
    }

    /// Remember a user's debt and the debt total before they change
    pub fn save_debt(&mut self, ledger: &DebtLedger, user: Address) {
        self.entries.push(Prior::Debt {
            user,
            debt: ledger.debts.get(&user).copied(),
        });
        self.entries.push(Prior::DebtTotal(ledger.total));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put every saved entry back
    pub fn rollback(self, ledgers: &mut Ledgers) {
        for prior in self.entries.into_iter().rev() {
            match prior {
                Prior::Position { user, asset, balance } => {
                    restore(&mut ledgers.collateral.positions, (user, asset), balance)
                }
                Prior::AssetTotal { asset, total } => {
                    restore(&mut ledgers.collateral.totals, asset, total)
                }
                Prior::Debt { user, debt } => restore(&mut ledgers.debt.debts, user, debt),
                Prior::DebtTotal(total) => ledgers.debt.total = total,
            }
        }
    }
}

fn restore<K: Ord>(map: &mut BTreeMap<K, U256>, key: K, prior: Option<U256>) {
    match prior {
        Some(value) => {
            map.insert(key, value);
        }
        None => {
            map.remove(&key);
        }
    }
}

/// Derived account view, recomputed from live prices on every read
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub debt_minted: U256,
    pub collateral_value: U256,
}
