//! External token calls an operation schedules, and their compensation
//!
//! Interactions run after the ledgers are committed. If one is rejected, the
//! ones already performed are undone in reverse order. Pushing collateral out
//! and minting to a user cannot be undone, so an operation always schedules
//! them after every compensable step.

use alloy_primitives::{Address, U256};

use crate::error::{EngineError, EngineResult};
use crate::registry::CollateralRegistry;
use crate::token::SyntheticAsset;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    /// Collateral from a user into engine custody
    PullCollateral { asset: Address, from: Address, amount: U256 },
    /// Collateral out of engine custody
    PushCollateral { asset: Address, to: Address, amount: U256 },
    /// Synthetic tokens from a payer into engine custody
    PullSynthetic { from: Address, amount: U256 },
    /// Synthetic tokens out of engine custody
    PushSynthetic { to: Address, amount: U256 },
    MintSynthetic { to: Address, amount: U256 },
    /// Burn from engine custody
    BurnSynthetic { amount: U256 },
}

impl Interaction {
    /// The step that undoes this one, if any
    pub fn compensation(&self, engine: Address) -> Option<Interaction> {
        match *self {
            Interaction::PullCollateral { asset, from, amount } => {
                Some(Interaction::PushCollateral { asset, to: from, amount })
            }
            Interaction::PullSynthetic { from, amount } => {
                Some(Interaction::PushSynthetic { to: from, amount })
            }
            Interaction::BurnSynthetic { amount } => {
                Some(Interaction::MintSynthetic { to: engine, amount })
            }
            Interaction::PushCollateral { .. }
            | Interaction::PushSynthetic { .. }
            | Interaction::MintSynthetic { .. } => None,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Interaction::PullCollateral { .. } => "collateral transfer in",
            Interaction::PushCollateral { .. } => "collateral transfer out",
            Interaction::PullSynthetic { .. } => "synthetic transfer in",
            Interaction::PushSynthetic { .. } => "synthetic transfer out",
            Interaction::MintSynthetic { .. } => "mint",
            Interaction::BurnSynthetic { .. } => "burn",
        }
    }
}

/// Everything an interaction can touch
pub struct Counterparties<'a> {
    pub engine: Address,
    pub registry: &'a CollateralRegistry,
    pub synthetic: &'a dyn SyntheticAsset,
}

impl Counterparties<'_> {
    fn perform(&self, step: &Interaction) -> bool {
        log::debug!("interaction: {step:?}");
        match *step {
            Interaction::PullCollateral { asset, from, amount } => match self.registry.get(asset) {
                Ok(entry) => entry.token.transfer_from(self.engine, from, self.engine, amount),
                Err(_) => false,
            },
            Interaction::PushCollateral { asset, to, amount } => match self.registry.get(asset) {
                Ok(entry) => entry.token.transfer(self.engine, to, amount),
                Err(_) => false,
            },
            Interaction::PullSynthetic { from, amount } => {
                self.synthetic.transfer_from(self.engine, from, self.engine, amount)
            }
            Interaction::PushSynthetic { to, amount } => self.synthetic.transfer(self.engine, to, amount),
            Interaction::MintSynthetic { to, amount } => self.synthetic.mint(self.engine, to, amount),
            Interaction::BurnSynthetic { amount } => self.synthetic.burn(self.engine, amount),
        }
    }

    /// Run `steps` in order; on the first rejection undo the performed prefix
    pub fn dispatch(&self, steps: &[Interaction]) -> EngineResult<()> {
        for (i, step) in steps.iter().enumerate() {
            if self.perform(step) {
                continue;
            }
            log::warn!("{} rejected: {step:?}", step.describe());
            self.unwind(&steps[..i]);
            return Err(EngineError::TransferFailed(step.describe()));
        }
        Ok(())
    }

    fn unwind(&self, performed: &[Interaction]) {
        for step in performed.iter().rev() {
            match step.compensation(self.engine) {
                Some(undo) => {
                    if !self.perform(&undo) {
                        log::error!("compensation failed for {step:?}, custody diverges from ledger");
                    }
                }
                None => log::error!("cannot compensate {step:?}, custody diverges from ledger"),
            }
        }
    }
}
