//! Ledger events, recorded at the point of mutation

use alloy_primitives::{Address, U256};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum EngineEvent {
    CollateralDeposited {
        user: Address,
        asset: Address,
        amount: U256,
    },
    CollateralRedeemed {
        from: Address,
        to: Address,
        asset: Address,
        amount: U256,
    },
}

impl EngineEvent {
    pub(crate) fn log(&self) {
        match self {
            EngineEvent::CollateralDeposited { user, asset, amount } => {
                log::info!("CollateralDeposited user={user} asset={asset} amount={amount}");
            }
            EngineEvent::CollateralRedeemed { from, to, asset, amount } => {
                log::info!("CollateralRedeemed from={from} to={to} asset={asset} amount={amount}");
            }
        }
    }
}
