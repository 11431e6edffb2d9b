//! Engine error taxonomy

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Why a price could not be used for valuation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleFault {
    #[error("no round data")]
    NoRoundData,

    #[error("non-positive price {0}")]
    NonPositivePrice(i64),

    #[error("round {round_id} answered in earlier round {answered_in_round}")]
    IncompleteRound { round_id: u64, answered_in_round: u64 },

    #[error("price is {age_secs}s old (timeout {timeout_secs}s)")]
    Stale { age_secs: u64, timeout_secs: u64 },

    #[error("feed reports {0} decimals")]
    UnsupportedDecimals(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("amount must be more than zero")]
    InvalidAmount,

    #[error("asset {0} is not supported as collateral")]
    AssetNotSupported(Address),

    #[error("{assets} assets but {oracles} oracles")]
    LengthMismatch { assets: usize, oracles: usize },

    #[error("asset {0} listed more than once")]
    DuplicateAsset(Address),

    #[error("token transfer failed: {0}")]
    TransferFailed(&'static str),

    #[error("health factor {health_factor} of {user} is below minimum")]
    HealthFactorBroken { user: Address, health_factor: U256 },

    #[error("health factor of {user} is not broken")]
    HealthFactorNotBroken { user: Address },

    #[error("liquidation did not improve health factor ({before} -> {after})")]
    HealthFactorNotImproved { before: U256, after: U256 },

    #[error("oracle for {asset} unavailable: {fault}")]
    OracleUnavailable { asset: Address, fault: OracleFault },

    #[error("{user} has {available} of {asset} deposited, {requested} requested")]
    InsufficientCollateral {
        user: Address,
        asset: Address,
        available: U256,
        requested: U256,
    },

    #[error("{user} owes {owed}, cannot burn {requested}")]
    InsufficientDebt {
        user: Address,
        owed: U256,
        requested: U256,
    },

    #[error("re-entrant call into the engine")]
    ReentrantCall,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

pub type EngineResult<T> = Result<T, EngineError>;
