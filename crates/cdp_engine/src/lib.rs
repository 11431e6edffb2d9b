//! Collateralized-debt engine
//!
//! Users deposit registered collateral assets, mint a unit-pegged synthetic
//! asset against them, and third parties liquidate positions whose health
//! factor falls below 1. All arithmetic is 256-bit and checked; no operation
//! panics on user input.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod guard;
pub mod health;
pub mod helpers;
pub mod interaction;
pub mod liquidation;
pub mod math;
pub mod oracle;
pub mod registry;
pub mod sim;
pub mod state;
pub mod token;
pub mod valuation;

// Re-export commonly used types
pub use alloy_primitives::{Address, U256};
pub use config::*;
pub use engine::Engine;
pub use error::*;
pub use events::EngineEvent;
pub use liquidation::{LiquidationOutcome, LiquidationQuote};
pub use oracle::{Clock, PriceOracle, RoundData, SystemClock};
pub use state::{AccountInfo, Ledgers};
pub use token::{SyntheticAsset, Token};
