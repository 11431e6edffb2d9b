//! Engine configuration

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Maximum age of a price round before it is refused: 3 hours
pub const DEFAULT_PRICE_TIMEOUT_SECS: u64 = 3 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Custody account for collateral and mint/burn authority over the synthetic asset
    pub address: Address,

    /// Maximum accepted round age in seconds; `None` accepts any age
    pub price_timeout_secs: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            address: Address::repeat_byte(0xCD),
            price_timeout_secs: Some(DEFAULT_PRICE_TIMEOUT_SECS),
        }
    }
}
