//! Price oracle capability and round validation
//!
//! The engine never trusts a raw answer: a round must be complete, positive
//! and younger than the configured timeout before it is used for valuation.

use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{Address, U256};

use crate::error::{EngineError, EngineResult, OracleFault};
use crate::math::{pow10, PEG_DECIMALS};

/// Latest round reported by a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundData {
    pub round_id: u64,
    /// Price scaled by 10^decimals
    pub answer: i64,
    pub started_at: u64,
    /// Unix seconds, zero when the round never completed
    pub updated_at: u64,
    pub answered_in_round: u64,
}

/// External price feed for one collateral asset
pub trait PriceOracle {
    /// Fractional digits of `RoundData::answer`
    fn decimals(&self) -> u8;

    /// `None` when the feed has never reported
    fn latest_round_data(&self) -> Option<RoundData>;
}

/// Source of the current unix time in seconds
pub trait Clock {
    fn now(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A validated price together with the factor that lifts it to 18 decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub answer: U256,
    pub feed_scale: U256,
}

impl Price {
    /// Price expressed with 18 fractional digits
    pub fn scaled(&self) -> U256 {
        self.answer.saturating_mul(self.feed_scale)
    }
}

/// Read the feed and reject unusable rounds
pub fn checked_price(
    asset: Address,
    oracle: &dyn PriceOracle,
    clock: &dyn Clock,
    timeout_secs: Option<u64>,
) -> EngineResult<Price> {
    let fault = |fault| EngineError::OracleUnavailable { asset, fault };

    let decimals = oracle.decimals();
    if decimals > PEG_DECIMALS {
        return Err(fault(OracleFault::UnsupportedDecimals(decimals)));
    }
    let feed_scale = pow10(PEG_DECIMALS - decimals)
        .ok_or(fault(OracleFault::UnsupportedDecimals(decimals)))?;

    let round = oracle
        .latest_round_data()
        .ok_or(fault(OracleFault::NoRoundData))?;

    if round.updated_at == 0 {
        return Err(fault(OracleFault::NoRoundData));
    }
    if round.answered_in_round < round.round_id {
        return Err(fault(OracleFault::IncompleteRound {
            round_id: round.round_id,
            answered_in_round: round.answered_in_round,
        }));
    }
    if let Some(timeout_secs) = timeout_secs {
        let age_secs = clock.now().saturating_sub(round.updated_at);
        if age_secs > timeout_secs {
            return Err(fault(OracleFault::Stale { age_secs, timeout_secs }));
        }
    }
    if round.answer <= 0 {
        return Err(fault(OracleFault::NonPositivePrice(round.answer)));
    }

    Ok(Price {
        answer: U256::from(round.answer.unsigned_abs()),
        feed_scale,
    })
}
