//! Fixed-point constants and overflow-safe arithmetic helpers

use alloy_primitives::U256;

use crate::error::{EngineError, EngineResult};

/// Decimals of the peg unit and of every collateral amount
pub const PEG_DECIMALS: u8 = 18;

/// 1e18: peg-unit precision and the health-factor scale
pub const PRECISION: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Share of raw collateral value that counts toward debt (200% overcollateralized)
pub const LIQUIDATION_THRESHOLD_PCT: u64 = 50;

/// Extra collateral paid to a liquidator on top of the debt-equivalent amount
pub const LIQUIDATION_BONUS_PCT: u64 = 10;

/// Denominator for the percentages above
pub const LIQUIDATION_PRECISION: u64 = 100;

/// A health factor below this is broken
pub const MIN_HEALTH_FACTOR: U256 = PRECISION;

/// `n` whole units at 18 decimals
pub fn wad(n: u64) -> U256 {
    U256::from(n).saturating_mul(PRECISION)
}

/// 10^exp, `None` once it no longer fits
pub fn pow10(exp: u8) -> Option<U256> {
    let ten = U256::from(10u64);
    let mut acc = U256::from(1u64);
    for _ in 0..exp {
        acc = acc.checked_mul(ten)?;
    }
    Some(acc)
}

/// a * b / d, saturating the product; zero when d is zero
pub fn mul_div(a: U256, b: U256, d: U256) -> U256 {
    if d.is_zero() {
        return U256::ZERO;
    }
    a.saturating_mul(b) / d
}

/// `pct` percent of `amount`, truncated
pub fn percent_of(amount: U256, pct: u64) -> U256 {
    mul_div(amount, U256::from(pct), U256::from(LIQUIDATION_PRECISION))
}

/// Saturating add, for aggregation in read paths
pub fn add_u256(a: U256, b: U256) -> U256 {
    a.saturating_add(b)
}

/// Checked add, for ledger increments
pub fn checked_add(a: U256, b: U256) -> EngineResult<U256> {
    a.checked_add(b).ok_or(EngineError::ArithmeticOverflow)
}

/// Render an 18-decimal quantity with two fractional digits
pub fn format_wad(value: U256) -> String {
    if value == U256::MAX {
        return "inf".to_string();
    }
    let whole = value / PRECISION;
    let cents = (value % PRECISION) / U256::from(10_000_000_000_000_000u64);
    let cents = u64::try_from(cents).unwrap_or_default();
    format!("{whole}.{cents:02}")
}
