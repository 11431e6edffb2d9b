//! Liquidation quote and improvement proofs
//!
//! **Key Properties:**
//! - Q1-Q2: Quote shape (bonus is 10%, seizure monotone in covered debt)
//! - L1: Near the boundary the bonus makes a liquidation worse, so the engine
//!   must reject it rather than accept a non-improving step

use kani::{any, assume};
use cdp_engine::health::calculate_health_factor;
use cdp_engine::liquidation::quote;
use cdp_engine::{Address, U256};
use crate::generators::*;
use crate::sanitizer::Sanitize;

/// Q1: Bonus is 10% of the debt-equivalent collateral
#[kani::proof]
fn q1_bonus_is_ten_percent() {
    let price = any_price().sanitize();
    let debt = any_amount();
    assume(!debt.is_zero());

    if let Ok(q) = quote(Address::ZERO, &price, debt) {
        kani::assert(q.bonus == q.collateral_seized / U256::from(10u64), "Q1: bonus must be 10%");
        kani::assert(q.total_seized == q.collateral_seized + q.bonus, "Q1: total must be seized + bonus");
    }
}

/// Q2: Covering more debt never seizes less
#[kani::proof]
fn q2_seizure_monotone() {
    let price = any_price().sanitize();
    let d1 = any_amount();
    let d2 = any_amount();
    assume(!d1.is_zero() && d1 <= d2);

    if let (Ok(q1), Ok(q2)) = (quote(Address::ZERO, &price, d1), quote(Address::ZERO, &price, d2)) {
        kani::assert(q1.total_seized <= q2.total_seized, "Q2: seizure must be monotone");
    }
}

/// L1: Below 110% coverage a liquidation cannot raise the health factor
///
/// Collateral value `c`, debt `d`, covered `10k` with `11k` of value seized.
#[kani::proof]
fn l1_no_improvement_below_bonus_coverage() {
    let c_raw: u16 = any();
    let d_raw: u16 = any();
    let k_raw: u8 = any();

    let c = (c_raw as u64) * 2;
    let d = d_raw as u64;
    let k = k_raw as u64;

    assume(k > 0);
    assume(10 * k < d);
    assume(11 * k <= c);
    assume(10 * c < 11 * d);

    let before = calculate_health_factor(U256::from(d), U256::from(c));
    let after = calculate_health_factor(U256::from(d - 10 * k), U256::from(c - 11 * k));

    kani::assert(after <= before, "L1: liquidation below 110% coverage must not improve");
}
