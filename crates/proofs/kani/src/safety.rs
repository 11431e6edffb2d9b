//! Kani safety proofs for the health factor and the ledgers

use kani::{any, assume};
use cdp_engine::health::{calculate_health_factor, is_healthy};
use cdp_engine::helpers::totals_consistent;
use cdp_engine::valuation::{token_amount_for_peg_value, value_in_peg_units};
use cdp_engine::{Address, Ledgers, U256};
use crate::{adversary::*, generators::*, sanitizer::*};

/// H1: Health factor is total
/// Any debt and value yield a result; zero debt is never liquidatable
#[kani::proof]
fn h1_health_factor_total() {
    let debt = any_amount();
    let value = any_amount();

    let hf = calculate_health_factor(debt, value);
    if debt.is_zero() {
        kani::assert(hf == U256::MAX, "H1: zero debt must report MAX");
    }
}

/// H2: 200% collateral is exactly the boundary
#[kani::proof]
fn h2_double_collateral_is_healthy() {
    let debt = any_amount();
    let value = any_amount();
    assume(!debt.is_zero());

    let hf = calculate_health_factor(debt, value);
    let doubled = debt.saturating_mul(U256::from(2u64));
    if value >= doubled {
        kani::assert(is_healthy(hf), "H2: value >= 2 * debt must be healthy");
    } else {
        kani::assert(!is_healthy(hf), "H2: value < 2 * debt must be broken");
    }
}

/// H3: More collateral never lowers the health factor
#[kani::proof]
fn h3_monotone_in_collateral() {
    let debt = any_amount();
    let v1 = any_amount();
    let v2 = any_amount();
    assume(v1 <= v2);

    kani::assert(
        calculate_health_factor(debt, v1) <= calculate_health_factor(debt, v2),
        "H3: health factor must be monotone in collateral",
    );
}

/// V1: Conversions never panic and round toward zero
#[kani::proof]
fn v1_round_trip_never_gains() {
    let price = any_price().sanitize();
    let amount = any_amount();

    let value = value_in_peg_units(&price, amount);
    if let Ok(back) = token_amount_for_peg_value(Address::ZERO, &price, value) {
        kani::assert(back <= amount, "V1: round trip must not create collateral");
    }
}

/// S1: Rejected debit leaves the ledger untouched
#[kani::proof]
fn s1_debit_never_underflows() {
    let deposited: u16 = any();
    let requested: u16 = any();

    let mut ledgers = Ledgers::default();
    let user = user_address(0);
    let asset = asset_address(0);
    let _ = ledgers.collateral.credit(user, asset, U256::from(deposited));
    let before = ledgers.clone();

    match ledgers.collateral.debit(user, asset, U256::from(requested)) {
        Ok(left) => {
            kani::assert(requested <= deposited, "S1: debit beyond balance accepted");
            kani::assert(left == U256::from(deposited - requested), "S1: wrong remainder");
        }
        Err(_) => {
            kani::assert(requested > deposited, "S1: valid debit rejected");
            kani::assert(ledgers == before, "S1: rejected debit mutated state");
        }
    }
}

/// S2: Burn never exceeds recorded debt
#[kani::proof]
fn s2_burn_bounded_by_debt() {
    let minted: u16 = any();
    let burned: u16 = any();

    let mut ledgers = Ledgers::default();
    let user = user_address(1);
    let _ = ledgers.debt.record_mint(user, U256::from(minted));

    let result = ledgers.debt.record_burn(user, U256::from(burned));
    kani::assert(result.is_ok() == (burned <= minted), "S2: burn accepted iff covered");
    kani::assert(ledgers.debt.total() == ledgers.debt.debt(user), "S2: total drifted");
}

/// S3: Totals match positions across short adversarial sequences
#[kani::proof]
#[kani::unwind(6)]
fn s3_totals_consistent_across_sequences() {
    let mut ledgers = Ledgers::default();
    for op in any_ops() {
        ledgers = adversary_step(ledgers, op);
        kani::assert(totals_consistent(&ledgers), "S3: totals must equal summed positions");
    }
}
