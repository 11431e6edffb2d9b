//! Property tests over random operation sequences

use cdp_engine::helpers::{custody_covers_ledger, solvency_ok, supply_backed, totals_consistent};
use cdp_engine::math::{wad, MIN_HEALTH_FACTOR};
use cdp_engine::{Address, Token, U256};
use cdp_integration_tests::{user, Fixture};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Deposit { who: u8, btc: bool, units: u64 },
    Mint { who: u8, units: u64 },
    Redeem { who: u8, btc: bool, units: u64 },
    Burn { who: u8, units: u64 },
    RedeemForDebt { who: u8, btc: bool, units: u64, debt: u64 },
    Liquidate { by: u8, who: u8, units: u64 },
}

impl Op {
    fn actor(&self) -> Address {
        match *self {
            Op::Deposit { who, .. }
            | Op::Mint { who, .. }
            | Op::Redeem { who, .. }
            | Op::Burn { who, .. }
            | Op::RedeemForDebt { who, .. } => user(who),
            Op::Liquidate { by, .. } => user(by),
        }
    }

    /// Deposits and burns can only raise the ratio and are not gated
    fn gated(&self) -> bool {
        !matches!(self, Op::Deposit { .. } | Op::Burn { .. })
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let who = 1u8..4;
    prop_oneof![
        (who.clone(), any::<bool>(), 1u64..20).prop_map(|(who, btc, units)| Op::Deposit { who, btc, units }),
        (who.clone(), 1u64..15_000).prop_map(|(who, units)| Op::Mint { who, units }),
        (who.clone(), any::<bool>(), 1u64..20).prop_map(|(who, btc, units)| Op::Redeem { who, btc, units }),
        (who.clone(), 1u64..5_000).prop_map(|(who, units)| Op::Burn { who, units }),
        (who.clone(), any::<bool>(), 1u64..10, 1u64..5_000)
            .prop_map(|(who, btc, units, debt)| Op::RedeemForDebt { who, btc, units, debt }),
        (who.clone(), who, 1u64..5_000).prop_map(|(by, who, units)| Op::Liquidate { by, who, units }),
    ]
}

fn apply(f: &Fixture, op: &Op) -> bool {
    let asset = |btc: bool| if btc { f.wbtc.address() } else { f.weth.address() };
    let result = match *op {
        Op::Deposit { who, btc, units } => f.engine.deposit_collateral(user(who), asset(btc), wad(units)),
        Op::Mint { who, units } => f.engine.mint_debt(user(who), wad(units)),
        Op::Redeem { who, btc, units } => f.engine.redeem_collateral(user(who), asset(btc), wad(units)),
        Op::Burn { who, units } => f.engine.burn_debt(user(who), wad(units)),
        Op::RedeemForDebt { who, btc, units, debt } => {
            f.engine
                .redeem_collateral_for_debt(user(who), asset(btc), wad(units), wad(debt))
        }
        Op::Liquidate { by, who, units } => f
            .engine
            .liquidate(user(by), f.weth.address(), user(who), wad(units))
            .map(|_| ()),
    };
    result.is_ok()
}

fn funded() -> Fixture {
    let f = Fixture::new();
    for n in 1..4 {
        f.fund(user(n), 1_000);
    }
    f
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// At fixed prices every account stays solvent and supply stays backed
    #[test]
    fn prop_fixed_prices_keep_everyone_solvent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let f = funded();
        for op in &ops {
            apply(&f, op);
            prop_assert!(totals_consistent(&f.engine.ledgers()));
            prop_assert!(custody_covers_ledger(&f.engine));
            prop_assert!(solvency_ok(&f.engine).unwrap());
            prop_assert!(supply_backed(&f.engine).unwrap());
        }
    }

    /// With moving prices, whoever just passed a health gate is healthy
    #[test]
    fn prop_successful_operation_leaves_actor_healthy(
        steps in prop::collection::vec((op_strategy(), 500u64..3_000), 1..40),
    ) {
        let f = funded();
        for (op, eth_usd) in &steps {
            f.set_eth_price(*eth_usd as i64 * 100_000_000);
            let before = f.engine.ledgers();

            if apply(&f, op) {
                if op.gated() {
                    let actor = op.actor();
                    let hf = f.engine.health_factor(actor).unwrap();
                    prop_assert!(f.engine.debt_of(actor).is_zero() || hf >= MIN_HEALTH_FACTOR);
                }
            } else {
                prop_assert_eq!(f.engine.ledgers(), before);
            }
            prop_assert!(totals_consistent(&f.engine.ledgers()));
            prop_assert!(custody_covers_ledger(&f.engine));
        }
    }

    /// Depositing a then b is the same as depositing a + b
    #[test]
    fn prop_deposits_accumulate(a in 1u64..1_000_000, b in 1u64..1_000_000) {
        let split = funded();
        let whole = funded();
        let weth = split.weth.address();
        let a = U256::from(a) * U256::from(1_000_000_000u64);
        let b = U256::from(b) * U256::from(1_000_000_000u64);

        split.engine.deposit_collateral(user(1), weth, a).unwrap();
        split.engine.deposit_collateral(user(1), weth, b).unwrap();
        whole.engine.deposit_collateral(user(1), weth, a + b).unwrap();

        prop_assert_eq!(
            split.engine.collateral_balance(user(1), weth),
            whole.engine.collateral_balance(user(1), weth)
        );
        prop_assert_eq!(
            split.engine.account_collateral_value(user(1)).unwrap(),
            whole.engine.account_collateral_value(user(1)).unwrap()
        );
        prop_assert_eq!(split.weth.balance_of(user(1)), whole.weth.balance_of(user(1)));
    }

    /// Converting to peg value and back loses at most one wei
    #[test]
    fn prop_value_round_trip(units in 1u64..1_000_000_000, eth_usd in 1u64..100_000) {
        let f = funded();
        f.set_eth_price(eth_usd as i64 * 100_000_000);
        let weth = f.weth.address();
        let amount = U256::from(units) * U256::from(1_000_000u64);

        let value = f.engine.peg_value_of_token(weth, amount).unwrap();
        let back = f.engine.token_amount_from_peg_value(weth, value).unwrap();

        prop_assert!(back <= amount);
        prop_assert!(amount - back <= U256::from(1u64));
    }
}
