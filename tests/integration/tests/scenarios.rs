//! Engine scenarios: valuation, health gates and liquidation
//!
//! Prices are 8-decimal feeds; WETH starts at $2000, WBTC at $1000.

use cdp_engine::math::{wad, PRECISION};
use cdp_engine::{Address, EngineError, EngineEvent, OracleFault, SyntheticAsset, Token, U256};
use cdp_integration_tests::{user, Fixture, START};

/// 10 WETH at $2000 is worth $20000; 100 debt gives a health factor of 100
#[test]
fn test_deposit_and_mint_health_factor() {
    let f = Fixture::new();
    f.fund(user(1), 10);

    f.engine
        .deposit_collateral(user(1), f.weth.address(), wad(10))
        .unwrap();
    assert_eq!(f.engine.account_collateral_value(user(1)).unwrap(), wad(20_000));

    f.engine.mint_debt(user(1), wad(100)).unwrap();

    let info = f.engine.account_info(user(1)).unwrap();
    assert_eq!(info.debt_minted, wad(100));
    assert_eq!(info.collateral_value, wad(20_000));
    assert_eq!(f.engine.health_factor(user(1)).unwrap(), U256::from(10u64).pow(U256::from(20u64)));
}

#[test]
fn test_collateral_value_sums_assets() {
    let f = Fixture::new();
    f.fund(user(1), 10);

    f.engine.deposit_collateral(user(1), f.weth.address(), wad(2)).unwrap();
    f.engine.deposit_collateral(user(1), f.wbtc.address(), wad(3)).unwrap();

    // 2 * 2000 + 3 * 1000
    assert_eq!(f.engine.account_collateral_value(user(1)).unwrap(), wad(7_000));
    assert_eq!(f.engine.total_collateral_value().unwrap(), wad(7_000));
    assert_eq!(f.engine.supported_assets(), vec![f.weth.address(), f.wbtc.address()]);
}

#[test]
fn test_conversions() {
    let f = Fixture::new();

    assert_eq!(f.engine.peg_value_of_token(f.weth.address(), wad(15)).unwrap(), wad(30_000));
    // $100 of WETH is 0.05 units
    assert_eq!(
        f.engine.token_amount_from_peg_value(f.weth.address(), wad(100)).unwrap(),
        U256::from(50_000_000_000_000_000u64)
    );
}

#[test]
fn test_zero_amounts_rejected_for_every_asset() {
    let f = Fixture::new();
    f.fund(user(1), 10);
    f.open_weth(user(2), 10, 100).unwrap();

    for asset in f.engine.supported_assets() {
        assert_eq!(
            f.engine.deposit_collateral(user(1), asset, U256::ZERO),
            Err(EngineError::InvalidAmount)
        );
        assert_eq!(
            f.engine.redeem_collateral(user(2), asset, U256::ZERO),
            Err(EngineError::InvalidAmount)
        );
        assert_eq!(
            f.engine.deposit_collateral_and_mint(user(1), asset, wad(1), U256::ZERO),
            Err(EngineError::InvalidAmount)
        );
        assert_eq!(
            f.engine.redeem_collateral_for_debt(user(2), asset, U256::ZERO, wad(1)),
            Err(EngineError::InvalidAmount)
        );
        assert_eq!(
            f.engine.liquidate(user(1), asset, user(2), U256::ZERO),
            Err(EngineError::InvalidAmount)
        );
    }
    assert_eq!(f.engine.mint_debt(user(2), U256::ZERO), Err(EngineError::InvalidAmount));
    assert_eq!(f.engine.burn_debt(user(2), U256::ZERO), Err(EngineError::InvalidAmount));
}

#[test]
fn test_unknown_asset_rejected() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 100).unwrap();
    let unknown = Address::repeat_byte(0x77);
    let expected = Err(EngineError::AssetNotSupported(unknown));

    assert_eq!(f.engine.deposit_collateral(user(1), unknown, wad(1)), expected);
    assert_eq!(f.engine.redeem_collateral(user(1), unknown, wad(1)), expected);
    assert_eq!(
        f.engine.liquidate(user(2), unknown, user(1), wad(1)).map(|_| ()),
        expected
    );
    assert_eq!(
        f.engine.token_amount_from_peg_value(unknown, wad(1)).map(|_| ()),
        expected
    );
    assert_eq!(f.engine.peg_value_of_token(unknown, wad(1)).map(|_| ()), expected);
    assert_eq!(f.engine.collateral_balance(user(1), unknown), U256::ZERO);
    assert!(f.engine.oracle_of(unknown).is_none());
}

#[test]
fn test_mint_beyond_threshold_rejected() {
    let f = Fixture::new();
    f.fund(user(1), 10);

    let err = f
        .engine
        .deposit_collateral_and_mint(user(1), f.weth.address(), wad(10), wad(10_001))
        .unwrap_err();

    match err {
        EngineError::HealthFactorBroken { user: who, health_factor } => {
            assert_eq!(who, user(1));
            assert!(health_factor < PRECISION);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(f.engine.collateral_balance(user(1), f.weth.address()), U256::ZERO);
    assert_eq!(f.weth.balance_of(user(1)), wad(10));
}

/// Price drop breaks the position; a third party covers part of the debt
#[test]
fn test_liquidation_after_price_drop() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 9_000).unwrap();
    f.open_weth(user(2), 100, 20_000).unwrap();

    // Healthy positions cannot be liquidated
    assert_eq!(
        f.engine.liquidate(user(2), f.weth.address(), user(1), wad(1_000)),
        Err(EngineError::HealthFactorNotBroken { user: user(1) })
    );

    f.set_eth_price(1_400_00000000);
    let before = f.engine.health_factor(user(1)).unwrap();
    assert!(before < PRECISION);

    let supply_before = f.dsc.total_supply();
    let outcome = f
        .engine
        .liquidate(user(2), f.weth.address(), user(1), wad(4_500))
        .unwrap();

    assert_eq!(outcome.starting_health_factor, before);
    assert!(outcome.ending_health_factor > before);
    assert_eq!(outcome.ending_health_factor, f.engine.health_factor(user(1)).unwrap());
    assert_eq!(f.engine.debt_of(user(1)), wad(4_500));
    assert_eq!(f.dsc.total_supply(), supply_before - wad(4_500));
    assert_eq!(f.weth.balance_of(user(2)), outcome.quote.total_seized);
    assert_eq!(
        f.engine.collateral_balance(user(1), f.weth.address()),
        wad(10) - outcome.quote.total_seized
    );
    assert_eq!(
        outcome.quote.bonus,
        outcome.quote.collateral_seized / U256::from(10u64)
    );
}

/// Below ~55% collateral coverage the bonus makes every liquidation worse
#[test]
fn test_liquidation_that_worsens_position_reverts() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 10_000).unwrap();
    f.open_weth(user(2), 100, 2_000).unwrap();

    f.set_eth_price(1_000_00000000);
    let debt_before = f.engine.debt_of(user(1));

    let err = f
        .engine
        .liquidate(user(2), f.weth.address(), user(1), wad(1_000))
        .unwrap_err();

    assert!(matches!(err, EngineError::HealthFactorNotImproved { before, after } if after <= before));
    assert_eq!(f.engine.debt_of(user(1)), debt_before);
    assert_eq!(f.weth.balance_of(user(2)), U256::ZERO);
    assert_eq!(f.dsc.balance_of(user(2)), wad(2_000));
}

/// The liquidator's own position must stay healthy
#[test]
fn test_unhealthy_liquidator_rejected() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 9_000).unwrap();
    f.open_weth(user(2), 10, 9_500).unwrap();

    f.set_eth_price(1_400_00000000);

    let err = f
        .engine
        .liquidate(user(2), f.weth.address(), user(1), wad(1_000))
        .unwrap_err();

    assert!(matches!(err, EngineError::HealthFactorBroken { user: who, .. } if who == user(2)));
    assert_eq!(f.engine.debt_of(user(1)), wad(9_000));
}

#[test]
fn test_seizure_beyond_deposit_rejected() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 9_000).unwrap();
    f.open_weth(user(2), 100, 20_000).unwrap();
    f.set_eth_price(900_00000000);

    // 9000 of debt at $900 plus bonus is 11 WETH
    let err = f
        .engine
        .liquidate(user(2), f.weth.address(), user(1), wad(9_000))
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientCollateral { .. }));
}

#[test]
fn test_redeem_for_debt_closes_position() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 5_000).unwrap();

    f.engine
        .redeem_collateral_for_debt(user(1), f.weth.address(), wad(10), wad(5_000))
        .unwrap();

    assert_eq!(f.engine.debt_of(user(1)), U256::ZERO);
    assert_eq!(f.engine.health_factor(user(1)).unwrap(), U256::MAX);
    assert_eq!(f.weth.balance_of(user(1)), wad(10));
    assert_eq!(f.dsc.total_supply(), U256::ZERO);
    assert_eq!(f.engine.total_collateral(f.weth.address()), U256::ZERO);
    assert_eq!(f.engine.total_debt(), U256::ZERO);
}

#[test]
fn test_burn_then_redeem() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 10_000).unwrap();

    // At exactly 1.0 no collateral can leave
    assert!(f.engine.redeem_collateral(user(1), f.weth.address(), wad(1)).is_err());

    f.engine.burn_debt(user(1), wad(5_000)).unwrap();
    f.engine.redeem_collateral(user(1), f.weth.address(), wad(5)).unwrap();

    assert_eq!(f.engine.health_factor(user(1)).unwrap(), PRECISION);
}

#[test]
fn test_events_in_order() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 100).unwrap();
    f.engine.redeem_collateral(user(1), f.weth.address(), wad(4)).unwrap();

    assert_eq!(
        f.engine.events(),
        vec![
            EngineEvent::CollateralDeposited {
                user: user(1),
                asset: f.weth.address(),
                amount: wad(10),
            },
            EngineEvent::CollateralRedeemed {
                from: user(1),
                to: user(1),
                asset: f.weth.address(),
                amount: wad(4),
            },
        ]
    );
}

#[test]
fn test_stale_price_refused() {
    let f = Fixture::new();
    f.open_weth(user(1), 10, 100).unwrap();

    f.clock.set(START + 3 * 60 * 60 + 1);

    let err = f.engine.health_factor(user(1)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::OracleUnavailable { fault: OracleFault::Stale { .. }, .. }
    ));
    assert!(f.engine.mint_debt(user(1), wad(1)).is_err());

    // A fresh round restores service
    f.set_eth_price(2_000_00000000);
    f.engine.mint_debt(user(1), wad(1)).unwrap();
}

#[test]
fn test_non_positive_price_refused() {
    let f = Fixture::new();
    f.set_eth_price(0);

    let err = f.engine.peg_value_of_token(f.weth.address(), wad(1)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::OracleUnavailable { fault: OracleFault::NonPositivePrice(0), .. }
    ));
}

#[test]
fn test_missing_round_refused() {
    let f = Fixture::new();
    f.fund(user(1), 10);
    f.engine.deposit_collateral(user(1), f.weth.address(), wad(1)).unwrap();
    f.weth_feed.clear();

    // Debt-free accounts are still readable
    assert_eq!(f.engine.health_factor(user(1)).unwrap(), U256::MAX);
    assert!(matches!(
        f.engine.account_collateral_value(user(1)),
        Err(EngineError::OracleUnavailable { fault: OracleFault::NoRoundData, .. })
    ));
    assert!(f.engine.mint_debt(user(1), wad(1)).is_err());
}

#[test]
fn test_pure_health_factor() {
    let f = Fixture::new();

    assert_eq!(f.engine.calculate_health_factor(U256::ZERO, wad(1)), U256::MAX);
    assert_eq!(f.engine.calculate_health_factor(wad(100), wad(200)), PRECISION);
    assert_eq!(f.engine.calculate_health_factor(wad(100), U256::ZERO), U256::ZERO);
}
