//! CDP Engine Integration Tests
//!
//! Shared fixture: a WETH/WBTC engine over in-memory tokens and feeds with a
//! settable clock. Scenario, atomicity and property tests live under `tests/`.

use std::rc::Rc;

use cdp_engine::math::wad;
use cdp_engine::sim::{InMemoryToken, ManualClock, ManualPriceFeed};
use cdp_engine::{Address, Clock, Engine, EngineConfig, EngineResult, PriceOracle, Token, U256};

pub const START: u64 = 1_700_000_000;
/// $2000 at 8 decimals
pub const ETH_USD: i64 = 2_000_00000000;
/// $1000 at 8 decimals
pub const BTC_USD: i64 = 1_000_00000000;

pub fn user(n: u8) -> Address {
    Address::repeat_byte(n)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Fixture {
    pub engine: Engine,
    pub clock: Rc<ManualClock>,
    pub weth: Rc<InMemoryToken>,
    pub wbtc: Rc<InMemoryToken>,
    pub weth_feed: Rc<ManualPriceFeed>,
    pub wbtc_feed: Rc<ManualPriceFeed>,
    pub dsc: Rc<InMemoryToken>,
}

impl Fixture {
    pub fn new() -> Self {
        init_logging();

        let config = EngineConfig::default();
        let clock = Rc::new(ManualClock::new(START));
        let weth = Rc::new(InMemoryToken::new(Address::repeat_byte(0xEE), "WETH"));
        let wbtc = Rc::new(InMemoryToken::new(Address::repeat_byte(0xBB), "WBTC"));
        let weth_feed = Rc::new(ManualPriceFeed::new(8, ETH_USD, START));
        let wbtc_feed = Rc::new(ManualPriceFeed::new(8, BTC_USD, START));
        let dsc = Rc::new(InMemoryToken::with_owner(
            Address::repeat_byte(0x5D),
            "DSC",
            config.address,
        ));

        let engine = Engine::with_config(
            config,
            vec![weth.clone() as Rc<dyn Token>, wbtc.clone() as Rc<dyn Token>],
            vec![
                weth_feed.clone() as Rc<dyn PriceOracle>,
                wbtc_feed.clone() as Rc<dyn PriceOracle>,
            ],
            dsc.clone(),
        )
        .expect("fixture engine")
        .with_clock(clock.clone());

        Self {
            engine,
            clock,
            weth,
            wbtc,
            weth_feed,
            wbtc_feed,
            dsc,
        }
    }

    /// Give `who` whole units of both collaterals and approve the engine for everything
    pub fn fund(&self, who: Address, units: u64) {
        let spender = self.engine.address();
        for token in [&self.weth, &self.wbtc] {
            token.faucet(who, wad(units));
            token.approve(who, spender, U256::MAX);
        }
        self.dsc.approve(who, spender, U256::MAX);
    }

    /// Fund, deposit `units` of WETH and mint `debt` peg units
    pub fn open_weth(&self, who: Address, units: u64, debt: u64) -> EngineResult<()> {
        self.fund(who, units);
        self.engine
            .deposit_collateral_and_mint(who, self.weth.address(), wad(units), wad(debt))
    }

    /// Post a new WETH round at the current time
    pub fn set_eth_price(&self, answer: i64) {
        self.weth_feed.update_answer(answer, self.clock.now());
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
