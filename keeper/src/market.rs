//! In-memory market the keeper replays a scenario against

use crate::config::{Config, PositionConfig, PriceTick};
use anyhow::{Context, Result};
use cdp_engine::math::wad;
use cdp_engine::sim::{InMemoryToken, ManualClock, ManualPriceFeed};
use cdp_engine::{Clock, Engine, PriceOracle, Token, U256};
use std::rc::Rc;

/// One registered collateral asset
pub struct Listing {
    pub symbol: String,
    pub token: Rc<InMemoryToken>,
    pub feed: Rc<ManualPriceFeed>,
}

pub struct Market {
    pub engine: Engine,
    pub clock: Rc<ManualClock>,
    pub synthetic: Rc<InMemoryToken>,
    pub listings: Vec<Listing>,
    tick_interval_secs: u64,
}

impl Market {
    /// Create tokens, feeds and the engine described by `config`
    pub fn build(config: &Config) -> Result<Self> {
        let clock = Rc::new(ManualClock::new(config.start_timestamp));
        let synthetic = Rc::new(InMemoryToken::with_owner(
            config.synthetic,
            "DSC",
            config.engine.address,
        ));

        let listings: Vec<Listing> = config
            .collateral
            .iter()
            .map(|c| Listing {
                symbol: c.symbol.clone(),
                token: Rc::new(InMemoryToken::new(c.address, &c.symbol)),
                feed: Rc::new(ManualPriceFeed::new(
                    c.feed_decimals,
                    c.initial_answer,
                    config.start_timestamp,
                )),
            })
            .collect();

        let tokens = listings.iter().map(|l| l.token.clone() as Rc<dyn Token>).collect();
        let feeds = listings.iter().map(|l| l.feed.clone() as Rc<dyn PriceOracle>).collect();

        let engine = Engine::with_config(config.engine.clone(), tokens, feeds, synthetic.clone())
            .context("Failed to construct engine")?
            .with_clock(clock.clone());

        Ok(Self {
            engine,
            clock,
            synthetic,
            listings,
            tick_interval_secs: config.tick_interval_secs,
        })
    }

    pub fn listing(&self, symbol: &str) -> Result<&Listing> {
        self.listings
            .iter()
            .find(|l| l.symbol == symbol)
            .context(format!("Unknown collateral symbol: {}", symbol))
    }

    /// Fund the user, approve the engine and open the position
    pub fn open(&self, position: &PositionConfig) -> Result<()> {
        let listing = self.listing(&position.symbol)?;
        let spender = self.engine.address();

        listing.token.faucet(position.user, wad(position.collateral));
        listing.token.approve(position.user, spender, U256::MAX);
        self.synthetic.approve(position.user, spender, U256::MAX);

        let asset = listing.token.address();
        let collateral = wad(position.collateral);
        if position.debt == 0 {
            self.engine.deposit_collateral(position.user, asset, collateral)
        } else {
            self.engine
                .deposit_collateral_and_mint(position.user, asset, collateral, wad(position.debt))
        }
        .context(format!("Failed to open position for {}", position.user))?;

        log::info!(
            "Opened position {}: {} {} against {} debt",
            position.user,
            position.collateral,
            position.symbol,
            position.debt
        );
        Ok(())
    }

    /// Post a fresh round without moving the clock
    #[cfg(test)]
    pub fn set_price(&self, symbol: &str, answer: i64) -> Result<()> {
        let listing = self.listing(symbol)?;
        listing.feed.update_answer(answer, self.clock.now());
        Ok(())
    }

    /// Advance the clock one interval and post the tick's price
    ///
    /// Every other feed heartbeats its latest answer at the new time, so a
    /// scenario that only moves one symbol never lets the rest go stale.
    pub fn apply_tick(&self, tick: &PriceTick) -> Result<()> {
        let ticked = self.listing(&tick.symbol)?;
        self.clock.advance(self.tick_interval_secs);
        let now = self.clock.now();

        ticked.feed.update_answer(tick.answer, now);
        for listing in self.listings.iter().filter(|l| l.symbol != tick.symbol) {
            if let Some(answer) = listing.feed.latest_answer() {
                listing.feed.update_answer(answer, now);
            }
        }

        log::info!("Price tick: {} -> {}", tick.symbol, tick.answer);
        Ok(())
    }
}
