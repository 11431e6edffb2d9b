//! Manually driven price feed and clock

use std::cell::{Cell, RefCell};

use crate::oracle::{Clock, PriceOracle, RoundData};

/// Price feed whose rounds are pushed by the test or simulation driving it
#[derive(Debug)]
pub struct ManualPriceFeed {
    decimals: u8,
    round: RefCell<Option<RoundData>>,
}

impl ManualPriceFeed {
    /// Create a feed whose first round reports `answer` at `timestamp`
    pub fn new(decimals: u8, answer: i64, timestamp: u64) -> Self {
        Self {
            decimals,
            round: RefCell::new(Some(RoundData {
                round_id: 1,
                answer,
                started_at: timestamp,
                updated_at: timestamp,
                answered_in_round: 1,
            })),
        }
    }

    /// Publish a new round
    pub fn update_answer(&self, answer: i64, timestamp: u64) {
        let mut round = self.round.borrow_mut();
        let round_id = round.as_ref().map(|r| r.round_id).unwrap_or(0) + 1;
        *round = Some(RoundData {
            round_id,
            answer,
            started_at: timestamp,
            updated_at: timestamp,
            answered_in_round: round_id,
        });
    }

    /// Overwrite the latest round verbatim
    pub fn set_round(&self, round: RoundData) {
        *self.round.borrow_mut() = Some(round);
    }

    /// Forget every round, as a feed that never reported
    pub fn clear(&self) {
        *self.round.borrow_mut() = None;
    }

    pub fn latest_answer(&self) -> Option<i64> {
        self.round.borrow().as_ref().map(|r| r.answer)
    }
}

impl PriceOracle for ManualPriceFeed {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn latest_round_data(&self) -> Option<RoundData> {
        *self.round.borrow()
    }
}

/// Settable unix clock
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get().saturating_add(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.get()
    }
}
