//! State space sanitizer - bounds values for Kani exploration

use cdp_engine::oracle::Price;
use cdp_engine::U256;

use crate::generators::LedgerOp;

pub const N_USERS: u8 = 3;
pub const N_ASSETS: u8 = 2;
pub const MAX_STEPS: u8 = 4;

/// Bounds for tractable verification
const MAX_AMOUNT: u64 = 10_000;
const MAX_ANSWER: u64 = 1_000_000_000_000;

pub trait Sanitize {
    fn sanitize(self) -> Self;
}

impl Sanitize for LedgerOp {
    fn sanitize(self) -> LedgerOp {
        let clamp = |amount: u64| amount % MAX_AMOUNT;
        match self {
            LedgerOp::Credit { user, asset, amount } => LedgerOp::Credit {
                user: user % N_USERS,
                asset: asset % N_ASSETS,
                amount: clamp(amount),
            },
            LedgerOp::Debit { user, asset, amount } => LedgerOp::Debit {
                user: user % N_USERS,
                asset: asset % N_ASSETS,
                amount: clamp(amount),
            },
            LedgerOp::Mint { user, amount } => LedgerOp::Mint {
                user: user % N_USERS,
                amount: clamp(amount),
            },
            LedgerOp::Burn { user, amount } => LedgerOp::Burn {
                user: user % N_USERS,
                amount: clamp(amount),
            },
        }
    }
}

impl Sanitize for Price {
    fn sanitize(self) -> Price {
        let max = U256::from(MAX_ANSWER);
        let answer = if self.answer.is_zero() {
            U256::from(1u64)
        } else if self.answer > max {
            self.answer % max + U256::from(1u64)
        } else {
            self.answer
        };
        // Ensure non-zero scale to avoid division issues
        let feed_scale = if self.feed_scale.is_zero() {
            U256::from(1u64)
        } else {
            self.feed_scale
        };
        Price { answer, feed_scale }
    }
}
