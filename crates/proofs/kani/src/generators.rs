//! Generators for arbitrary ledger operations and prices (for Kani)

#[cfg(kani)]
use kani::any;
use arrayvec::ArrayVec;
use cdp_engine::math::pow10;
use cdp_engine::oracle::Price;
use cdp_engine::{Address, U256};

use crate::sanitizer::{MAX_STEPS, N_ASSETS, N_USERS};

/// One raw ledger mutation, indices into small user/asset pools
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerOp {
    Credit { user: u8, asset: u8, amount: u64 },
    Debit { user: u8, asset: u8, amount: u64 },
    Mint { user: u8, amount: u64 },
    Burn { user: u8, amount: u64 },
}

pub fn user_address(idx: u8) -> Address {
    Address::repeat_byte(idx % N_USERS + 1)
}

pub fn asset_address(idx: u8) -> Address {
    Address::repeat_byte(0xA0 + idx % N_ASSETS)
}

/// Price for a feed with `decimals` and a raw answer
pub fn price_from(decimals: u8, answer: u64) -> Price {
    Price {
        answer: U256::from(answer),
        feed_scale: pow10(18 - decimals.min(18)).unwrap_or(U256::from(1u64)),
    }
}

#[cfg(kani)]
pub fn any_amount() -> U256 {
    let raw: u32 = any();
    U256::from(raw)
}

#[cfg(kani)]
pub fn any_price() -> Price {
    let decimals: u8 = any();
    let answer: u32 = any();
    price_from(decimals % 19, answer as u64)
}

#[cfg(kani)]
pub fn any_op() -> LedgerOp {
    let kind: u8 = any();
    let user: u8 = any();
    let asset: u8 = any();
    let amount: u16 = any();
    let amount = amount as u64;

    match kind % 4 {
        0 => LedgerOp::Credit { user, asset, amount },
        1 => LedgerOp::Debit { user, asset, amount },
        2 => LedgerOp::Mint { user, amount },
        _ => LedgerOp::Burn { user, amount },
    }
}

#[cfg(kani)]
pub fn any_ops() -> ArrayVec<LedgerOp, { MAX_STEPS as usize }> {
    let mut ops = ArrayVec::new();
    let steps: u8 = any();
    for _ in 0..(steps % MAX_STEPS) + 1 {
        let _ = ops.try_push(any_op());
    }
    ops
}

/// Deterministic sequence for non-kani tests
pub fn scripted_ops(seed: u8) -> ArrayVec<LedgerOp, { MAX_STEPS as usize }> {
    let mut ops = ArrayVec::new();
    for i in 0..MAX_STEPS {
        let v = seed.wrapping_mul(31).wrapping_add(i.wrapping_mul(17));
        let amount = (v as u64) % 50;
        let op = match v % 4 {
            0 => LedgerOp::Credit { user: v, asset: i, amount },
            1 => LedgerOp::Debit { user: v, asset: i, amount },
            2 => LedgerOp::Mint { user: v, amount },
            _ => LedgerOp::Burn { user: v, amount },
        };
        let _ = ops.try_push(op);
    }
    ops
}
