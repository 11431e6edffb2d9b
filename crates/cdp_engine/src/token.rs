//! Token capabilities consumed by the engine
//!
//! Collateral assets and the synthetic asset are external ledgers. Every call
//! reports success as a plain `bool`, mirroring how fungible-token contracts
//! signal a rejected transfer; the engine turns `false` into an error.

use alloy_primitives::{Address, U256};

/// A fungible token, used for collateral assets
pub trait Token {
    /// Identity of the token; collateral assets are keyed by it
    fn address(&self) -> Address;

    fn balance_of(&self, owner: Address) -> U256;

    /// Move `amount` out of `from`'s own balance
    fn transfer(&self, from: Address, to: Address, amount: U256) -> bool;

    /// Move `amount` from `from` to `to` using `spender`'s allowance
    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: U256) -> bool;
}

/// The pegged asset; mint and burn are gated on `authority` owning the token
pub trait SyntheticAsset: Token {
    fn total_supply(&self) -> U256;

    fn mint(&self, authority: Address, to: Address, amount: U256) -> bool;

    /// Burn from `authority`'s own balance
    fn burn(&self, authority: Address, amount: U256) -> bool;
}
