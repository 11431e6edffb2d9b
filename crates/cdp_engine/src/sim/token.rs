//! In-memory fungible token with allowances and owner-gated mint/burn

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use crate::token::{SyntheticAsset, Token};

/// Switches that make the next calls of a kind return `false`
#[derive(Debug, Default)]
pub struct TokenFaults {
    pub transfer: Cell<bool>,
    pub transfer_from: Cell<bool>,
    pub mint: Cell<bool>,
    pub burn: Cell<bool>,
}

#[derive(Debug, Default)]
struct Book {
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<(Address, Address), U256>,
    total_supply: U256,
    owner: Option<Address>,
}

impl Book {
    fn balance(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> bool {
        if to == Address::ZERO {
            return false;
        }
        let Some(remaining) = self.balance(from).checked_sub(amount) else {
            return false;
        };
        self.balances.insert(from, remaining);
        let credited = self.balance(to).saturating_add(amount);
        self.balances.insert(to, credited);
        true
    }
}

#[derive(Debug)]
pub struct InMemoryToken {
    address: Address,
    symbol: String,
    book: RefCell<Book>,
    faults: TokenFaults,
}

impl InMemoryToken {
    /// A token anyone can faucet, with no mint authority
    pub fn new(address: Address, symbol: &str) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            book: RefCell::new(Book::default()),
            faults: TokenFaults::default(),
        }
    }

    /// A token whose mint/burn authority is `owner`
    pub fn with_owner(address: Address, symbol: &str, owner: Address) -> Self {
        let token = Self::new(address, symbol);
        token.book.borrow_mut().owner = Some(owner);
        token
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn owner(&self) -> Option<Address> {
        self.book.borrow().owner
    }

    pub fn faults(&self) -> &TokenFaults {
        &self.faults
    }

    /// Hand ownership to `new_owner`; only the current owner may
    pub fn transfer_ownership(&self, current: Address, new_owner: Address) -> bool {
        let mut book = self.book.borrow_mut();
        if book.owner != Some(current) || new_owner == Address::ZERO {
            return false;
        }
        book.owner = Some(new_owner);
        true
    }

    /// Create `amount` for `to` without any authority check
    pub fn faucet(&self, to: Address, amount: U256) {
        let mut book = self.book.borrow_mut();
        let balance = book.balance(to).saturating_add(amount);
        book.balances.insert(to, balance);
        book.total_supply = book.total_supply.saturating_add(amount);
    }

    pub fn approve(&self, owner: Address, spender: Address, amount: U256) {
        self.book.borrow_mut().allowances.insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.book
            .borrow()
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }
}

impl Token for InMemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, owner: Address) -> U256 {
        self.book.borrow().balance(owner)
    }

    fn transfer(&self, from: Address, to: Address, amount: U256) -> bool {
        if self.faults.transfer.get() {
            return false;
        }
        self.book.borrow_mut().move_balance(from, to, amount)
    }

    fn transfer_from(&self, spender: Address, from: Address, to: Address, amount: U256) -> bool {
        if self.faults.transfer_from.get() {
            return false;
        }
        let mut book = self.book.borrow_mut();
        let allowance = book.allowances.get(&(from, spender)).copied().unwrap_or_default();
        let Some(remaining) = allowance.checked_sub(amount) else {
            return false;
        };
        if !book.move_balance(from, to, amount) {
            return false;
        }
        if allowance != U256::MAX {
            book.allowances.insert((from, spender), remaining);
        }
        true
    }
}

impl SyntheticAsset for InMemoryToken {
    fn total_supply(&self) -> U256 {
        self.book.borrow().total_supply
    }

    fn mint(&self, authority: Address, to: Address, amount: U256) -> bool {
        if self.faults.mint.get() {
            return false;
        }
        let mut book = self.book.borrow_mut();
        if book.owner != Some(authority) || to == Address::ZERO || amount.is_zero() {
            return false;
        }
        let Some(supply) = book.total_supply.checked_add(amount) else {
            return false;
        };
        book.total_supply = supply;
        let balance = book.balance(to).saturating_add(amount);
        book.balances.insert(to, balance);
        true
    }

    fn burn(&self, authority: Address, amount: U256) -> bool {
        if self.faults.burn.get() {
            return false;
        }
        let mut book = self.book.borrow_mut();
        if book.owner != Some(authority) || amount.is_zero() {
            return false;
        }
        let Some(remaining) = book.balance(authority).checked_sub(amount) else {
            return false;
        };
        book.balances.insert(authority, remaining);
        book.total_supply = book.total_supply.saturating_sub(amount);
        true
    }
}
