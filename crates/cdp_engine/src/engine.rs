//! Engine facade: operations and reads over the ledgers
//!
//! Every mutating operation runs as a staged transaction under the reentrancy
//! lock. Effects are applied to the ledgers in place, each touched entry saved
//! to an undo log first, and gates are evaluated on the result. Token
//! interactions are dispatched only after that. A rejected gate or interaction
//! rolls the touched entries back and compensates the interactions already
//! performed, so a failed operation leaves no trace.

use std::cell::RefCell;
use std::rc::Rc;

use alloy_primitives::{Address, U256};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::EngineEvent;
use crate::guard::ReentrancyLock;
use crate::health::{calculate_health_factor, is_healthy};
use crate::interaction::{Counterparties, Interaction};
use crate::liquidation::{self, LiquidationOutcome, LiquidationQuote};
use crate::math::{add_u256, format_wad};
use crate::oracle::{checked_price, Clock, Price, PriceOracle, SystemClock};
use crate::registry::CollateralRegistry;
use crate::state::{AccountInfo, Ledgers, UndoLog};
use crate::token::{SyntheticAsset, Token};
use crate::valuation;

pub struct Engine {
    config: EngineConfig,
    registry: CollateralRegistry,
    synthetic: Rc<dyn SyntheticAsset>,
    clock: Rc<dyn Clock>,
    ledgers: RefCell<Ledgers>,
    events: RefCell<Vec<EngineEvent>>,
    lock: ReentrancyLock,
}

/// A user's debt and non-zero collateral, copied out of a ledger
struct Position {
    debt: U256,
    collateral: Vec<(Address, U256)>,
}

impl Engine {
    /// Engine with the default configuration
    pub fn new(
        assets: Vec<Rc<dyn Token>>,
        oracles: Vec<Rc<dyn PriceOracle>>,
        synthetic: Rc<dyn SyntheticAsset>,
    ) -> EngineResult<Self> {
        Self::with_config(EngineConfig::default(), assets, oracles, synthetic)
    }

    pub fn with_config(
        config: EngineConfig,
        assets: Vec<Rc<dyn Token>>,
        oracles: Vec<Rc<dyn PriceOracle>>,
        synthetic: Rc<dyn SyntheticAsset>,
    ) -> EngineResult<Self> {
        let registry = CollateralRegistry::new(assets, oracles)?;
        log::info!(
            "engine {} listing {} collateral assets, synthetic {}",
            config.address,
            registry.len(),
            synthetic.address()
        );

        Ok(Self {
            config,
            registry,
            synthetic,
            clock: Rc::new(SystemClock),
            ledgers: RefCell::new(Ledgers::default()),
            events: RefCell::new(Vec::new()),
            lock: ReentrancyLock::default(),
        })
    }

    /// Replace the time source used for oracle staleness
    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    pub fn deposit_collateral(&self, caller: Address, asset: Address, amount: U256) -> EngineResult<()> {
        self.transact(|tx| {
            require_positive(amount)?;
            tx.require_supported(asset)?;
            tx.deposit(caller, asset, amount)
        })
    }

    /// Deposit then mint, gated once at the end
    pub fn deposit_collateral_and_mint(
        &self,
        caller: Address,
        asset: Address,
        amount: U256,
        debt_amount: U256,
    ) -> EngineResult<()> {
        self.transact(|tx| {
            require_positive(amount)?;
            require_positive(debt_amount)?;
            tx.require_supported(asset)?;
            tx.deposit(caller, asset, amount)?;
            tx.mint(caller, debt_amount)?;
            tx.assert_healthy(caller)
        })
    }

    pub fn redeem_collateral(&self, caller: Address, asset: Address, amount: U256) -> EngineResult<()> {
        self.transact(|tx| {
            require_positive(amount)?;
            tx.require_supported(asset)?;
            tx.redeem(caller, caller, asset, amount)?;
            tx.assert_healthy(caller)
        })
    }

    /// Burn then redeem, gated once at the end
    pub fn redeem_collateral_for_debt(
        &self,
        caller: Address,
        asset: Address,
        collateral_amount: U256,
        debt_amount: U256,
    ) -> EngineResult<()> {
        self.transact(|tx| {
            require_positive(collateral_amount)?;
            require_positive(debt_amount)?;
            tx.require_supported(asset)?;
            tx.burn(debt_amount, caller, caller)?;
            tx.redeem(caller, caller, asset, collateral_amount)?;
            tx.assert_healthy(caller)
        })
    }

    pub fn mint_debt(&self, caller: Address, amount: U256) -> EngineResult<()> {
        self.transact(|tx| {
            require_positive(amount)?;
            tx.mint(caller, amount)?;
            tx.assert_healthy(caller)
        })
    }

    /// Repay own debt; burning can only raise the health factor, so no gate
    pub fn burn_debt(&self, caller: Address, amount: U256) -> EngineResult<()> {
        self.transact(|tx| {
            require_positive(amount)?;
            tx.burn(amount, caller, caller)
        })
    }

    /// Cover `debt_to_cover` of `user`'s debt with the liquidator's synthetic
    /// tokens in exchange for the equivalent `asset` collateral plus the bonus
    pub fn liquidate(
        &self,
        liquidator: Address,
        asset: Address,
        user: Address,
        debt_to_cover: U256,
    ) -> EngineResult<LiquidationOutcome> {
        self.transact(|tx| {
            require_positive(debt_to_cover)?;
            tx.require_supported(asset)?;

            let starting_health_factor = tx.health_factor(user)?;
            if is_healthy(starting_health_factor) {
                return Err(EngineError::HealthFactorNotBroken { user });
            }

            let price = tx.engine.price(asset)?;
            let quote = liquidation::quote(asset, &price, debt_to_cover)?;

            tx.redeem(user, liquidator, asset, quote.total_seized)?;
            tx.burn(debt_to_cover, user, liquidator)?;

            let ending_health_factor = tx.health_factor(user)?;
            if ending_health_factor <= starting_health_factor {
                return Err(EngineError::HealthFactorNotImproved {
                    before: starting_health_factor,
                    after: ending_health_factor,
                });
            }
            tx.assert_healthy(liquidator)?;

            log::info!(
                "liquidated {user} by {liquidator}: covered {} for {} of {asset}, health {} -> {}",
                format_wad(debt_to_cover),
                format_wad(quote.total_seized),
                format_wad(starting_health_factor),
                format_wad(ending_health_factor)
            );

            Ok(LiquidationOutcome {
                user,
                liquidator,
                asset,
                quote,
                starting_health_factor,
                ending_health_factor,
            })
        })
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn health_factor(&self, user: Address) -> EngineResult<U256> {
        let position = self.position(&self.ledgers.borrow(), user);
        self.health_factor_of(&position)
    }

    pub fn account_collateral_value(&self, user: Address) -> EngineResult<U256> {
        let position = self.position(&self.ledgers.borrow(), user);
        self.collateral_value_of(&position)
    }

    pub fn account_info(&self, user: Address) -> EngineResult<AccountInfo> {
        let position = self.position(&self.ledgers.borrow(), user);
        Ok(AccountInfo {
            debt_minted: position.debt,
            collateral_value: self.collateral_value_of(&position)?,
        })
    }

    pub fn peg_value_of_token(&self, asset: Address, amount: U256) -> EngineResult<U256> {
        let price = self.price(asset)?;
        Ok(valuation::value_in_peg_units(&price, amount))
    }

    pub fn token_amount_from_peg_value(&self, asset: Address, peg_amount: U256) -> EngineResult<U256> {
        self.registry.get(asset)?;
        require_positive(peg_amount)?;
        let price = self.price(asset)?;
        valuation::token_amount_for_peg_value(asset, &price, peg_amount)
    }

    /// Collateral a liquidator would receive for covering `debt_to_cover`
    pub fn quote_liquidation(&self, asset: Address, debt_to_cover: U256) -> EngineResult<LiquidationQuote> {
        self.registry.get(asset)?;
        require_positive(debt_to_cover)?;
        let price = self.price(asset)?;
        liquidation::quote(asset, &price, debt_to_cover)
    }

    pub fn calculate_health_factor(&self, total_debt: U256, collateral_value: U256) -> U256 {
        calculate_health_factor(total_debt, collateral_value)
    }

    pub fn supported_assets(&self) -> Vec<Address> {
        self.registry.assets()
    }

    /// Zero for unknown assets
    pub fn collateral_balance(&self, user: Address, asset: Address) -> U256 {
        self.ledgers.borrow().collateral.balance(user, asset)
    }

    pub fn debt_of(&self, user: Address) -> U256 {
        self.ledgers.borrow().debt.debt(user)
    }

    pub fn total_collateral(&self, asset: Address) -> U256 {
        self.ledgers.borrow().collateral.total(asset)
    }

    pub fn total_debt(&self) -> U256 {
        self.ledgers.borrow().debt.total()
    }

    /// Value of everything in custody, summed in registry order
    pub fn total_collateral_value(&self) -> EngineResult<U256> {
        let totals: Vec<(Address, U256)> = {
            let ledgers = self.ledgers.borrow();
            self.registry
                .iter()
                .map(|entry| (entry.asset, ledgers.collateral.total(entry.asset)))
                .filter(|(_, amount)| !amount.is_zero())
                .collect()
        };
        self.sum_values(&totals)
    }

    /// Every user that has ever held a position
    pub fn accounts(&self) -> Vec<Address> {
        self.ledgers.borrow().accounts()
    }

    /// Copy of both ledgers
    pub fn ledgers(&self) -> Ledgers {
        self.ledgers.borrow().clone()
    }

    pub fn collateral_token(&self, asset: Address) -> Option<Rc<dyn Token>> {
        self.registry.get(asset).ok().map(|entry| entry.token.clone())
    }

    pub fn oracle_of(&self, asset: Address) -> Option<Rc<dyn PriceOracle>> {
        self.registry.get(asset).ok().map(|entry| entry.oracle.clone())
    }

    pub fn synthetic(&self) -> Rc<dyn SyntheticAsset> {
        self.synthetic.clone()
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Events recorded so far, oldest first
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }

    /// Drain the recorded events; the log keeps every committed event until drained
    pub fn take_events(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn price(&self, asset: Address) -> EngineResult<Price> {
        let entry = self.registry.get(asset)?;
        checked_price(
            asset,
            entry.oracle.as_ref(),
            self.clock.as_ref(),
            self.config.price_timeout_secs,
        )
    }

    fn position(&self, ledgers: &Ledgers, user: Address) -> Position {
        let collateral = self
            .registry
            .iter()
            .map(|entry| (entry.asset, ledgers.collateral.balance(user, entry.asset)))
            .filter(|(_, amount)| !amount.is_zero())
            .collect();
        Position {
            debt: ledgers.debt.debt(user),
            collateral,
        }
    }

    fn sum_values(&self, holdings: &[(Address, U256)]) -> EngineResult<U256> {
        let mut total = U256::ZERO;
        for &(asset, amount) in holdings {
            total = add_u256(total, self.peg_value_of_token(asset, amount)?);
        }
        Ok(total)
    }

    fn collateral_value_of(&self, position: &Position) -> EngineResult<U256> {
        self.sum_values(&position.collateral)
    }

    fn health_factor_of(&self, position: &Position) -> EngineResult<U256> {
        if position.debt.is_zero() {
            return Ok(U256::MAX);
        }
        let value = self.collateral_value_of(position)?;
        Ok(calculate_health_factor(position.debt, value))
    }

    fn counterparties(&self) -> Counterparties<'_> {
        Counterparties {
            engine: self.config.address,
            registry: &self.registry,
            synthetic: self.synthetic.as_ref(),
        }
    }

    fn transact<T>(&self, op: impl FnOnce(&mut Transaction<'_>) -> EngineResult<T>) -> EngineResult<T> {
        let _guard = self.lock.acquire()?;

        let mut tx = Transaction {
            engine: self,
            undo: UndoLog::default(),
            events: Vec::new(),
            interactions: Vec::new(),
        };
        let out = match op(&mut tx) {
            Ok(out) => out,
            Err(err) => {
                tx.undo.rollback(&mut self.ledgers.borrow_mut());
                return Err(err);
            }
        };

        let Transaction {
            undo,
            events,
            mut interactions,
            ..
        } = tx;
        // Compensable steps first; collateral out and mints cannot be undone
        interactions.sort_by_key(|step| step.compensation(self.config.address).is_none());

        let mark = {
            let mut log = self.events.borrow_mut();
            let mark = log.len();
            log.extend(events);
            mark
        };

        if let Err(err) = self.counterparties().dispatch(&interactions) {
            undo.rollback(&mut self.ledgers.borrow_mut());
            self.events.borrow_mut().truncate(mark);
            return Err(err);
        }
        for event in self.events.borrow().iter().skip(mark) {
            event.log();
        }
        Ok(out)
    }
}

fn require_positive(amount: U256) -> EngineResult<()> {
    if amount.is_zero() {
        return Err(EngineError::InvalidAmount);
    }
    Ok(())
}

/// One operation's undo log, staged events and pending interactions
struct Transaction<'e> {
    engine: &'e Engine,
    undo: UndoLog,
    events: Vec<EngineEvent>,
    interactions: Vec<Interaction>,
}

impl Transaction<'_> {
    fn require_supported(&self, asset: Address) -> EngineResult<()> {
        self.engine.registry.get(asset).map(|_| ())
    }

    fn emit(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    fn deposit(&mut self, user: Address, asset: Address, amount: U256) -> EngineResult<()> {
        let mut ledgers = self.engine.ledgers.borrow_mut();
        self.undo.save_collateral(&ledgers.collateral, user, asset);
        ledgers.collateral.credit(user, asset, amount)?;
        drop(ledgers);
        self.emit(EngineEvent::CollateralDeposited { user, asset, amount });
        self.interactions.push(Interaction::PullCollateral { asset, from: user, amount });
        Ok(())
    }

    /// Move `from`'s collateral to `to`; the caller decides whom to gate
    fn redeem(&mut self, from: Address, to: Address, asset: Address, amount: U256) -> EngineResult<()> {
        let mut ledgers = self.engine.ledgers.borrow_mut();
        self.undo.save_collateral(&ledgers.collateral, from, asset);
        ledgers.collateral.debit(from, asset, amount)?;
        drop(ledgers);
        self.emit(EngineEvent::CollateralRedeemed { from, to, asset, amount });
        self.interactions.push(Interaction::PushCollateral { asset, to, amount });
        Ok(())
    }

    fn mint(&mut self, user: Address, amount: U256) -> EngineResult<()> {
        let mut ledgers = self.engine.ledgers.borrow_mut();
        self.undo.save_debt(&ledgers.debt, user);
        ledgers.debt.record_mint(user, amount)?;
        drop(ledgers);
        self.interactions.push(Interaction::MintSynthetic { to: user, amount });
        Ok(())
    }

    /// Reduce `on_behalf_of`'s debt using `payer`'s synthetic tokens
    fn burn(&mut self, amount: U256, on_behalf_of: Address, payer: Address) -> EngineResult<()> {
        let mut ledgers = self.engine.ledgers.borrow_mut();
        self.undo.save_debt(&ledgers.debt, on_behalf_of);
        ledgers.debt.record_burn(on_behalf_of, amount)?;
        drop(ledgers);
        self.interactions.push(Interaction::PullSynthetic { from: payer, amount });
        self.interactions.push(Interaction::BurnSynthetic { amount });
        Ok(())
    }

    fn health_factor(&self, user: Address) -> EngineResult<U256> {
        let position = self.engine.position(&self.engine.ledgers.borrow(), user);
        self.engine.health_factor_of(&position)
    }

    fn assert_healthy(&self, user: Address) -> EngineResult<()> {
        let health_factor = self.health_factor(user)?;
        log::debug!("health factor of {user}: {}", format_wad(health_factor));
        if !is_healthy(health_factor) {
            return Err(EngineError::HealthFactorBroken { user, health_factor });
        }
        Ok(())
    }
}
