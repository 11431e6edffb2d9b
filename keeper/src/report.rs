//! JSON run report

use crate::health::{self, AccountHealth};
use anyhow::{Context, Result};
use cdp_engine::{Address, Engine, EngineEvent, LiquidationOutcome, U256};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FailedLiquidation {
    pub user: Address,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub index: usize,
    pub symbol: String,
    pub answer: i64,
    pub liquidations: Vec<LiquidationOutcome>,
    pub failures: Vec<FailedLiquidation>,
    pub warnings: Vec<Address>,
    /// Engine events drained after the tick's liquidations
    pub events: Vec<EngineEvent>,
}

#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub ticks: Vec<TickReport>,
    pub accounts: Vec<AccountHealth>,
    pub total_debt: U256,
    pub total_collateral_value: U256,
}

impl RunReport {
    pub fn liquidation_count(&self) -> usize {
        self.ticks.iter().map(|t| t.liquidations.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.ticks.iter().map(|t| t.failures.len()).sum()
    }

    /// Record the closing state of every account
    pub fn finish(&mut self, engine: &Engine) -> Result<()> {
        self.accounts = health::scan(engine, &[]);
        self.total_debt = engine.total_debt();
        self.total_collateral_value = engine
            .total_collateral_value()
            .context("Failed to value collateral in custody")?;
        Ok(())
    }

    pub fn write(&self, path: &str) -> Result<()> {
        let expanded = shellexpand::tilde(path);
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize report")?;

        std::fs::write(expanded.as_ref(), json)
            .context(format!("Failed to write report to {}", path))?;

        log::info!("Wrote run report to {}", path);
        Ok(())
    }
}
