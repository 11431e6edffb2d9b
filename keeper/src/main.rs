//! CDP Liquidation Keeper
//!
//! Replays a scenario of positions and price ticks against an in-memory
//! market and liquidates accounts whose health factor falls below 1.

mod config;
mod health;
mod market;
mod planner;
mod priority_queue;
mod report;

use anyhow::{Context, Result};
use cdp_engine::math::format_wad;
use config::{Config, PriceTick};
use market::Market;
use priority_queue::HealthQueue;
use report::{FailedLiquidation, RunReport, TickReport};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    if let Some(flag) = args.next() {
        if flag == "--init" {
            let path = args.next().unwrap_or_else(|| "keeper-config.toml".to_string());
            return Config::write_default(&path);
        }
        anyhow::bail!("Unknown argument: {} (expected --init [path])", flag);
    }

    log::info!("Starting CDP liquidation keeper");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default scenario", e);
        Config::default_scenario()
    });

    let report = run(&config)?;

    log::info!(
        "Replayed {} ticks: {} liquidations, {} failed; total debt {}",
        report.ticks.len(),
        report.liquidation_count(),
        report.failure_count(),
        format_wad(report.total_debt)
    );

    if let Some(path) = &config.report_path {
        report.write(path)?;
    }

    Ok(())
}

/// Build the market, open every position and replay the ticks
fn run(config: &Config) -> Result<RunReport> {
    let market = Market::build(config)?;
    log::info!("Engine {} listing {} assets", market.engine.address(), market.listings.len());

    for position in &config.positions {
        if let Err(e) = market.open(position) {
            log::warn!("Skipping position: {:#}", e);
        }
    }
    market
        .open(&config.liquidator)
        .context("Failed to fund the liquidator")?;
    let opening = market.engine.take_events();
    log::debug!("Opening positions recorded {} events", opening.len());

    let mut queue = HealthQueue::new();
    let mut report = RunReport::default();

    for (index, tick) in config.ticks.iter().enumerate() {
        market.apply_tick(tick)?;
        queue.refill(health::scan(&market.engine, &[config.liquidator.user]));

        match queue.peek() {
            Some(worst) => log::debug!(
                "Health queue size: {}, worst {}",
                queue.len(),
                format_wad(worst.health_factor)
            ),
            None => log::debug!("No open accounts to watch"),
        }

        let mut tick_report = process_liquidations(&mut queue, &market, config, index, tick);
        tick_report.events = market.engine.take_events();
        report.ticks.push(tick_report);
    }

    report.finish(&market.engine)?;
    Ok(report)
}

/// Liquidate up to one batch of broken accounts, lowest health first
fn process_liquidations(
    queue: &mut HealthQueue,
    market: &Market,
    config: &Config,
    index: usize,
    tick: &PriceTick,
) -> TickReport {
    let mut tick_report = TickReport {
        index,
        symbol: tick.symbol.clone(),
        answer: tick.answer,
        liquidations: Vec::new(),
        failures: Vec::new(),
        warnings: Vec::new(),
        events: Vec::new(),
    };

    for health in queue.warning_candidates(config.warning_buffer_pct) {
        log::warn!(
            "Account {} close to liquidation (health: {})",
            health.user,
            format_wad(health.health_factor)
        );
        tick_report.warnings.push(health.user);
    }

    let broken = queue.liquidatable().len();
    if broken == 0 {
        log::debug!("No accounts need liquidation");
        return tick_report;
    }

    log::info!("Found {} accounts needing liquidation", broken);

    let liquidator = config.liquidator.user;

    // Broken accounts sit at the front of the queue; each is tried once per tick
    for _ in 0..config.max_liquidations_per_batch.min(broken) {
        let Some(health) = queue.pop() else { break };
        log::info!(
            "Liquidating {} (health: {})",
            health.user,
            format_wad(health.health_factor)
        );

        let attempt = planner::plan(&market.engine, health.user, liquidator, config.close_factor_pct)
            .map_err(anyhow::Error::from)
            .and_then(|plan| {
                log::debug!(
                    "Covering {} of {}, expecting {} of {}",
                    format_wad(plan.debt_to_cover),
                    plan.user,
                    format_wad(plan.expected_seizure),
                    plan.asset
                );
                market
                    .engine
                    .liquidate(liquidator, plan.asset, plan.user, plan.debt_to_cover)
                    .map_err(anyhow::Error::from)
            });

        match attempt {
            Ok(outcome) => tick_report.liquidations.push(outcome),
            Err(e) => {
                log::error!("Failed to liquidate {}: {:#}", health.user, e);
                tick_report.failures.push(FailedLiquidation {
                    user: health.user,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    tick_report
}
