//! Keeper configuration

use anyhow::{Context, Result};
use cdp_engine::{Address, EngineConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Unix time the simulated clock starts at
    pub start_timestamp: u64,

    /// Seconds the clock advances per price tick
    pub tick_interval_secs: u64,

    /// Warn about healthy accounts within this many percent of the minimum
    pub warning_buffer_pct: u64,

    /// Maximum liquidations per tick
    pub max_liquidations_per_batch: usize,

    /// Share of a user's debt one liquidation may cover, in percent
    pub close_factor_pct: u64,

    /// Synthetic asset address
    pub synthetic: Address,

    /// Write a JSON run report here when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,

    pub engine: EngineConfig,

    /// Position the keeper liquidates with
    pub liquidator: PositionConfig,

    pub collateral: Vec<CollateralConfig>,

    #[serde(default)]
    pub positions: Vec<PositionConfig>,

    #[serde(default)]
    pub ticks: Vec<PriceTick>,
}

/// A registered collateral asset and its feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralConfig {
    pub symbol: String,
    pub address: Address,
    pub feed_decimals: u8,
    /// Raw feed answer at `feed_decimals` precision
    pub initial_answer: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionConfig {
    pub user: Address,
    pub symbol: String,
    /// Whole collateral units
    pub collateral: u64,
    /// Whole peg units
    pub debt: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTick {
    pub symbol: String,
    pub answer: i64,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CDP_KEEPER_CONFIG")
            .unwrap_or_else(|_| "keeper-config.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let config_str = std::fs::read_to_string(expanded.as_ref())
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Two borrowers against WETH/WBTC, then a 30% WETH crash
    pub fn default_scenario() -> Self {
        Self {
            start_timestamp: 1_700_000_000,
            tick_interval_secs: 60,
            warning_buffer_pct: 10,
            max_liquidations_per_batch: 5,
            close_factor_pct: 50,
            synthetic: Address::repeat_byte(0x5D),
            report_path: None,
            engine: EngineConfig::default(),
            liquidator: PositionConfig {
                user: Address::repeat_byte(0x4B),
                symbol: "WETH".to_string(),
                collateral: 100,
                debt: 50_000,
            },
            collateral: vec![
                CollateralConfig {
                    symbol: "WETH".to_string(),
                    address: Address::repeat_byte(0xEE),
                    feed_decimals: 8,
                    initial_answer: 2_000_00000000,
                },
                CollateralConfig {
                    symbol: "WBTC".to_string(),
                    address: Address::repeat_byte(0xBB),
                    feed_decimals: 8,
                    initial_answer: 1_000_00000000,
                },
            ],
            positions: vec![
                PositionConfig {
                    user: Address::repeat_byte(0x01),
                    symbol: "WETH".to_string(),
                    collateral: 10,
                    debt: 9_000,
                },
                PositionConfig {
                    user: Address::repeat_byte(0x02),
                    symbol: "WBTC".to_string(),
                    collateral: 10,
                    debt: 2_000,
                },
            ],
            ticks: vec![
                PriceTick { symbol: "WETH".to_string(), answer: 1_900_00000000 },
                PriceTick { symbol: "WETH".to_string(), answer: 1_400_00000000 },
                PriceTick { symbol: "WBTC".to_string(), answer: 950_00000000 },
            ],
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_scenario();
        let toml_str = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
