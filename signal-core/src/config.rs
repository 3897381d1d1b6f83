use config::{Config, ConfigError, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use signal_common::{DatabaseConfig, LookbackMode, ProfitMode};

use crate::error::StrategyError;
use crate::signals::SignalGenerator;

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub host: String,
    pub port: u16,
}

/// Parameters of the stored signal set
#[derive(Debug, Clone, Deserialize)]
pub struct StrategySettings {
    pub short_window: usize,
    pub long_window: usize,
    pub confidence: Decimal,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            short_window: 50,
            long_window: 200,
            confidence: Decimal::new(8, 1),
        }
    }
}

impl StrategySettings {
    pub fn validate(&self) -> Result<(), StrategyError> {
        SignalGenerator::new(self.short_window, self.long_window, self.confidence).map(|_| ())
    }
}

/// Defaults applied to backtest requests
#[derive(Debug, Clone, Deserialize)]
pub struct BacktestSettings {
    pub initial_capital: Decimal,
    pub lookback: LookbackMode,
    pub profit_mode: ProfitMode,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_capital: Decimal::from(10_000),
            lookback: LookbackMode::default(),
            profit_mode: ProfitMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub api: Api,
    pub strategy: StrategySettings,
    pub backtest: BacktestSettings,
}

impl Settings {
    /// Load `config/{RUN_MODE}` (default `development`) over built-in defaults
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::from_file(&format!("config/{}", run_mode))
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("database.url", "postgres://localhost:5432/signals")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("database.max_lifetime", 1800)?
            .set_default("api.host", "127.0.0.1")?
            .set_default("api.port", 5000)?
            .set_default("strategy.short_window", 50)?
            .set_default("strategy.long_window", 200)?
            .set_default("strategy.confidence", "0.8")?
            .set_default("backtest.initial_capital", "10000")?
            .set_default("backtest.lookback", "range_local")?
            .set_default("backtest.profit_mode", "per_trade")?
            .add_source(File::with_name(path).required(false));

        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        let s = builder.build()?;
        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the engines would refuse at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.strategy
            .validate()
            .map_err(|e| ConfigError::Message(format!("[strategy] {}", e)))?;

        if self.backtest.initial_capital <= Decimal::ZERO {
            return Err(ConfigError::Message(format!(
                "[backtest] initial capital must be positive, got {}",
                self.backtest.initial_capital
            )));
        }
        Ok(())
    }
}
