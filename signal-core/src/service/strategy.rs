use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use signal_common::{
    BacktestConfig, BacktestRecord, BacktestRepository, PriceBar, PriceRepository, Signal,
    SignalRepository,
};

use super::{BacktestRequest, GenerationSummary, ServiceError};
use crate::backtest::BacktestEngine;
use crate::config::{BacktestSettings, StrategySettings};
use crate::error::StrategyError;
use crate::signals::SignalGenerator;

/// Strategy service that coordinates the engines with the storage collaborators
pub struct StrategyService {
    /// Price series supplier
    prices: Arc<dyn PriceRepository>,
    /// Current signal set
    signals: Arc<dyn SignalRepository>,
    /// Backtest history
    backtests: Arc<dyn BacktestRepository>,
    /// Windows and confidence of generated signals
    strategy: StrategySettings,
    /// Defaults for backtest requests
    backtest: BacktestSettings,
    /// Serializes generation runs
    generation_lock: Mutex<()>,
}

impl StrategyService {
    /// Create a new strategy service with default settings
    pub fn new(
        prices: Arc<dyn PriceRepository>,
        signals: Arc<dyn SignalRepository>,
        backtests: Arc<dyn BacktestRepository>,
    ) -> Self {
        Self {
            prices,
            signals,
            backtests,
            strategy: StrategySettings::default(),
            backtest: BacktestSettings::default(),
            generation_lock: Mutex::new(()),
        }
    }

    /// Create a service backed by a single store implementing every repository
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: PriceRepository + SignalRepository + BacktestRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    pub fn with_strategy_settings(mut self, strategy: StrategySettings) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_backtest_settings(mut self, backtest: BacktestSettings) -> Self {
        self.backtest = backtest;
        self
    }

    /// Recompute the full signal set from the current series and replace the stored one.
    ///
    /// A series shorter than the long window leaves the stored set untouched
    /// and reports a zero count.
    pub async fn generate_signals(&self) -> Result<GenerationSummary, ServiceError> {
        let _guard = self.generation_lock.lock().await;

        let generator = SignalGenerator::new(
            self.strategy.short_window,
            self.strategy.long_window,
            self.strategy.confidence,
        )
        .map_err(|e| ServiceError::Configuration(e.to_string()))?;
        let bars = self.prices.get_prices().await?;

        let signals = match generator.generate(&bars) {
            Ok(signals) => signals,
            Err(StrategyError::InsufficientData {
                required,
                available,
            }) => {
                warn!(
                    "Skipping signal generation: {} bars required, {} available",
                    required, available
                );
                return Ok(GenerationSummary::not_enough_data());
            }
            Err(e) => return Err(e.into()),
        };

        let count = self.signals.replace_signals(&signals).await?;
        info!(
            "Generated {} signals from {} bars (SMA {}/{})",
            count,
            bars.len(),
            self.strategy.short_window,
            self.strategy.long_window
        );
        Ok(GenerationSummary::generated(count))
    }

    /// Simulate the crossover strategy over a date range and store the result.
    ///
    /// Nothing is stored when the request is rejected.
    pub async fn run_backtest(
        &self,
        request: BacktestRequest,
    ) -> Result<BacktestRecord, ServiceError> {
        let config = BacktestConfig {
            start_date: request.start_date,
            end_date: request.end_date,
            short_window: request.short_window.unwrap_or(self.strategy.short_window),
            long_window: request.long_window.unwrap_or(self.strategy.long_window),
            initial_capital: request
                .initial_capital
                .unwrap_or(self.backtest.initial_capital),
            lookback: request.lookback.unwrap_or(self.backtest.lookback),
            profit_mode: request.profit_mode.unwrap_or(self.backtest.profit_mode),
        };

        let engine = BacktestEngine::new(config)?;
        let bars = self.prices.get_prices().await?;
        let result = engine.run(&bars).map_err(|e| {
            warn!("Backtest rejected: {}", e);
            e
        })?;

        let name = result.config.label();
        let record = self.backtests.append_backtest(&name, &result).await?;
        info!("Stored backtest {} ({})", record.id, record.name);
        Ok(record)
    }

    /// Stored signals, most recent date first
    pub async fn list_signals(&self) -> Result<Vec<Signal>, ServiceError> {
        Ok(self.signals.list_signals().await?)
    }

    /// Stored backtests, most recently created first
    pub async fn list_backtests(&self) -> Result<Vec<BacktestRecord>, ServiceError> {
        Ok(self.backtests.list_backtests().await?)
    }

    /// The price series as supplied
    pub async fn list_prices(&self) -> Result<Vec<PriceBar>, ServiceError> {
        Ok(self.prices.get_prices().await?)
    }
}
