// data/repository.rs

use async_trait::async_trait;

use super::errors::DataResult;
use super::types::{BacktestRecord, BacktestResult, NewSignal, PriceBar, Signal};

/// Supplies the ordered price series
#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// All bars, ascending by date
    async fn get_prices(&self) -> DataResult<Vec<PriceBar>>;
}

/// Stores the current signal set
#[async_trait]
pub trait SignalRepository: Send + Sync {
    /// Clear the stored set and append `signals` in order, as one atomic unit.
    /// Either the whole new set becomes visible or the old set is kept.
    async fn replace_signals(&self, signals: &[NewSignal]) -> DataResult<usize>;

    /// All stored signals, most recent date first
    async fn list_signals(&self) -> DataResult<Vec<Signal>>;
}

/// Append-only history of backtest runs
#[async_trait]
pub trait BacktestRepository: Send + Sync {
    async fn append_backtest(&self, name: &str, result: &BacktestResult)
        -> DataResult<BacktestRecord>;

    /// All stored runs, most recently created first
    async fn list_backtests(&self) -> DataResult<Vec<BacktestRecord>>;
}
