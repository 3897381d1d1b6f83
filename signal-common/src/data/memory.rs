// data/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::errors::DataResult;
use super::repository::{BacktestRepository, PriceRepository, SignalRepository};
use super::types::{BacktestRecord, BacktestResult, NewSignal, PriceBar, Signal};

/// Process-local store implementing every repository trait.
///
/// Signal replacement swaps the whole vector under the write lock, so readers
/// observe either the previous set or the new one.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    prices: RwLock<Vec<PriceBar>>,
    signals: RwLock<Vec<Signal>>,
    backtests: RwLock<Vec<BacktestRecord>>,
    next_signal_id: AtomicI64,
    next_backtest_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `prices`, sorted ascending with duplicate dates dropped
    pub fn with_prices(prices: Vec<PriceBar>) -> Self {
        let mut store = Self::new();
        *store.prices.get_mut() = normalize(prices);
        store
    }

    /// Replace the price series
    pub async fn set_prices(&self, prices: Vec<PriceBar>) {
        *self.prices.write().await = normalize(prices);
    }
}

fn normalize(mut prices: Vec<PriceBar>) -> Vec<PriceBar> {
    prices.sort_by_key(|bar| bar.date);
    prices.dedup_by_key(|bar| bar.date);
    prices
}

#[async_trait]
impl PriceRepository for InMemoryStore {
    async fn get_prices(&self) -> DataResult<Vec<PriceBar>> {
        Ok(self.prices.read().await.clone())
    }
}

#[async_trait]
impl SignalRepository for InMemoryStore {
    async fn replace_signals(&self, signals: &[NewSignal]) -> DataResult<usize> {
        let now = Utc::now();
        let fresh: Vec<Signal> = signals
            .iter()
            .map(|s| {
                let id = self.next_signal_id.fetch_add(1, Ordering::SeqCst) + 1;
                Signal::from_new(id, s, now)
            })
            .collect();

        let count = fresh.len();
        *self.signals.write().await = fresh;
        debug!("Replaced in-memory signal set with {} records", count);
        Ok(count)
    }

    async fn list_signals(&self) -> DataResult<Vec<Signal>> {
        let mut signals = self.signals.read().await.clone();
        signals.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(signals)
    }
}

#[async_trait]
impl BacktestRepository for InMemoryStore {
    async fn append_backtest(
        &self,
        name: &str,
        result: &BacktestResult,
    ) -> DataResult<BacktestRecord> {
        let record = BacktestRecord {
            id: self.next_backtest_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: name.to_string(),
            created_at: Utc::now(),
            result: result.clone(),
        };
        self.backtests.write().await.push(record.clone());
        Ok(record)
    }

    async fn list_backtests(&self) -> DataResult<Vec<BacktestRecord>> {
        let mut records = self.backtests.read().await.clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }
}
