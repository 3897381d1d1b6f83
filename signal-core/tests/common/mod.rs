#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use signal_common::{
    BacktestRecord, BacktestRepository, BacktestResult, DataError, InMemoryStore, NewSignal,
    PriceBar, PriceRepository, Signal, SignalRepository,
};
use signal_core::config::StrategySettings;
use signal_core::service::StrategyService;
use std::sync::Arc;

pub fn first_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
}

pub fn day(offset: usize) -> NaiveDate {
    first_day() + Duration::days(offset as i64)
}

pub fn bars(closes: impl IntoIterator<Item = Decimal>) -> Vec<PriceBar> {
    closes
        .into_iter()
        .enumerate()
        .map(|(i, close)| PriceBar::from_close(day(i), close))
        .collect()
}

/// 250 closes rising by one from 100
pub fn linear_rise() -> Vec<PriceBar> {
    bars((0..250).map(|i| Decimal::from(100 + i)))
}

pub fn flat(len: usize, close: Decimal) -> Vec<PriceBar> {
    bars(std::iter::repeat(close).take(len))
}

/// Rises for 40 bars, holds, then falls for 40 bars
pub fn golden_then_death_cross() -> Vec<PriceBar> {
    let mut closes: Vec<Decimal> = vec![Decimal::from(100); 30];
    closes.extend((1..=40).map(|i| Decimal::from(100 + i)));
    closes.extend(vec![Decimal::from(140); 10]);
    closes.extend((1..=40).map(|i| Decimal::from(140 - i)));
    closes.extend(vec![Decimal::from(100); 10]);
    bars(closes)
}

pub fn service_with(
    prices: Vec<PriceBar>,
    short_window: usize,
    long_window: usize,
) -> (Arc<InMemoryStore>, StrategyService) {
    let store = Arc::new(InMemoryStore::with_prices(prices));
    let service = StrategyService::from_store(store.clone()).with_strategy_settings(
        StrategySettings {
            short_window,
            long_window,
            ..StrategySettings::default()
        },
    );
    (store, service)
}

/// Store whose writes always fail; reads go to the wrapped memory store
pub struct FailingStore {
    pub inner: InMemoryStore,
}

impl FailingStore {
    pub fn new(inner: InMemoryStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl PriceRepository for FailingStore {
    async fn get_prices(&self) -> Result<Vec<PriceBar>, DataError> {
        self.inner.get_prices().await
    }
}

#[async_trait]
impl SignalRepository for FailingStore {
    async fn replace_signals(&self, _signals: &[NewSignal]) -> Result<usize, DataError> {
        Err(DataError::InvalidData("signal table unavailable".to_string()))
    }

    async fn list_signals(&self) -> Result<Vec<Signal>, DataError> {
        self.inner.list_signals().await
    }
}

#[async_trait]
impl BacktestRepository for FailingStore {
    async fn append_backtest(
        &self,
        _name: &str,
        _result: &BacktestResult,
    ) -> Result<BacktestRecord, DataError> {
        Err(DataError::InvalidData("backtest table unavailable".to_string()))
    }

    async fn list_backtests(&self) -> Result<Vec<BacktestRecord>, DataError> {
        self.inner.list_backtests().await
    }
}

/// Failing-write service over the crossover series, with one signal set
/// already stored
pub async fn failing_service(short_window: usize, long_window: usize) -> StrategyService {
    let inner = InMemoryStore::with_prices(golden_then_death_cross());
    inner
        .replace_signals(&[NewSignal {
            date: day(30),
            kind: signal_common::SignalKind::Buy,
            confidence: Decimal::new(8, 1),
            reason: "seeded".to_string(),
        }])
        .await
        .unwrap();

    StrategyService::from_store(Arc::new(FailingStore::new(inner))).with_strategy_settings(
        StrategySettings {
            short_window,
            long_window,
            ..StrategySettings::default()
        },
    )
}
