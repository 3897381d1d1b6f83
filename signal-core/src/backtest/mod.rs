pub mod engine;
pub mod metrics;
pub mod sma;

pub use engine::BacktestEngine;
pub use metrics::{Metrics, MetricsCalculator};
pub use sma::{sma, sma_series, SmaCrossover};
