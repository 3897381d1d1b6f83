use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use signal_common::{LookbackMode, ProfitMode};

/// Outcome of a signal generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub message: String,
    /// Number of BUY/SELL signals now stored
    pub count: usize,
}

impl GenerationSummary {
    pub fn generated(count: usize) -> Self {
        Self {
            message: "Generated".to_string(),
            count,
        }
    }

    pub fn not_enough_data() -> Self {
        Self {
            message: "Not enough data".to_string(),
            count: 0,
        }
    }
}

/// Backtest parameters; omitted fields fall back to the configured defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    pub initial_capital: Option<Decimal>,
    pub lookback: Option<LookbackMode>,
    pub profit_mode: Option<ProfitMode>,
}

impl BacktestRequest {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            short_window: None,
            long_window: None,
            initial_capital: None,
            lookback: None,
            profit_mode: None,
        }
    }

    pub fn with_windows(mut self, short_window: usize, long_window: usize) -> Self {
        self.short_window = Some(short_window);
        self.long_window = Some(long_window);
        self
    }

    pub fn with_lookback(mut self, lookback: LookbackMode) -> Self {
        self.lookback = Some(lookback);
        self
    }

    pub fn with_profit_mode(mut self, profit_mode: ProfitMode) -> Self {
        self.profit_mode = Some(profit_mode);
        self
    }
}
