// =================================================================
// data/types.rs - Domain Records
// =================================================================

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::DataError;

/// One daily bar. A well-formed series is ascending by `date` with no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PriceBar {
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Bar whose OHLC are all `close` and volume is zero
    pub fn from_close(date: NaiveDate, close: Decimal) -> Self {
        Self::new(date, close, close, close, close, Decimal::ZERO)
    }
}

/// Discrete crossover signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
            SignalKind::Hold => "HOLD",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(SignalKind::Buy),
            "SELL" => Ok(SignalKind::Sell),
            "HOLD" => Ok(SignalKind::Hold),
            other => Err(DataError::InvalidData(format!(
                "unknown signal kind '{}'",
                other
            ))),
        }
    }
}

/// A signal produced by the generator, before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignal {
    pub date: NaiveDate,
    pub kind: SignalKind,
    /// Confidence score in [0, 1]
    pub confidence: Decimal,
    /// Human-readable derivation trace
    pub reason: String,
}

/// A stored signal record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub id: i64,
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub confidence: Decimal,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Signal {
    pub fn from_new(id: i64, signal: &NewSignal, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            date: signal.date,
            kind: signal.kind,
            confidence: signal.confidence,
            reason: signal.reason.clone(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// One round-trip position. `exit_*` and `profit` stay empty while the position is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: Decimal,
    pub exit_date: Option<NaiveDate>,
    pub exit_price: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub side: TradeSide,
}

impl Trade {
    /// Open a long position
    pub fn open(entry_date: NaiveDate, entry_price: Decimal) -> Self {
        Self {
            entry_date,
            entry_price,
            exit_date: None,
            exit_price: None,
            profit: None,
            side: TradeSide::Buy,
        }
    }

    pub fn is_open(&self) -> bool {
        self.exit_date.is_none()
    }

    pub fn close(&mut self, exit_date: NaiveDate, exit_price: Decimal, profit: Decimal) {
        self.exit_date = Some(exit_date);
        self.exit_price = Some(exit_price);
        self.profit = Some(profit);
    }
}

/// Which bars the backtest SMAs may look back over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookbackMode {
    /// SMAs are computed on the date-filtered sub-series only
    #[default]
    RangeLocal,
    /// SMAs are computed on the whole series; only trading is range-restricted
    FullHistory,
}

/// How the profit of a closed trade is attributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitMode {
    /// Exit value minus the capital committed at entry
    #[default]
    PerTrade,
    /// Balance after exit minus starting capital
    Cumulative,
}

/// Strategy configuration of one backtest run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: Decimal,
    #[serde(default)]
    pub lookback: LookbackMode,
    #[serde(default)]
    pub profit_mode: ProfitMode,
}

impl BacktestConfig {
    /// Display name used for the stored record
    pub fn label(&self) -> String {
        format!("Backtest {}/{}", self.short_window, self.long_window)
    }
}

/// Performance summary of one backtest run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    #[serde(flatten)]
    pub config: BacktestConfig,
    pub total_return_pct: Decimal,
    pub win_rate_pct: Decimal,
    /// Open and closed trades
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Realized cash balance at the end of the range
    pub final_balance: Decimal,
    pub trades: Vec<Trade>,
}

/// A stored backtest, append-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRecord {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: BacktestResult,
}
