use thiserror::Error;

/// Errors raised by signal generation and backtesting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// The series is shorter than the long window
    #[error("Insufficient data: {required} bars required, {available} available")]
    InsufficientData { required: usize, available: usize },

    /// The requested backtest date range holds fewer bars than the long window
    #[error("Range too small: {required} bars required in range, {available} available")]
    RangeTooSmall { required: usize, available: usize },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A price or balance left the range `Decimal` can represent
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}
