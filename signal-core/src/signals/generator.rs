// signal-core/src/signals/generator.rs

use rust_decimal::Decimal;
use signal_common::{NewSignal, PriceBar, SignalKind};

use crate::backtest::sma::{sma_series, validate_windows, SmaCrossover};
use crate::error::StrategyError;

/// Walks a price series and emits a signal at every crossover.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    short_window: usize,
    long_window: usize,
    confidence: Decimal,
}

impl SignalGenerator {
    pub fn new(
        short_window: usize,
        long_window: usize,
        confidence: Decimal,
    ) -> Result<Self, StrategyError> {
        validate_windows(short_window, long_window)?;
        if confidence < Decimal::ZERO || confidence > Decimal::ONE {
            return Err(StrategyError::InvalidParameters(format!(
                "confidence must be within [0, 1], got {}",
                confidence
            )));
        }

        Ok(Self {
            short_window,
            long_window,
            confidence,
        })
    }

    /// Evaluate every bar where both averages are defined, in date order.
    ///
    /// Only BUY and SELL are returned; HOLD steps are dropped.
    pub fn generate(&self, bars: &[PriceBar]) -> Result<Vec<NewSignal>, StrategyError> {
        if bars.len() < self.long_window {
            return Err(StrategyError::InsufficientData {
                required: self.long_window,
                available: bars.len(),
            });
        }

        let short_ma = sma_series(bars, self.short_window);
        let long_ma = sma_series(bars, self.long_window);
        let mut crossover = SmaCrossover::new();
        let mut signals = Vec::new();

        for (i, bar) in bars.iter().enumerate() {
            let (Some(short), Some(long)) = (short_ma[i], long_ma[i]) else {
                continue;
            };

            if let Some(kind) = crossover.observe(short, long) {
                signals.push(NewSignal {
                    date: bar.date,
                    kind,
                    confidence: self.confidence,
                    reason: self.reason(kind, short, long, bar.close),
                });
            }
        }

        Ok(signals)
    }

    fn reason(&self, kind: SignalKind, short: Decimal, long: Decimal, close: Decimal) -> String {
        let direction = match kind {
            SignalKind::Buy => "above",
            SignalKind::Sell => "below",
            // never emitted by the crossover
            SignalKind::Hold => "level with",
        };
        format!(
            "SMA{} {} crossed {} SMA{} {} at close {}",
            self.short_window,
            short.round_dp(4),
            direction,
            self.long_window,
            long.round_dp(4),
            close
        )
    }
}
