// signal-core/src/backtest/sma.rs

use rust_decimal::Decimal;
use signal_common::{PriceBar, SignalKind};

use crate::error::StrategyError;

/// Mean close over the `period` bars ending at and including `index`.
///
/// Returns `None` when there is not enough history (`index < period - 1`),
/// when `index` is past the end of the series, when `period` is zero, or when
/// the window sum overflows `Decimal`.
/// Gaps between dates are not filled; bars are treated as contiguous.
pub fn sma(bars: &[PriceBar], period: usize, index: usize) -> Option<Decimal> {
    if period == 0 || index >= bars.len() || index + 1 < period {
        return None;
    }

    window_sum(&bars[index + 1 - period..=index])?.checked_div(Decimal::from(period))
}

/// SMA at every index of the series, computed with a running sum.
///
/// Element `i` equals `sma(bars, period, i)`.
pub fn sma_series(bars: &[PriceBar], period: usize) -> Vec<Option<Decimal>> {
    if period == 0 {
        return vec![None; bars.len()];
    }

    let divisor = Decimal::from(period);
    // None once the running sum has overflowed; rebuilt from the window
    let mut sum = Some(Decimal::ZERO);
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let window_start = (i + 1).saturating_sub(period);
        sum = match sum {
            Some(sum) if i >= period => sum
                .checked_sub(bars[i - period].close)
                .and_then(|s| s.checked_add(bar.close)),
            Some(sum) => sum.checked_add(bar.close),
            None => window_sum(&bars[window_start..=i]),
        };

        values.push(if i + 1 >= period {
            sum.and_then(|s| s.checked_div(divisor))
        } else {
            None
        });
    }

    values
}

fn window_sum(window: &[PriceBar]) -> Option<Decimal> {
    window
        .iter()
        .try_fold(Decimal::ZERO, |sum, bar| sum.checked_add(bar.close))
}

/// Short/long SMA crossover with repeat suppression.
///
/// Keyed on the last emitted signal, which starts as `Hold`. Equal averages
/// never emit and never change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossover {
    last_signal: SignalKind,
}

impl Default for SmaCrossover {
    fn default() -> Self {
        Self {
            last_signal: SignalKind::Hold,
        }
    }
}

impl SmaCrossover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_signal(&self) -> SignalKind {
        self.last_signal
    }

    /// Feed one pair of averages; returns the signal to emit, if any
    pub fn observe(&mut self, short_ma: Decimal, long_ma: Decimal) -> Option<SignalKind> {
        let next = if short_ma > long_ma && self.last_signal != SignalKind::Buy {
            SignalKind::Buy
        } else if short_ma < long_ma && self.last_signal != SignalKind::Sell {
            SignalKind::Sell
        } else {
            return None;
        };

        self.last_signal = next;
        Some(next)
    }
}

pub(crate) fn validate_windows(short_window: usize, long_window: usize) -> Result<(), StrategyError> {
    if short_window == 0 || long_window == 0 {
        return Err(StrategyError::InvalidParameters(format!(
            "windows must be at least 1 (short={}, long={})",
            short_window, long_window
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;

    fn series(closes: &[Decimal]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PriceBar::from_close(start + Duration::days(i as i64), *close))
            .collect()
    }

    #[test]
    fn test_sma_mean_of_trailing_window() {
        let bars = series(&[dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]);

        assert_eq!(sma(&bars, 3, 2), Some(dec!(2)));
        assert_eq!(sma(&bars, 3, 4), Some(dec!(4)));
        assert_eq!(sma(&bars, 5, 4), Some(dec!(3)));
        assert_eq!(sma(&bars, 1, 3), Some(dec!(4)));
    }

    #[test]
    fn test_sma_insufficient_history() {
        let bars = series(&[dec!(1), dec!(2), dec!(3)]);

        assert_eq!(sma(&bars, 3, 1), None);
        assert_eq!(sma(&bars, 4, 2), None);
        assert_eq!(sma(&bars, 0, 2), None);
        assert_eq!(sma(&bars, 2, 3), None);
    }

    #[test]
    fn test_sma_series_matches_pointwise_sma() {
        let closes: Vec<Decimal> = (0..60)
            .map(|i| Decimal::new(10_000 + (i * 37 % 101) * 25, 2))
            .collect();
        let bars = series(&closes);

        for period in [1, 3, 7, 20, 60, 61] {
            let rolling = sma_series(&bars, period);
            assert_eq!(rolling.len(), bars.len());
            for (i, value) in rolling.iter().enumerate() {
                assert_eq!(*value, sma(&bars, period, i), "period {} index {}", period, i);
            }
        }
    }

    #[test]
    fn test_sma_overflow_yields_none_and_recovers() {
        let bars = series(&[Decimal::MAX, Decimal::MAX, dec!(1), dec!(1), dec!(1)]);

        assert_eq!(sma(&bars, 2, 1), None);
        assert_eq!(sma(&bars, 2, 3), Some(dec!(1)));

        let values = sma_series(&bars, 2);
        assert_eq!(values, vec![None, None, None, Some(dec!(1)), Some(dec!(1))]);
        for (i, value) in values.iter().enumerate() {
            assert_eq!(*value, sma(&bars, 2, i));
        }
    }

    #[test]
    fn test_crossover_suppresses_repeats() {
        let mut crossover = SmaCrossover::new();

        assert_eq!(crossover.observe(dec!(11), dec!(10)), Some(SignalKind::Buy));
        assert_eq!(crossover.observe(dec!(12), dec!(10)), None);
        assert_eq!(crossover.observe(dec!(9), dec!(10)), Some(SignalKind::Sell));
        assert_eq!(crossover.observe(dec!(8), dec!(10)), None);
        assert_eq!(crossover.observe(dec!(10.5), dec!(10)), Some(SignalKind::Buy));
    }

    #[test]
    fn test_crossover_equality_keeps_state() {
        let mut crossover = SmaCrossover::new();
        assert_eq!(crossover.observe(dec!(10), dec!(10)), None);
        assert_eq!(crossover.last_signal(), SignalKind::Hold);

        crossover.observe(dec!(11), dec!(10));
        assert_eq!(crossover.observe(dec!(10), dec!(10)), None);
        assert_eq!(crossover.last_signal(), SignalKind::Buy);
    }

    #[test]
    fn test_validate_windows() {
        assert!(validate_windows(50, 200).is_ok());
        assert!(validate_windows(0, 200).is_err());
        assert!(validate_windows(10, 0).is_err());
    }
}
