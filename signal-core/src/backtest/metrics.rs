// signal-core/src/backtest/metrics.rs

use rust_decimal::Decimal;
use signal_common::Trade;

use crate::error::StrategyError;

/// Summary statistics of one simulation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metrics {
    pub total_return_pct: Decimal,
    pub win_rate_pct: Decimal,
    /// Open and closed trades
    pub trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
}

#[derive(Debug, Default)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate(
        &self,
        trades: &[Trade],
        initial_capital: Decimal,
        final_balance: Decimal,
    ) -> Result<Metrics, StrategyError> {
        let (winning, losing, closed) = self.analyze_trades(trades);

        Ok(Metrics {
            total_return_pct: self.calculate_total_return(initial_capital, final_balance)?,
            win_rate_pct: self.calculate_win_rate(winning, closed),
            trade_count: trades.len(),
            winning_trades: winning,
            losing_trades: losing,
        })
    }

    /// Counts (winning, losing, closed). Open trades have no profit and are skipped.
    fn analyze_trades(&self, trades: &[Trade]) -> (usize, usize, usize) {
        trades
            .iter()
            .filter_map(|t| t.profit)
            .fold((0, 0, 0), |(win, loss, closed), profit| {
                if profit > Decimal::ZERO {
                    (win + 1, loss, closed + 1)
                } else if profit < Decimal::ZERO {
                    (win, loss + 1, closed + 1)
                } else {
                    (win, loss, closed + 1)
                }
            })
    }

    fn calculate_total_return(
        &self,
        initial_capital: Decimal,
        final_balance: Decimal,
    ) -> Result<Decimal, StrategyError> {
        if initial_capital.is_zero() {
            return Ok(Decimal::ZERO);
        }

        final_balance
            .checked_sub(initial_capital)
            .and_then(|gain| gain.checked_div(initial_capital))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| {
                StrategyError::Overflow(format!(
                    "total return of {} on {} capital",
                    final_balance, initial_capital
                ))
            })
    }

    fn calculate_win_rate(&self, winning_trades: usize, closed_trades: usize) -> Decimal {
        if closed_trades == 0 {
            return Decimal::ZERO;
        }

        Decimal::from(winning_trades) / Decimal::from(closed_trades) * Decimal::from(100)
    }
}
