// signal-core/src/backtest/engine.rs

use rust_decimal::Decimal;
use signal_common::{
    BacktestConfig, BacktestResult, LookbackMode, PriceBar, ProfitMode, SignalKind, Trade,
};
use tracing::{debug, info};

use super::metrics::MetricsCalculator;
use super::sma::{sma_series, validate_windows, SmaCrossover};
use crate::error::StrategyError;

/// Simulates an all-in/all-out long position driven by the SMA crossover.
pub struct BacktestEngine {
    config: BacktestConfig,
    metrics_calculator: MetricsCalculator,
}

/// Cash, position and trade book while walking the range
struct Portfolio {
    balance: Decimal,
    position: Decimal,
    entry_capital: Decimal,
    trades: Vec<Trade>,
}

impl Portfolio {
    fn new(initial_capital: Decimal) -> Self {
        Self {
            balance: initial_capital,
            position: Decimal::ZERO,
            entry_capital: Decimal::ZERO,
            trades: Vec::new(),
        }
    }

    fn is_long(&self) -> bool {
        self.trades.last().map_or(false, Trade::is_open)
    }
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Result<Self, StrategyError> {
        validate_windows(config.short_window, config.long_window)?;
        if config.initial_capital <= Decimal::ZERO {
            return Err(StrategyError::InvalidParameters(format!(
                "initial capital must be positive, got {}",
                config.initial_capital
            )));
        }

        Ok(Self {
            config,
            metrics_calculator: MetricsCalculator::new(),
        })
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run the simulation over the bars dated within `[start_date, end_date]`.
    ///
    /// `bars` must be ascending by date. Fails with `RangeTooSmall` when the
    /// range holds fewer bars than the long window, and with `Overflow` when
    /// a position or balance cannot be represented.
    pub fn run(&self, bars: &[PriceBar]) -> Result<BacktestResult, StrategyError> {
        let config = &self.config;
        let start = bars.partition_point(|bar| bar.date < config.start_date);
        let end = bars
            .partition_point(|bar| bar.date <= config.end_date)
            .max(start);

        let in_range = end - start;
        if in_range < config.long_window {
            return Err(StrategyError::RangeTooSmall {
                required: config.long_window,
                available: in_range,
            });
        }

        info!(
            "Running backtest {}..{} with SMA {}/{} over {} bars",
            config.start_date, config.end_date, config.short_window, config.long_window, in_range
        );

        // (series the averages are computed on, first index that may trade)
        let (series, first) = match config.lookback {
            LookbackMode::RangeLocal => (&bars[start..end], config.long_window),
            LookbackMode::FullHistory => (&bars[..end], start.max(config.long_window)),
        };

        let short_ma = sma_series(series, config.short_window);
        let long_ma = sma_series(series, config.long_window);
        let mut crossover = SmaCrossover::new();
        let mut portfolio = Portfolio::new(config.initial_capital);

        for i in first..series.len() {
            let (Some(short), Some(long)) = (short_ma[i], long_ma[i]) else {
                continue;
            };
            let bar = &series[i];
            if bar.close.is_zero() {
                debug!("Skipping {}: zero close cannot be traded", bar.date);
                continue;
            }

            match crossover.observe(short, long) {
                Some(SignalKind::Buy) => self.enter(&mut portfolio, bar)?,
                Some(SignalKind::Sell) if portfolio.is_long() => self.exit(&mut portfolio, bar)?,
                _ => {}
            }
        }

        let metrics = self.metrics_calculator.calculate(
            &portfolio.trades,
            config.initial_capital,
            portfolio.balance,
        )?;

        info!(
            "Backtest completed: {} trades, return {}%, win rate {}%",
            metrics.trade_count,
            metrics.total_return_pct.round_dp(2),
            metrics.win_rate_pct.round_dp(2)
        );

        Ok(BacktestResult {
            config: config.clone(),
            total_return_pct: metrics.total_return_pct,
            win_rate_pct: metrics.win_rate_pct,
            trade_count: metrics.trade_count,
            winning_trades: metrics.winning_trades,
            losing_trades: metrics.losing_trades,
            final_balance: portfolio.balance,
            trades: portfolio.trades,
        })
    }

    fn enter(&self, portfolio: &mut Portfolio, bar: &PriceBar) -> Result<(), StrategyError> {
        portfolio.position = portfolio.balance.checked_div(bar.close).ok_or_else(|| {
            StrategyError::Overflow(format!(
                "buying {} of capital at {} on {}",
                portfolio.balance, bar.close, bar.date
            ))
        })?;
        portfolio.entry_capital = portfolio.balance;
        portfolio.trades.push(Trade::open(bar.date, bar.close));
        debug!(
            "BUY {} @ {} ({} units)",
            bar.date, bar.close, portfolio.position
        );
        Ok(())
    }

    fn exit(&self, portfolio: &mut Portfolio, bar: &PriceBar) -> Result<(), StrategyError> {
        portfolio.balance = portfolio.position.checked_mul(bar.close).ok_or_else(|| {
            StrategyError::Overflow(format!(
                "selling {} units at {} on {}",
                portfolio.position, bar.close, bar.date
            ))
        })?;
        portfolio.position = Decimal::ZERO;

        let profit = match self.config.profit_mode {
            ProfitMode::PerTrade => portfolio.balance - portfolio.entry_capital,
            ProfitMode::Cumulative => portfolio.balance - self.config.initial_capital,
        };

        if let Some(trade) = portfolio.trades.last_mut() {
            trade.close(bar.date, bar.close, profit);
        }
        debug!("SELL {} @ {} (profit {})", bar.date, bar.close, profit);
        Ok(())
    }
}
