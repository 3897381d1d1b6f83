use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use signal_common::{LookbackMode, PgStore, ProfitMode};
use signal_core::{
    api,
    config::Settings,
    service::{BacktestRequest, StrategyService},
};

#[derive(Parser)]
#[command(name = "signal-core")]
#[command(about = "SMA crossover signal generation and backtesting")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve,
    /// Recompute and replace the stored signal set
    Generate,
    /// Run a backtest over a date range
    Backtest {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        #[arg(long = "short")]
        short_window: Option<usize>,
        #[arg(long = "long")]
        long_window: Option<usize>,
        /// Compute averages over the whole series instead of the range only
        #[arg(long)]
        full_history: bool,
        /// Attribute profit against starting capital instead of per trade
        #[arg(long)]
        cumulative_profit: bool,
    },
    /// List stored signals, most recent first
    Signals {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// List stored backtests, most recent first
    History {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();
    let settings = Settings::new()?;

    let store = PgStore::connect(&settings.database).await?;
    store.check_connection().await?;
    store.migrate().await?;
    info!("Database connection established");

    let service = Arc::new(
        StrategyService::from_store(Arc::new(store))
            .with_strategy_settings(settings.strategy.clone())
            .with_backtest_settings(settings.backtest.clone()),
    );

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port).parse()?;
            api::serve(addr, service).await?;
            info!("Server shutdown complete");
        }

        Commands::Generate => {
            let summary = service.generate_signals().await?;
            println!("{}: {} signals", summary.message, summary.count);
        }

        Commands::Backtest {
            start,
            end,
            short_window,
            long_window,
            full_history,
            cumulative_profit,
        } => {
            let mut request = BacktestRequest::new(start, end);
            request.short_window = short_window;
            request.long_window = long_window;
            if full_history {
                request = request.with_lookback(LookbackMode::FullHistory);
            }
            if cumulative_profit {
                request = request.with_profit_mode(ProfitMode::Cumulative);
            }

            let record = service.run_backtest(request).await?;
            let result = &record.result;

            println!("\n{} ({} to {}):", record.name, start, end);
            println!("Total Return: {:.2}%", result.total_return_pct);
            println!("Win Rate: {:.2}%", result.win_rate_pct);
            println!("Total Trades: {}", result.trade_count);
            println!("Final Balance: {:.2}", result.final_balance);
            println!("\nTrade History:");
            for trade in &result.trades {
                match (trade.exit_date, trade.exit_price, trade.profit) {
                    (Some(exit_date), Some(exit_price), Some(profit)) => println!(
                        "{} @ {:.2} -> {} @ {:.2}  profit {:.2}",
                        trade.entry_date, trade.entry_price, exit_date, exit_price, profit
                    ),
                    _ => println!("{} @ {:.2} -> open", trade.entry_date, trade.entry_price),
                }
            }
        }

        Commands::Signals { limit } => {
            for signal in service.list_signals().await?.into_iter().take(limit) {
                println!(
                    "{} {:<4} {} ({})",
                    signal.date,
                    signal.kind.as_str(),
                    signal.confidence,
                    signal.reason
                );
            }
        }

        Commands::History { limit } => {
            for record in service.list_backtests().await?.into_iter().take(limit) {
                let result = &record.result;
                println!(
                    "#{} {} {}..{} return {:.2}% win rate {:.2}% trades {}",
                    record.id,
                    record.name,
                    result.config.start_date,
                    result.config.end_date,
                    result.total_return_pct,
                    result.win_rate_pct,
                    result.trade_count
                );
            }
        }
    }

    Ok(())
}
