// data/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{debug, info};

use super::errors::{DataError, DataResult};
use super::repository::{BacktestRepository, PriceRepository, SignalRepository};
use super::types::{
    BacktestConfig, BacktestRecord, BacktestResult, NewSignal, PriceBar, Signal, Trade,
};

/// Rows per INSERT statement when writing a signal set
const INSERT_CHUNK_SIZE: usize = 1000;

/// Connection pool settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Connection lifetime in seconds
    pub max_lifetime: u64,
}

/// PostgreSQL-backed store for prices, signals and backtest history
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> DataResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .connect(&config.url)
            .await?;

        info!(
            "Connected to PostgreSQL (max_connections={})",
            config.max_connections
        );
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled schema migrations
    pub async fn migrate(&self) -> DataResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("Database migrations applied");
        Ok(())
    }

    pub async fn check_connection(&self) -> DataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn to_i32(value: usize, field: &str) -> DataResult<i32> {
    i32::try_from(value)
        .map_err(|_| DataError::InvalidData(format!("{} out of range: {}", field, value)))
}

fn to_usize(value: i32, field: &str) -> DataResult<usize> {
    usize::try_from(value)
        .map_err(|_| DataError::InvalidData(format!("negative {}: {}", field, value)))
}

#[derive(FromRow)]
struct PriceBarRow {
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl From<PriceBarRow> for PriceBar {
    fn from(row: PriceBarRow) -> Self {
        PriceBar::new(row.date, row.open, row.high, row.low, row.close, row.volume)
    }
}

#[derive(FromRow)]
struct SignalRow {
    id: i64,
    date: NaiveDate,
    kind: String,
    confidence: Decimal,
    reason: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<SignalRow> for Signal {
    type Error = DataError;

    fn try_from(row: SignalRow) -> Result<Self, Self::Error> {
        Ok(Signal {
            id: row.id,
            date: row.date,
            kind: row.kind.parse()?,
            confidence: row.confidence,
            reason: row.reason,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct BacktestRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    config: Json<BacktestConfig>,
    total_return: Decimal,
    win_rate: Decimal,
    trade_count: i32,
    winning_trades: i32,
    losing_trades: i32,
    final_balance: Decimal,
    trades: Json<Vec<Trade>>,
}

impl TryFrom<BacktestRow> for BacktestRecord {
    type Error = DataError;

    fn try_from(row: BacktestRow) -> Result<Self, Self::Error> {
        Ok(BacktestRecord {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            result: BacktestResult {
                config: row.config.0,
                total_return_pct: row.total_return,
                win_rate_pct: row.win_rate,
                trade_count: to_usize(row.trade_count, "trade_count")?,
                winning_trades: to_usize(row.winning_trades, "winning_trades")?,
                losing_trades: to_usize(row.losing_trades, "losing_trades")?,
                final_balance: row.final_balance,
                trades: row.trades.0,
            },
        })
    }
}

#[async_trait]
impl PriceRepository for PgStore {
    async fn get_prices(&self) -> DataResult<Vec<PriceBar>> {
        let rows = sqlx::query_as::<_, PriceBarRow>(
            "SELECT date, open, high, low, close, volume FROM price_bars ORDER BY date ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PriceBar::from).collect())
    }
}

#[async_trait]
impl SignalRepository for PgStore {
    async fn replace_signals(&self, signals: &[NewSignal]) -> DataResult<usize> {
        let mut tx = self.pool.begin().await?;

        let cleared = sqlx::query("DELETE FROM signals")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        for chunk in signals.chunks(INSERT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO signals (date, kind, confidence, reason) ");
            builder.push_values(chunk, |mut row, signal| {
                row.push_bind(signal.date)
                    .push_bind(signal.kind.as_str())
                    .push_bind(signal.confidence)
                    .push_bind(signal.reason.clone());
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        info!(
            "Replaced signal set: {} cleared, {} inserted",
            cleared,
            signals.len()
        );
        Ok(signals.len())
    }

    async fn list_signals(&self) -> DataResult<Vec<Signal>> {
        let rows = sqlx::query_as::<_, SignalRow>(
            "SELECT id, date, kind, confidence, reason, created_at \
             FROM signals ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Signal::try_from).collect()
    }
}

#[async_trait]
impl BacktestRepository for PgStore {
    async fn append_backtest(
        &self,
        name: &str,
        result: &BacktestResult,
    ) -> DataResult<BacktestRecord> {
        let config = &result.config;

        let (id, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO backtests (name, start_date, end_date, short_window, long_window, \
             config, total_return, win_rate, trade_count, winning_trades, losing_trades, \
             final_balance, trades) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING id, created_at",
        )
        .bind(name)
        .bind(config.start_date)
        .bind(config.end_date)
        .bind(to_i32(config.short_window, "short_window")?)
        .bind(to_i32(config.long_window, "long_window")?)
        .bind(Json(config))
        .bind(result.total_return_pct)
        .bind(result.win_rate_pct)
        .bind(to_i32(result.trade_count, "trade_count")?)
        .bind(to_i32(result.winning_trades, "winning_trades")?)
        .bind(to_i32(result.losing_trades, "losing_trades")?)
        .bind(result.final_balance)
        .bind(Json(&result.trades))
        .fetch_one(&self.pool)
        .await?;

        debug!("Stored backtest {} as id {}", name, id);
        Ok(BacktestRecord {
            id,
            name: name.to_string(),
            created_at,
            result: result.clone(),
        })
    }

    async fn list_backtests(&self) -> DataResult<Vec<BacktestRecord>> {
        let rows = sqlx::query_as::<_, BacktestRow>(
            "SELECT id, name, created_at, config, total_return, win_rate, trade_count, \
             winning_trades, losing_trades, final_balance, trades \
             FROM backtests ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BacktestRecord::try_from).collect()
    }
}
