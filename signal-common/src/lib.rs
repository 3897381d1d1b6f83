pub mod data;

pub use data::errors::DataError;
pub use data::memory::InMemoryStore;
pub use data::postgres::{DatabaseConfig, PgStore};
pub use data::repository::{BacktestRepository, PriceRepository, SignalRepository};
pub use data::types::*;
