pub mod api;
pub mod backtest;
pub mod config;
pub mod error;
pub mod service;
pub mod signals;

pub use error::StrategyError;
