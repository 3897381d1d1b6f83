use signal_common::DataError;
use thiserror::Error;

use crate::error::StrategyError;

/// Service layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Storage error: {0}")]
    Storage(#[from] DataError),

    /// The server's own strategy settings are unusable
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ServiceError {
    /// Check if the request itself was at fault
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::Strategy(_) => true,
            ServiceError::Storage(_) | ServiceError::Configuration(_) => false,
        }
    }
}
