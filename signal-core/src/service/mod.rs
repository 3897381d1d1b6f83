pub mod errors;
pub mod strategy;
pub mod types;

// Re-export main interfaces
pub use errors::ServiceError;
pub use strategy::StrategyService;
pub use types::*;
