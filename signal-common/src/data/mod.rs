pub mod errors;
pub mod memory;
pub mod postgres;
pub mod repository;
pub mod types;
