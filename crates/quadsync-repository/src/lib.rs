mod config;
mod config_error;
pub mod error;
mod manager;
mod migrations;
mod models;
mod observability;
mod repositories;
mod transaction;
mod types;

#[cfg(test)]
mod tests;

pub use config::{
    DatabaseDriver, NumericFallbackConfig, RepositoryManagerConfig, RepositoryManagerConfigRaw,
};
pub use config_error::ConfigError;
pub use error::RepositoryError;
pub use manager::RepositoryManager;
pub use repositories::{quad_repository::QuadRepository, term_repository::TermRepository};
pub use transaction::{Transaction, TransactionManager};
pub use types::{AmbiguousTermMatch, InsertReport, NumericMatch, RemoveReport};
