use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub use crate::config::RepositoryManagerConfig;
use crate::{
    config::NumericFallbackConfig,
    error::RepositoryError,
    migrations::Migrator,
    repositories::{quad_repository::QuadRepository, term_repository::TermRepository},
    transaction::TransactionManager,
};

pub struct RepositoryManager {
    conn: Arc<DatabaseConnection>,
    term_repository: TermRepository,
    quad_repository: QuadRepository,
    transaction_manager: TransactionManager,
    numeric_fallback: NumericFallbackConfig,
}

impl RepositoryManager {
    /// Creates a new RepositoryManager instance
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if:
    /// - Database connection fails (e.g. database missing, bad credentials)
    /// - Migrations fail
    pub async fn connect(config: &RepositoryManagerConfig) -> Result<Self, RepositoryError> {
        let mut opt = ConnectOptions::new(config.connection_string());
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .sqlx_logging(true)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        let conn = Arc::new(Database::connect(opt).await?);

        Migrator::up(conn.as_ref(), None).await?;

        tracing::info!(
            driver = ?config.driver,
            database = %config.database,
            "Connected to authoritative quad store"
        );

        let term_repository = TermRepository::new(config.max_batch_rows);
        Ok(RepositoryManager {
            quad_repository: QuadRepository::new(
                Arc::clone(&conn),
                term_repository.clone(),
                config.max_batch_rows,
            ),
            transaction_manager: TransactionManager::new(Arc::clone(&conn)),
            term_repository,
            numeric_fallback: config.numeric_fallback,
            conn,
        })
    }

    pub fn term_repository(&self) -> TermRepository {
        self.term_repository.clone()
    }

    pub fn quad_repository(&self) -> QuadRepository {
        self.quad_repository.clone()
    }

    pub fn transaction_manager(&self) -> TransactionManager {
        self.transaction_manager.clone()
    }

    pub fn numeric_fallback(&self) -> &NumericFallbackConfig {
        &self.numeric_fallback
    }

    /// Pooled connection for reads outside a transaction.
    pub fn connection(&self) -> &DatabaseConnection {
        self.conn.as_ref()
    }
}
