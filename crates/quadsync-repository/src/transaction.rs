use std::{sync::Arc, time::Instant};

use quadsync_observability::{record_transaction_open_delta, record_transaction_outcome};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::error::{RepositoryError, Result};

/// Hands out transactions, each holding one pooled connection.
#[derive(Clone)]
pub struct TransactionManager {
    conn: Arc<DatabaseConnection>,
}

impl TransactionManager {
    pub fn new(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }

    /// Acquire a connection from the pool and open a transaction on it.
    pub async fn begin(&self, dataset: &str) -> Result<Transaction> {
        let inner = self.conn.begin().await?;
        tracing::trace!(dataset = %dataset, "Transaction opened");
        Ok(Transaction {
            inner,
            guard: OpenGuard::new(dataset),
        })
    }
}

/// An open transaction on the authoritative store, bound to one dataset.
///
/// `commit` and `rollback` consume the value, so a finished transaction can
/// never be used again. Dropping an open transaction rolls it back and
/// returns its connection to the pool.
pub struct Transaction {
    inner: DatabaseTransaction,
    guard: OpenGuard,
}

impl Transaction {
    pub fn dataset(&self) -> &str {
        &self.guard.dataset
    }

    /// Connection handle for statements that must run inside this transaction.
    pub fn connection(&self) -> &DatabaseTransaction {
        &self.inner
    }

    pub fn ensure_dataset(&self, dataset: &str) -> Result<()> {
        if self.guard.dataset == dataset {
            Ok(())
        } else {
            Err(RepositoryError::DatasetMismatch {
                bound: self.guard.dataset.clone(),
                requested: dataset.to_string(),
            })
        }
    }

    pub async fn commit(self) -> Result<()> {
        let Self { inner, mut guard } = self;
        guard.open = false;
        let result = inner.commit().await;
        let outcome = if result.is_ok() {
            "committed"
        } else {
            "commit_failed"
        };
        guard.finish(outcome);
        result.map_err(RepositoryError::from)
    }

    pub async fn rollback(self) -> Result<()> {
        let Self { inner, mut guard } = self;
        guard.open = false;
        let result = inner.rollback().await;
        let outcome = if result.is_ok() {
            "rolled_back"
        } else {
            "rollback_failed"
        };
        guard.finish(outcome);
        result.map_err(RepositoryError::from)
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("dataset", &self.guard.dataset)
            .finish_non_exhaustive()
    }
}

/// Tracks whether a transaction ended without an explicit commit/rollback.
struct OpenGuard {
    dataset: String,
    opened_at: Instant,
    open: bool,
}

impl OpenGuard {
    fn new(dataset: &str) -> Self {
        record_transaction_open_delta(1.0);
        Self {
            dataset: dataset.to_string(),
            opened_at: Instant::now(),
            open: true,
        }
    }

    fn finish(&self, outcome: &str) {
        tracing::trace!(
            dataset = %self.dataset,
            outcome = outcome,
            "Transaction finished"
        );
        record_transaction_outcome(outcome, self.opened_at.elapsed());
    }
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        if self.open {
            // The DatabaseTransaction rolls itself back when dropped.
            tracing::warn!(
                dataset = %self.dataset,
                "Transaction dropped without commit or rollback; rolled back"
            );
            self.finish("dropped");
        }
        record_transaction_open_delta(-1.0);
    }
}
