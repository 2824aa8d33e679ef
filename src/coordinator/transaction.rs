use quadsync_index::IndexWrite;
use quadsync_repository::Transaction;

/// A caller-owned transaction plus the index writes made under it.
///
/// Finish it with `commit_transaction` or `rollback_transaction` on the
/// coordinator. Dropping it rolls the authoritative side back and discards
/// the queued index writes.
#[derive(Debug)]
pub struct WriteTransaction {
    pub(super) inner: Transaction,
    pub(super) pending: Vec<IndexWrite>,
}

impl WriteTransaction {
    pub(super) fn new(inner: Transaction) -> Self {
        Self {
            inner,
            pending: Vec::new(),
        }
    }

    pub fn dataset(&self) -> &str {
        self.inner.dataset()
    }

    /// Index writes replayed, in order, once the transaction commits.
    pub fn pending_index_writes(&self) -> &[IndexWrite] {
        &self.pending
    }
}
