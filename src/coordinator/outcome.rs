use std::fmt;

use quadsync_repository::AmbiguousTermMatch;

/// What happened on the index side of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSyncStatus {
    Synced,
    /// Queued on a caller-owned transaction until it is committed.
    Deferred,
    /// Index sync disabled, or nothing to send.
    Skipped,
    /// The authoritative write stands; the index lags until repaired.
    Failed(String),
}

impl IndexSyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Deferred => "deferred",
            Self::Skipped => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for IndexSyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    /// Distinct quads written; re-inserted quads count too.
    pub inserted: usize,
    /// Rows actually deleted.
    pub removed: u64,
    /// Delete operands left unresolved because several stored values matched.
    pub ambiguous_matches: Vec<AmbiguousTermMatch>,
    pub index: IndexSyncStatus,
}
