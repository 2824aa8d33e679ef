use quadsync_repository::RepositoryError;
use thiserror::Error;

use crate::{config::ConfigError, update_parser::UpdateParseError};

/// Errors that fail a write. Index failures never appear here; they are
/// reported through [`super::IndexSyncStatus::Failed`].
#[derive(Error, Debug)]
pub enum DualWriteError {
    #[error(transparent)]
    Parse(#[from] UpdateParseError),

    #[error("Term resolution failed: {0}")]
    TermResolution(#[source] RepositoryError),

    /// The authoritative store rejected the write. An owned transaction has
    /// been rolled back.
    #[error("Authoritative write failed: {0}")]
    AuthoritativeWrite(#[source] RepositoryError),

    #[error("Transaction is bound to dataset '{bound}', not '{requested}'")]
    DatasetMismatch { bound: String, requested: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<RepositoryError> for DualWriteError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::DatasetMismatch { bound, requested } => {
                Self::DatasetMismatch { bound, requested }
            }
            error @ RepositoryError::TermResolution { .. } => Self::TermResolution(error),
            error => Self::AuthoritativeWrite(error),
        }
    }
}

impl DualWriteError {
    /// Short label for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::TermResolution(_) => "term_resolution",
            Self::AuthoritativeWrite(_) => "authoritative_write",
            Self::DatasetMismatch { .. } => "dataset_mismatch",
            Self::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, DualWriteError>;
