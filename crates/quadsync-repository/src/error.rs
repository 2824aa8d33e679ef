use thiserror::Error;

/// Error types for repository/database operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database error - wraps all SeaORM errors
    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),

    /// A term had no id after the batched check+insert. Indicates a store bug.
    #[error("Term resolution failed in dataset '{dataset}': no id for {term}")]
    TermResolution { dataset: String, term: String },

    /// A transaction begun for one dataset was used for another.
    #[error("Transaction is bound to dataset '{bound}', not '{requested}'")]
    DatasetMismatch { bound: String, requested: String },

    /// A stored term row could not be turned back into a term.
    #[error("Corrupt term {id}: {reason}")]
    CorruptTerm { id: String, reason: String },
}

/// Convenient Result type alias for RepositoryError
pub type Result<T> = std::result::Result<T, RepositoryError>;
