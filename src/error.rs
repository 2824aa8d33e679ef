use thiserror::Error;

/// Top-level error of the `quadsync` binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Connecting to or migrating the authoritative store failed.
    #[error("Repository error: {0}")]
    Repository(#[from] quadsync_repository::RepositoryError),

    /// The index never answered its startup health check.
    #[error("Index error: {0}")]
    Index(#[from] quadsync_index::IndexError),

    #[error(transparent)]
    Write(#[from] crate::coordinator::DualWriteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid N-Quads input: {0}")]
    NQuads(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
