use thiserror::Error;

/// Index backend errors
#[derive(Error, Debug)]
pub enum IndexError {
    /// Semaphore closed
    #[error("Semaphore closed")]
    SemaphoreClosed,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Index endpoint returned an error response
    #[error("Index error (status {status}): {message}")]
    Backend { status: u16, message: String },

    /// Failed to connect after multiple retries
    #[error("Failed to connect to index after {attempts} attempts")]
    ConnectionFailed { attempts: u32 },

    #[error("Failed to parse response: {reason}")]
    ParseError { reason: String },

    #[error("Invalid SPARQL: {reason}")]
    InvalidQuery { reason: String },

    /// Embedded store failure
    #[error("{0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
