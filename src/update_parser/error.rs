use thiserror::Error;

/// Why an UPDATE request was rejected. Every variant is fatal to the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateParseError {
    #[error("Malformed SPARQL UPDATE: {reason}")]
    Syntax { reason: String },

    /// A request must carry exactly one operation.
    #[error("Expected exactly one update operation, found {0}")]
    OperationCount(usize),

    /// `DELETE WHERE` needs the WHERE clause evaluated against current data.
    /// Select the triples first and send them as `DELETE DATA`.
    #[error("Unsupported: pattern delete (DELETE WHERE)")]
    UnsupportedPatternDelete,

    #[error("Unsupported update operation: {0}")]
    UnsupportedOperation(&'static str),

    /// DELETE/INSERT templates must already be reduced to ground triples.
    #[error("Template is not ground: variable {variable}")]
    NonGroundTemplate { variable: String },

    #[error("Unsupported term '{term}': {reason}")]
    UnsupportedTerm { term: String, reason: String },
}

impl UpdateParseError {
    /// Short label for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "syntax",
            Self::OperationCount(_) => "operation_count",
            Self::UnsupportedPatternDelete => "pattern_delete",
            Self::UnsupportedOperation(_) => "unsupported_operation",
            Self::NonGroundTemplate { .. } => "non_ground_template",
            Self::UnsupportedTerm { .. } => "unsupported_term",
        }
    }
}
