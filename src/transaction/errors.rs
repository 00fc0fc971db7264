//! Resolution error types
//!
//! Any of these means the per-operation results cannot be trusted for the
//! whole transaction. Partial resolution is never returned.

use thiserror::Error;

/// Result type for result parsing and resolution
pub type ResolutionResult<T> = Result<T, ResolutionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Fewer results than queued operations
    #[error("expected {expected} results, got {actual}")]
    ResultsShort { expected: usize, actual: usize },

    /// Insert without a uuid result at its position
    #[error("no uuid result for named uuid '{name}' at operation {index}")]
    MissingResult { name: String, index: usize },

    /// Server reported an error; the transaction was not committed
    #[error("operation {index} failed: {error}{}", details.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    OperationFailed {
        index: usize,
        error: String,
        details: Option<String>,
    },

    /// Result that does not follow the protocol grammar
    #[error("malformed result{}: {reason}", index.map(|i| format!(" {}", i)).unwrap_or_default())]
    MalformedResult { index: Option<usize>, reason: String },
}

impl ResolutionError {
    pub(crate) fn malformed(index: Option<usize>, reason: impl Into<String>) -> Self {
        ResolutionError::MalformedResult {
            index,
            reason: reason.into(),
        }
    }
}
