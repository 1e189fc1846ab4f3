//! Error types for fetch and cache operations
//!
//! `FetchError` describes why a single keyed retrieval failed. `BatchFailure`
//! is the aggregate signal a batch fetch reports when one or more of its
//! retrievals failed.

use thiserror::Error;

/// Error for a single keyed retrieval
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport error - connection refused, reset, timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded into the expected value
    #[error("Decode error: {0}")]
    Decode(String),

    /// Remote answered with a non-success status
    #[error("Unexpected status {status}: {context}")]
    Status { status: u16, context: String },

    /// Remote has no entity for the requested identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource locator could not be turned into a request
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// The spawned retrieval for `key` panicked or was aborted
    #[error("Retrieval task for '{key}' did not complete: {reason}")]
    TaskFailed { key: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl FetchError {
    /// Whether the failure came from the remote side rather than local plumbing
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            FetchError::Transport(_)
                | FetchError::Decode(_)
                | FetchError::Status { .. }
                | FetchError::NotFound(_)
        )
    }
}

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

impl From<String> for FetchError {
    fn from(s: String) -> Self {
        FetchError::Other(s)
    }
}

impl From<&str> for FetchError {
    fn from(s: &str) -> Self {
        FetchError::Other(s.to_string())
    }
}

/// Aggregate failure of a batch fetch
///
/// `first_error` is whichever failure the fan-in observed first. Retrievals
/// complete in no particular order, so for a batch with several failing keys
/// the reported error may differ between runs. Callers should only rely on
/// `failure_count` being exact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{failure_count} retrieval(s) failed, first: {first_error}")]
pub struct BatchFailure {
    #[source]
    pub first_error: FetchError,
    pub failure_count: usize,
}

impl BatchFailure {
    pub fn new(first_error: FetchError, failure_count: usize) -> Self {
        Self {
            first_error,
            failure_count,
        }
    }
}

/// Outcome of a batch fetch: every requested value, or the aggregate failure
pub type BatchResult<V> = std::result::Result<Vec<V>, BatchFailure>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let error = FetchError::Transport("connection reset".to_string());
        assert_eq!(error.to_string(), "Transport error: connection reset");

        let status = FetchError::Status {
            status: 500,
            context: "GET /api/v1/nft/a".to_string(),
        };
        assert!(status.to_string().contains("status 500"));

        let task = FetchError::TaskFailed {
            key: "a".to_string(),
            reason: "panicked".to_string(),
        };
        assert!(task.to_string().contains("'a'"));
    }

    #[test]
    fn test_error_conversion() {
        let error: FetchError = "test error".into();
        assert!(matches!(error, FetchError::Other(_)));

        let error: FetchError = "test error".to_string().into();
        assert!(matches!(error, FetchError::Other(_)));
    }

    #[test]
    fn test_is_remote() {
        assert!(FetchError::NotFound("a".into()).is_remote());
        assert!(FetchError::Decode("bad json".into()).is_remote());
        assert!(!FetchError::Config("missing token".into()).is_remote());
        assert!(!FetchError::InvalidLocator("::".into()).is_remote());
    }

    #[test]
    fn test_batch_failure_source() {
        let failure = BatchFailure::new(FetchError::NotFound("c".into()), 2);
        assert_eq!(failure.failure_count, 2);
        assert!(failure.to_string().starts_with("2 retrieval(s) failed"));

        let source = failure.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Not found: c"));
    }
}
