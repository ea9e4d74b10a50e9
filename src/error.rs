//! Error types for jasper-exec
//!
//! Every failure of a report execution is reported as exactly one [`Error`].
//! The variants follow the stages of an execution:
//! - construction (`Config`)
//! - job submission (`Submission`)
//! - status reads (`Poll`, `ReportFailed`)
//! - the overall deadline and caller cancellation (`TimedOut`, `Cancelled`)
//! - opening and reading the output (`Fetch`, `Stream`)
//!
//! Network failures at any step surface as `Transport`.

use crate::types::{ExecutionState, RequestId};
use thiserror::Error;

/// Result type alias for jasper-exec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for jasper-exec
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing client configuration, raised before any network access
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "endpoint")
        key: Option<String>,
    },

    /// The job-creation request was rejected or its response was unusable
    #[error("report submission failed: {detail}")]
    Submission {
        /// HTTP status of the rejected response
        status: u16,
        /// Response body or description of the protocol violation
        detail: String,
    },

    /// Network-level failure at any HTTP step
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A status read returned a non-success HTTP status
    #[error("error fetching report request status: {detail}")]
    Poll {
        /// The job whose status was requested
        request_id: RequestId,
        /// HTTP status returned by the server
        status: u16,
        /// Response body
        detail: String,
    },

    /// The job reached the terminal "failed" status on the server
    #[error("report {request_id} failed: {detail}")]
    ReportFailed {
        /// The job that failed
        request_id: RequestId,
        /// Error description reported by the server
        detail: String,
    },

    /// The overall submit+poll deadline elapsed
    #[error("report request timed out after {seconds} seconds")]
    TimedOut {
        /// The configured deadline, in seconds
        seconds: f64,
    },

    /// The caller cancelled the execution before the output was handed over
    #[error("report execution cancelled")]
    Cancelled,

    /// The output resource could not be opened
    #[error("failed to open report output for {request_id}: {detail}")]
    Fetch {
        /// The job whose output was requested
        request_id: RequestId,
        /// Reason the output could not be opened
        detail: String,
    },

    /// Failure while reading the output stream
    #[error("error reading report output: {0}")]
    Stream(String),

    /// A response body could not be decoded
    #[error("invalid response from {endpoint}: {source}")]
    InvalidResponse {
        /// The endpoint that returned the body
        endpoint: String,
        /// Decoding error
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Build a configuration error for a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }

    /// Machine-readable error code, stable across releases
    pub fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Submission { .. } => "submission_error",
            Error::Transport(_) => "transport_error",
            Error::Poll { .. } => "poll_error",
            Error::ReportFailed { .. } => "report_failed",
            Error::TimedOut { .. } => "timed_out",
            Error::Cancelled => "cancelled",
            Error::Fetch { .. } => "fetch_error",
            Error::Stream(_) => "stream_error",
            Error::InvalidResponse { .. } => "invalid_response",
        }
    }

    /// The execution state an operation ends in when it fails with this error
    ///
    /// `Stream` errors occur after the execution completed, so they map to `Done`.
    pub fn terminal_state(&self) -> ExecutionState {
        match self {
            Error::TimedOut { .. } => ExecutionState::TimedOut,
            Error::Cancelled => ExecutionState::Cancelled,
            Error::Stream(_) => ExecutionState::Done,
            _ => ExecutionState::Failed,
        }
    }
}

/// Trait for errors that can be classified as retryable or not
///
/// The client never retries on its own. Callers that want a retry policy can
/// use this classification to decide whether running the report again is worthwhile.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation could be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Only connection-level and timeout failures are transient
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            // The job took too long this time; a later run may be faster
            Error::TimedOut { .. } => true,
            // Server-side 5xx responses are worth another attempt
            Error::Submission { status, .. } => *status >= 500,
            Error::Poll { status, .. } => *status >= 500,
            Error::Stream(_) => true,
            Error::Config { .. }
            | Error::ReportFailed { .. }
            | Error::Cancelled
            | Error::Fetch { .. }
            | Error::InvalidResponse { .. } => false,
        }
    }
}
