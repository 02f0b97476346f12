//! Error types for the ShieldNet client.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the binary, wrapping every domain failure
//!   - [`SessionError`] - Streaming analysis session failures
//!     - [`TransportError`] - Connection never established, dropped, or idle too long
//!   - [`UploadError`] - The invoice file was rejected before anything was sent
//!   - [`ApiError`] - Request/response calls to the companion endpoints
//! - [`DecodeError`] - A single event frame could not be decoded
//!
//! # Error Recovery Strategy
//!
//! Decode errors are **non-fatal**: a corrupt frame is logged and skipped so that one bad
//! line never loses the rest of the stream. Every other kind propagates to the caller, who
//! decides whether to retry the whole session. Nothing is retried internally; uploads are
//! not resumable mid-stream.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error encompassing all failure modes of the command-line client.
#[derive(Debug, Error)]
pub enum AppError {
    /// A streaming analysis session failed.
    #[error("Analysis failed: {0}")]
    Session(#[from] SessionError),

    /// The invoice file could not be turned into an upload request.
    #[error("Invalid invoice upload: {0}")]
    Upload(#[from] UploadError),

    /// A companion endpoint call failed.
    #[error("Request failed: {0}")]
    Api(#[from] ApiError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Writing output to the terminal failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Failure of a streaming analysis session.
///
/// Exactly one of these is produced when a session does not resolve to a verdict.
/// [`DecodeError`] is deliberately absent: malformed frames never end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The connection could not be established, or was lost before a terminal event.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server sent a well-formed `error` frame.
    ///
    /// `message` is the server-supplied text, surfaced to the user as-is.
    #[error("Server reported an error: {message}")]
    Protocol {
        /// Message carried by the `error` frame.
        message: String,
    },

    /// The stream closed cleanly but never produced a `complete` or `error` frame.
    #[error("Stream ended without a result")]
    IncompleteStream,

    /// The caller cancelled the session before it terminated.
    #[error("Session cancelled")]
    Cancelled,
}

/// Transport-level failures of the upload stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response was received.
    #[error("Failed to connect to {endpoint}: {reason}")]
    Connect {
        /// Endpoint the upload was sent to.
        endpoint: String,
        /// Underlying failure description.
        reason: String,
    },

    /// The server answered the upload with a non-success status.
    #[error("Upload rejected with status {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-supplied detail, or a generic description.
        detail: String,
    },

    /// The response body failed mid-stream.
    #[error("Stream interrupted: {reason}")]
    Interrupted {
        /// Underlying failure description.
        reason: String,
    },

    /// No chunk arrived within the configured idle threshold.
    #[error("No data received for {limit:?}")]
    IdleTimeout {
        /// Idle threshold that elapsed.
        limit: Duration,
    },
}

/// Errors encountered when decoding a single event frame.
///
/// All variants carry the 1-based line number within the response body so that a
/// skipped frame can be located in a captured stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The line is not valid UTF-8.
    #[error("Invalid UTF-8 at line {line}")]
    InvalidUtf8 {
        /// 1-based line number.
        line: usize,
    },

    /// The frame payload is not valid JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use shieldnet::model::DecodeError;
    ///
    /// let err = DecodeError::InvalidJson {
    ///     line: 42,
    ///     message: "expected value at line 1 column 1".to_string(),
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// Parser message from `serde_json`.
        message: String,
    },

    /// A field required by the frame's `type` is absent.
    #[error("Missing required field '{field}' at line {line}")]
    MissingField {
        /// 1-based line number.
        line: usize,
        /// Name of the missing JSON key.
        field: &'static str,
    },

    /// The `result` of a `complete` frame does not describe a valid verdict.
    #[error("Invalid analysis result at line {line}: {message}")]
    InvalidResult {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the result.
        message: String,
    },
}

impl DecodeError {
    /// Line number the error refers to.
    pub fn line(&self) -> usize {
        match self {
            DecodeError::InvalidUtf8 { line }
            | DecodeError::InvalidJson { line, .. }
            | DecodeError::MissingField { line, .. }
            | DecodeError::InvalidResult { line, .. } => *line,
        }
    }
}

/// Errors raised while preparing an invoice for upload.
///
/// These mirror the backend's own validation so an obviously bad file is rejected
/// before a connection is opened.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The invoice file does not exist.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// The file extension is not one the service accepts.
    #[error("Unsupported invoice type '{extension}': expected PDF, PNG, JPG or JPEG")]
    UnsupportedType {
        /// Extension found on the path (empty when missing).
        extension: String,
    },

    /// The file exceeds the service's upload limit.
    #[error("Invoice is {size} bytes, exceeding the {limit} byte limit")]
    TooLarge {
        /// Actual file size.
        size: u64,
        /// Maximum accepted size.
        limit: u64,
    },

    /// Reading the file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the plain request/response companion endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the body could not be read.
    #[error("Request to {url} failed: {reason}")]
    Request {
        /// Full request URL.
        url: String,
        /// Underlying failure description.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {detail}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The `detail` message of the error body, or a generic description.
        detail: String,
    },

    /// The response body did not match the expected schema.
    #[error("Unexpected response from {url}: {reason}")]
    Decode {
        /// Full request URL.
        url: String,
        /// Deserialization error message.
        reason: String,
    },
}
