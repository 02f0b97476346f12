//! Malformed frame record for undecodable stream lines.
//!
//! When a `data:` line cannot be decoded into an update event, the decoder
//! produces a MalformedFrame instead of failing the session.

use crate::model::DecodeError;

/// A candidate record that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFrame {
    raw_line: String,
    error: DecodeError,
}

impl MalformedFrame {
    /// Create a new malformed frame.
    ///
    /// # Arguments
    ///
    /// * `raw_line` - The line content that failed to decode (lossy for invalid UTF-8)
    /// * `error` - Why decoding failed; carries the line number
    pub fn new(raw_line: impl Into<String>, error: DecodeError) -> Self {
        Self {
            raw_line: raw_line.into(),
            error,
        }
    }

    /// Line number where the error occurred (1-indexed).
    pub fn line_number(&self) -> usize {
        self.error.line()
    }

    /// Get the raw line content.
    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    /// Get the decode error.
    pub fn error(&self) -> &DecodeError {
        &self.error
    }
}
