//! Update events carried by the analysis stream.

use crate::model::AnalysisResult;

/// One decoded server update.
///
/// `Complete` and `Error` are terminal: exactly one of them ends a session.
/// `Progress` and `Token` may appear any number of times before it, in any order
/// the server chooses, and must be applied in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    /// A step of the server-side pipeline started.
    Progress {
        /// Human-readable description of the step.
        message: String,
        /// Step indicator, increasing as the analysis advances.
        step: u32,
    },
    /// Incremental model output. Tokens concatenate in arrival order.
    Token {
        text: String,
    },
    /// Final verdict.
    Complete(Box<AnalysisResult>),
    /// The server gave up; `message` explains why.
    Error {
        message: String,
    },
    /// A frame whose `type` this client does not know. Ignored.
    Unknown {
        kind: String,
    },
}

impl UpdateEvent {
    /// Returns true for `Complete` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, UpdateEvent::Complete(_) | UpdateEvent::Error { .. })
    }

    /// Wire name of the frame type.
    pub fn kind(&self) -> &str {
        match self {
            UpdateEvent::Progress { .. } => "progress",
            UpdateEvent::Token { .. } => "stream",
            UpdateEvent::Complete(_) => "complete",
            UpdateEvent::Error { .. } => "error",
            UpdateEvent::Unknown { kind } => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_complete_and_error_are_terminal() {
        let progress = UpdateEvent::Progress {
            message: "Reading file".to_string(),
            step: 1,
        };
        let token = UpdateEvent::Token {
            text: "hi".to_string(),
        };
        let error = UpdateEvent::Error {
            message: "boom".to_string(),
        };
        let unknown = UpdateEvent::Unknown {
            kind: "heartbeat".to_string(),
        };

        assert!(!progress.is_terminal());
        assert!(!token.is_terminal());
        assert!(!unknown.is_terminal());
        assert!(error.is_terminal());
    }

    #[test]
    fn kind_reports_wire_names() {
        let token = UpdateEvent::Token {
            text: String::new(),
        };
        let unknown = UpdateEvent::Unknown {
            kind: "heartbeat".to_string(),
        };
        assert_eq!(token.kind(), "stream");
        assert_eq!(unknown.kind(), "heartbeat");
    }
}
