//! Error types for the AI crate.

use std::fmt;

/// Errors from generating a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponderError {
    /// The responder cannot be reached.
    Unavailable { responder: String, reason: String },
    /// The responder rejected or failed the request.
    RequestFailed { reason: String },
    /// No reply arrived in time.
    Timeout { after_ms: u64 },
}

impl fmt::Display for ResponderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { responder, reason } => {
                write!(f, "responder '{responder}' unavailable: {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "reply generation failed: {reason}")
            }
            Self::Timeout { after_ms } => {
                write!(f, "no reply after {after_ms}ms")
            }
        }
    }
}

impl std::error::Error for ResponderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responder_error_display() {
        let err = ResponderError::Unavailable {
            responder: "canned".to_string(),
            reason: "shut down".to_string(),
        };
        assert!(err.to_string().contains("canned"));
        assert!(err.to_string().contains("shut down"));

        let err = ResponderError::Timeout { after_ms: 500 };
        assert!(err.to_string().contains("500ms"));
    }
}
