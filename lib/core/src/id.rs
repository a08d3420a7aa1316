//! Strongly-typed identifiers for conversations and messages.
//!
//! Identifiers are opaque strings. Freshly allocated ones are a short prefix
//! followed by a ULID, which keeps them unique and roughly ordered by
//! creation time. Anything non-empty is accepted when parsing, so stored data
//! from older builds keeps loading.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate an opaque string identifier type.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Allocates a new, unique ID.
            #[must_use]
            pub fn new() -> Self {
                Self(format!("{}_{}", $prefix, Ulid::new()))
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ParseIdError {
                        id_type: stringify!($name),
                        reason: "identifier is empty".to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a conversation.
    ConversationId,
    "conv"
);

define_id!(
    /// Unique identifier for a message within a conversation.
    MessageId,
    "msg"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_display_format() {
        let id = ConversationId::new();
        assert!(id.to_string().starts_with("conv_"));
    }

    #[test]
    fn message_id_display_format() {
        let id = MessageId::new();
        assert!(id.as_str().starts_with("msg_"));
    }

    #[test]
    fn new_ids_are_unique() {
        use std::collections::HashSet;

        let ids: HashSet<ConversationId> = (0..100).map(|_| ConversationId::new()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn parse_roundtrip() {
        let id = ConversationId::new();
        let parsed: ConversationId = id.to_string().parse().expect("should parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_accepts_foreign_shapes() {
        let parsed: MessageId = "V1StGXR8_Z5jdHi6B-myT".parse().expect("should parse");
        assert_eq!(parsed.as_str(), "V1StGXR8_Z5jdHi6B-myT");
    }

    #[test]
    fn parse_rejects_empty() {
        let result: Result<ConversationId, _> = "   ".parse();
        let err = result.unwrap_err();
        assert_eq!(err.id_type, "ConversationId");
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id: ConversationId = "abc123".parse().expect("should parse");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"abc123\"");

        let parsed: ConversationId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
