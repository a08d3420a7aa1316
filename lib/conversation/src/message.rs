//! Chat messages and the roles that author them.

use chrono::{DateTime, Utc};
use colloquy_core::MessageId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Typed by the person using the session.
    User,
    /// Produced by the responder.
    Assistant,
}

impl MessageRole {
    /// Returns the wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single turn in a conversation.
///
/// Messages are immutable once created and only ever appended to their
/// owning conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Text as typed or generated.
    pub content: String,
    /// Who sent the message.
    pub role: MessageRole,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new message stamped with the current time.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            content: content.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}
