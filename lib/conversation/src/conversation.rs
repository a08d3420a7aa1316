//! Conversations and the snapshot that holds them.
//!
//! A conversation is a titled, append-only thread of messages. The snapshot
//! is the full in-memory state handed between store transforms: every
//! conversation in stored order plus the currently selected one.

use crate::message::Message;
use chrono::{DateTime, TimeDelta, Utc};
use colloquy_core::ConversationId;
use serde::{Deserialize, Serialize};

/// Title given to conversations that have not been named yet.
pub const DEFAULT_TITLE: &str = "New conversation";

/// A conversation between the user and the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Display title.
    pub title: String,
    /// Messages in conversation order.
    pub messages: Vec<Message>,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// When the conversation was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates an empty conversation with the given title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with `message` appended and `updated_at` advanced.
    #[must_use]
    pub fn with_message(&self, message: Message) -> Self {
        let mut next = self.clone();
        next.messages.push(message);
        next.touch();
        next
    }

    /// Returns a copy with a new title and `updated_at` advanced.
    #[must_use]
    pub fn with_title(&self, title: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.title = title.into();
        next.touch();
        next
    }

    /// Advances `updated_at` to now.
    ///
    /// If the clock has not moved past the previous value the timestamp is
    /// bumped by one nanosecond instead, so it always strictly increases.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + TimeDelta::nanoseconds(1)
        };
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns true while the conversation still carries [`DEFAULT_TITLE`].
    #[must_use]
    pub fn has_default_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }
}

/// The full conversation state at a point in time.
///
/// If `active_id` is set it names a conversation in `conversations`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// All conversations in stored order.
    pub conversations: Vec<Conversation>,
    /// The selected conversation, if any.
    pub active_id: Option<ConversationId>,
}

impl Snapshot {
    /// Creates a snapshot, dropping an active id that names no conversation.
    #[must_use]
    pub fn new(conversations: Vec<Conversation>, active_id: Option<ConversationId>) -> Self {
        let active_id = active_id.filter(|id| conversations.iter().any(|c| &c.id == id));
        Self {
            conversations,
            active_id,
        }
    }

    /// Looks up a conversation by ID.
    #[must_use]
    pub fn find(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    /// Returns true if a conversation with this ID exists.
    #[must_use]
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.find(id).is_some()
    }

    /// Returns the active conversation, if any.
    #[must_use]
    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.as_ref().and_then(|id| self.find(id))
    }

    /// Returns conversations ordered most recently updated first.
    #[must_use]
    pub fn by_recent_activity(&self) -> Vec<&Conversation> {
        let mut ordered: Vec<&Conversation> = self.conversations.iter().collect();
        ordered.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        ordered
    }
}
