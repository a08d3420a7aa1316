//! The conversation store.
//!
//! Mutations are transforms over an explicit collection: each takes the
//! caller's current conversations and returns the next collection, writing
//! it through to durable storage before returning. If the write fails the
//! error is returned and the caller keeps its previous collection, so
//! memory never runs ahead of storage.
//!
//! Operations naming a conversation that no longer exists are no-ops rather
//! than errors. Replies can arrive after their conversation was deleted and
//! must not bring it back.

use crate::conversation::{Conversation, Snapshot};
use crate::error::StoreError;
use crate::message::{Message, MessageRole};
use crate::storage::{ACTIVE_CONVERSATION_KEY, CONVERSATIONS_KEY, KeyValueStorage};
use colloquy_core::{ConversationId, Result};
use tracing::{debug, warn};

/// Replaces every element matching `matches` with `transform(element)`.
///
/// Unmatched elements are cloned unchanged. Returns `None` if nothing
/// matched.
pub fn update_where<T: Clone>(
    items: &[T],
    matches: impl Fn(&T) -> bool,
    transform: impl Fn(&T) -> T,
) -> Option<Vec<T>> {
    let mut found = false;
    let updated: Vec<T> = items
        .iter()
        .map(|item| {
            if matches(item) {
                found = true;
                transform(item)
            } else {
                item.clone()
            }
        })
        .collect();
    found.then_some(updated)
}

/// Result of appending a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    /// The collection after the append.
    pub conversations: Vec<Conversation>,
    /// The new message, or `None` if the target conversation was missing.
    pub message: Option<Message>,
}

/// Conversation store writing through to a [`KeyValueStorage`].
#[derive(Debug)]
pub struct ConversationStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> ConversationStore<S> {
    /// Creates a store over `storage`.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the underlying storage.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Loads the stored conversations.
    ///
    /// Missing data yields an empty collection. Unreadable or malformed data
    /// is logged and also yields an empty collection.
    pub fn load(&self) -> Vec<Conversation> {
        let raw = match self.storage.get(CONVERSATIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read conversations, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(conversations) => conversations,
            Err(e) => {
                warn!(error = %e, "stored conversations are malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Writes the full collection, replacing whatever was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the storage write fails.
    pub fn persist(&self, conversations: &[Conversation]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(conversations).map_err(|e| StoreError::EncodeFailed {
            reason: e.to_string(),
        })?;
        self.storage
            .set(CONVERSATIONS_KEY, &encoded)
            .map_err(|e| StoreError::PersistFailed {
                key: CONVERSATIONS_KEY.to_string(),
                reason: e.to_string(),
            })?;
        debug!(count = conversations.len(), "persisted conversations");
        Ok(())
    }

    /// Returns the stored active conversation ID, if any.
    ///
    /// Read failures are logged and treated as no selection.
    pub fn active_id(&self) -> Option<ConversationId> {
        match self.storage.get(ACTIVE_CONVERSATION_KEY) {
            Ok(raw) => raw.and_then(|raw| raw.parse().ok()),
            Err(e) => {
                warn!(error = %e, "failed to read active conversation");
                None
            }
        }
    }

    /// Stores the active conversation ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn set_active_id(&self, id: &ConversationId) -> Result<(), StoreError> {
        self.storage
            .set(ACTIVE_CONVERSATION_KEY, id.as_str())
            .map_err(|e| StoreError::PersistFailed {
                key: ACTIVE_CONVERSATION_KEY.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Removes the stored active conversation ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage removal fails.
    pub fn clear_active_id(&self) -> Result<(), StoreError> {
        self.storage
            .remove(ACTIVE_CONVERSATION_KEY)
            .map_err(|e| StoreError::PersistFailed {
                key: ACTIVE_CONVERSATION_KEY.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Loads conversations and the active selection together.
    ///
    /// A stored active ID naming no loaded conversation is dropped and
    /// cleared from storage.
    pub fn load_snapshot(&self) -> Snapshot {
        let conversations = self.load();
        let stored_active = self.active_id();
        let snapshot = Snapshot::new(conversations, stored_active.clone());

        if let Some(stale) = stored_active.filter(|_| snapshot.active_id.is_none()) {
            debug!(conversation_id = %stale, "dropping stale active conversation");
            if let Err(e) = self.clear_active_id() {
                warn!(error = %e, "failed to clear stale active conversation");
            }
        }
        snapshot
    }

    /// Allocates a new empty conversation.
    ///
    /// The conversation is not added to any collection.
    #[must_use]
    pub fn create(&self, title: impl Into<String>) -> Conversation {
        let conversation = Conversation::new(title);
        debug!(conversation_id = %conversation.id, "created conversation");
        conversation
    }

    /// Adds `conversation` to the end of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn insert(
        &self,
        conversations: &[Conversation],
        conversation: Conversation,
    ) -> Result<Vec<Conversation>, StoreError> {
        let mut next = conversations.to_vec();
        next.push(conversation);
        self.persist(&next)?;
        Ok(next)
    }

    /// Appends a message to the conversation with `id`.
    ///
    /// If no such conversation exists the collection is returned unchanged
    /// and no message is created.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn append_message(
        &self,
        conversations: &[Conversation],
        id: &ConversationId,
        content: impl Into<String>,
        role: MessageRole,
    ) -> Result<Appended, StoreError> {
        let message = Message::new(role, content);
        let Some(next) = update_where(
            conversations,
            |c| &c.id == id,
            |c| c.with_message(message.clone()),
        ) else {
            debug!(conversation_id = %id, %role, "append skipped, conversation not found");
            return Ok(Appended {
                conversations: conversations.to_vec(),
                message: None,
            });
        };

        self.persist(&next)?;
        Ok(Appended {
            conversations: next,
            message: Some(message),
        })
    }

    /// Sets the title of the conversation with `id`.
    ///
    /// If no such conversation exists the collection is returned unchanged
    /// and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn rename(
        &self,
        conversations: &[Conversation],
        id: &ConversationId,
        title: &str,
    ) -> Result<Vec<Conversation>, StoreError> {
        let Some(next) = update_where(conversations, |c| &c.id == id, |c| c.with_title(title))
        else {
            debug!(conversation_id = %id, "rename skipped, conversation not found");
            return Ok(conversations.to_vec());
        };
        self.persist(&next)?;
        Ok(next)
    }

    /// Removes the conversation with `id`.
    ///
    /// Removing an unknown id returns the collection unchanged without a
    /// write.
    ///
    /// # Errors
    ///
    /// Returns an error if the write-through fails.
    pub fn remove(
        &self,
        conversations: &[Conversation],
        id: &ConversationId,
    ) -> Result<Vec<Conversation>, StoreError> {
        let next: Vec<Conversation> = conversations
            .iter()
            .filter(|c| &c.id != id)
            .cloned()
            .collect();
        if next.len() == conversations.len() {
            debug!(conversation_id = %id, "remove skipped, conversation not found");
            return Ok(next);
        }
        self.persist(&next)?;
        Ok(next)
    }
}
