//! The session controller.
//!
//! The controller owns the current [`Snapshot`] and applies every user
//! intent to it through the conversation store. The snapshot lives behind a
//! synchronous mutex that is never held across an `.await`, so while a reply
//! is pending other intents (including further sends) proceed normally.
//!
//! Sending a message has two halves. The user message is appended
//! immediately; the reply is requested from the responder and, once it
//! arrives, appended to whatever the collection looks like *then*. If the
//! conversation was deleted in the meantime the append is a no-op.

use colloquy_ai::{Responder, generate_with_timeout};
use colloquy_conversation::{
    ConversationStore, DEFAULT_TITLE, KeyValueStorage, MessageRole, Snapshot, derive_title,
};
use colloquy_core::ConversationId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct ControllerState {
    snapshot: Snapshot,
    /// In-flight reply count per conversation.
    pending: HashMap<ConversationId, usize>,
}

impl ControllerState {
    fn begin_reply(&mut self, id: &ConversationId) {
        *self.pending.entry(id.clone()).or_default() += 1;
    }

    fn finish_reply(&mut self, id: &ConversationId) {
        if let Some(count) = self.pending.get_mut(id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.pending.remove(id);
            }
        }
    }
}

/// Orchestrates user intents against the conversation store.
pub struct SessionController<S, R> {
    store: ConversationStore<S>,
    responder: R,
    reply_timeout: Option<Duration>,
    state: Mutex<ControllerState>,
}

impl<S: KeyValueStorage, R: Responder> SessionController<S, R> {
    /// Creates a controller, loading the stored conversations and selection.
    #[must_use]
    pub fn new(store: ConversationStore<S>, responder: R) -> Self {
        let snapshot = store.load_snapshot();
        info!(
            conversations = snapshot.conversations.len(),
            active = snapshot.active_id.is_some(),
            responder = responder.name(),
            "session loaded"
        );
        Self {
            store,
            responder,
            reply_timeout: None,
            state: Mutex::new(ControllerState {
                snapshot,
                pending: HashMap::new(),
            }),
        }
    }

    /// Fails replies that take longer than `timeout`.
    #[must_use]
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = Some(timeout);
        self
    }

    /// Returns the conversation store.
    #[must_use]
    pub fn store(&self) -> &ConversationStore<S> {
        &self.store
    }

    /// Returns a copy of the current snapshot for rendering.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    /// Returns true while a reply for `id` is outstanding.
    #[must_use]
    pub fn is_loading(&self, id: &ConversationId) -> bool {
        self.lock().pending.contains_key(id)
    }

    /// Returns the number of outstanding replies across all conversations.
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.lock().pending.values().sum()
    }

    /// Makes `id` the active conversation.
    ///
    /// Unknown IDs are ignored.
    pub fn select_conversation(&self, id: &ConversationId) -> Snapshot {
        let mut state = self.lock();
        if !state.snapshot.contains(id) {
            debug!(conversation_id = %id, "select ignored, conversation not found");
            return state.snapshot.clone();
        }
        if let Err(e) = self.store.set_active_id(id) {
            warn!(conversation_id = %id, error = %e, "failed to persist selection");
            return state.snapshot.clone();
        }
        state.snapshot.active_id = Some(id.clone());
        state.snapshot.clone()
    }

    /// Starts a new conversation and makes it active.
    ///
    /// With `seed`, the text is sent as the first message right away and the
    /// returned snapshot reflects the completed exchange.
    pub async fn new_conversation(&self, seed: Option<&str>) -> Snapshot {
        let created = {
            let mut state = self.lock();
            let conversation = self.store.create(DEFAULT_TITLE);
            let id = conversation.id.clone();

            let conversations = match self.store.insert(&state.snapshot.conversations, conversation)
            {
                Ok(conversations) => conversations,
                Err(e) => {
                    warn!(error = %e, "failed to persist new conversation");
                    return state.snapshot.clone();
                }
            };
            state.snapshot.conversations = conversations;

            match self.store.set_active_id(&id) {
                Ok(()) => {
                    state.snapshot.active_id = Some(id.clone());
                    info!(conversation_id = %id, "started conversation");
                    true
                }
                Err(e) => {
                    warn!(conversation_id = %id, error = %e, "failed to persist selection");
                    false
                }
            }
        };

        match seed {
            Some(text) if created => self.send_message(text).await,
            _ => self.snapshot(),
        }
    }

    /// Sends `text` to the active conversation and waits for the reply.
    ///
    /// Does nothing without an active conversation or when `text` is blank.
    /// A failed reply is logged and leaves the user message in place.
    pub async fn send_message(&self, text: &str) -> Snapshot {
        if text.trim().is_empty() {
            debug!("send ignored, message is blank");
            return self.snapshot();
        }

        let id = {
            let mut state = self.lock();
            let Some(id) = state.snapshot.active_id.clone() else {
                debug!("send ignored, no active conversation");
                return state.snapshot.clone();
            };

            let appended = match self.store.append_message(
                &state.snapshot.conversations,
                &id,
                text,
                MessageRole::User,
            ) {
                Ok(appended) => appended,
                Err(e) => {
                    warn!(conversation_id = %id, error = %e, "failed to persist user message");
                    return state.snapshot.clone();
                }
            };
            if appended.message.is_none() {
                return state.snapshot.clone();
            }
            state.snapshot.conversations = appended.conversations;
            self.derive_title_if_first(&mut state, &id, text);

            state.begin_reply(&id);
            id
        };

        let reply = match self.reply_timeout {
            Some(limit) => generate_with_timeout(&self.responder, text, limit).await,
            None => self.responder.generate(text).await,
        };

        let mut state = self.lock();
        state.finish_reply(&id);
        match reply {
            Ok(reply) => {
                match self.store.append_message(
                    &state.snapshot.conversations,
                    &id,
                    reply,
                    MessageRole::Assistant,
                ) {
                    Ok(appended) if appended.message.is_some() => {
                        state.snapshot.conversations = appended.conversations;
                    }
                    Ok(_) => {
                        debug!(conversation_id = %id, "reply dropped, conversation was deleted");
                    }
                    Err(e) => {
                        warn!(conversation_id = %id, error = %e, "failed to persist reply");
                    }
                }
            }
            Err(e) => {
                warn!(
                    conversation_id = %id,
                    responder = self.responder.name(),
                    error = %e,
                    "reply generation failed"
                );
            }
        }
        state.snapshot.clone()
    }

    /// Deletes a conversation.
    ///
    /// Deleting the active conversation selects the first remaining one, or
    /// clears the selection if none remain.
    pub fn delete_conversation(&self, id: &ConversationId) -> Snapshot {
        let mut state = self.lock();
        if !state.snapshot.contains(id) {
            debug!(conversation_id = %id, "delete ignored, conversation not found");
            return state.snapshot.clone();
        }
        let conversations = match self.store.remove(&state.snapshot.conversations, id) {
            Ok(conversations) => conversations,
            Err(e) => {
                warn!(conversation_id = %id, error = %e, "failed to persist deletion");
                return state.snapshot.clone();
            }
        };
        state.snapshot.conversations = conversations;

        if state.snapshot.active_id.as_ref() == Some(id) {
            let next = state.snapshot.conversations.first().map(|c| c.id.clone());
            let persisted = match &next {
                Some(next_id) => self.store.set_active_id(next_id),
                None => self.store.clear_active_id(),
            };
            // The in-memory selection must never name a deleted conversation.
            // A stale stored id is dropped by `load_snapshot` on the next start.
            if let Err(e) = persisted {
                warn!(error = %e, "failed to persist selection after deletion");
            }
            state.snapshot.active_id = next;
        }

        info!(conversation_id = %id, "deleted conversation");
        state.snapshot.clone()
    }

    /// Renames a conversation.
    ///
    /// Blank titles are ignored and the previous title is kept.
    pub fn rename_conversation(&self, id: &ConversationId, title: &str) -> Snapshot {
        let mut state = self.lock();
        let title = title.trim();
        if title.is_empty() {
            debug!(conversation_id = %id, "rename ignored, title is blank");
            return state.snapshot.clone();
        }

        match self.store.rename(&state.snapshot.conversations, id, title) {
            Ok(conversations) => state.snapshot.conversations = conversations,
            Err(e) => warn!(conversation_id = %id, error = %e, "failed to persist rename"),
        }
        state.snapshot.clone()
    }

    /// Titles a conversation from its first user message.
    ///
    /// Applies only when the message just appended is the conversation's
    /// only message and nobody has named it yet.
    fn derive_title_if_first(&self, state: &mut ControllerState, id: &ConversationId, text: &str) {
        let Some(conversation) = state.snapshot.find(id) else {
            return;
        };
        if conversation.message_count() != 1 || !conversation.has_default_title() {
            return;
        }
        let Some(title) = derive_title(text) else {
            return;
        };

        match self.store.rename(&state.snapshot.conversations, id, &title) {
            Ok(conversations) => {
                debug!(conversation_id = %id, %title, "derived title");
                state.snapshot.conversations = conversations;
            }
            Err(e) => warn!(conversation_id = %id, error = %e, "failed to persist derived title"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
