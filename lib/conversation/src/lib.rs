//! Conversation model and durable store for colloquy.
//!
//! This crate provides:
//!
//! - **Data model**: messages, conversations, and the snapshot holding them
//! - **Storage**: the string key-value contract plus memory and file backends
//! - **Conversation Store**: write-through transforms over the collection
//! - **Titles**: automatic titles from a first message

pub mod conversation;
pub mod error;
pub mod message;
pub mod storage;
pub mod store;
pub mod title;

pub use conversation::{Conversation, DEFAULT_TITLE, Snapshot};
pub use error::{StorageError, StoreError};
pub use message::{Message, MessageRole};
pub use storage::{
    ACTIVE_CONVERSATION_KEY, CONVERSATIONS_KEY, FileStorage, KeyValueStorage, MemoryStorage,
};
pub use store::{Appended, ConversationStore, update_where};
pub use title::derive_title;
