//! Core types shared by every colloquy crate.
//!
//! This crate provides the strongly-typed identifiers for conversations and
//! messages and the `Result` alias used for layered error reporting.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ConversationId, MessageId, ParseIdError};
