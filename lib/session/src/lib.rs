//! Session controller for colloquy.
//!
//! The controller turns user intents (new conversation, send message,
//! select, rename, delete) into conversation store transforms and sequences
//! each message with its asynchronous reply.

pub mod controller;
pub mod examples;

pub use controller::SessionController;
pub use examples::EXAMPLE_PROMPTS;
