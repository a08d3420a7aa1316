//! Reply generation for colloquy.
//!
//! The responder is the external collaborator that produces assistant
//! replies. This crate defines its interface, a timeout wrapper, and a canned
//! implementation for local use.

pub mod canned;
pub mod error;
pub mod responder;

pub use canned::{CannedResponder, CannedResponderConfig};
pub use error::ResponderError;
pub use responder::{Responder, generate_with_timeout};
