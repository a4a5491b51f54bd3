//! Chat session functionality for one-on-one messaging.
//!
//! This module provides the session core of the chat demo. Features include:
//!
//! - Registration against the shared user directory
//! - Contact management
//! - Per-contact 1:1 message threads
//! - Persistent state via the storage abstraction
//! - A simulated auto-reply a fixed delay after each send

pub mod reply;
pub mod session;
pub mod types;

pub use reply::reply_text;
pub use session::{ChatSession, SessionEvent, SessionEventSender};
pub use types::*;
