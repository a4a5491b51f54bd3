//! BeamChat Core Library
//!
//! This crate provides the core functionality for BeamChat, including:
//! - Registration against a shared local user directory
//! - Contact management
//! - Per-contact message threads with a simulated auto-reply
//! - Pluggable key-value persistence
//! - Configuration management
//!
//! It is consumed by the presentation layer, which re-renders from session
//! state after each emitted [`SessionEvent`](chat::SessionEvent).

pub mod chat;
pub mod config;
pub mod directory;
pub mod error;
pub mod platform;
pub mod storage;

// Re-export commonly used types
pub use chat::{ChatSession, Contact, Message, MessageId, SessionEvent, SessionEventSender};
pub use config::SessionConfig;
pub use directory::{User, UserDirectory};
pub use error::{Error, Result};
pub use storage::{MemoryStorage, SledStorage, Storage};
