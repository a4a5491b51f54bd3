//! Core data types for the chat session.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique identifier for a chat message.
///
/// Ids are a millisecond timestamp plus a random hex suffix, so two ids
/// minted within the same millisecond still differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID.
    pub fn new() -> Self {
        let millis = Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let suffix: [u8; 4] = rng.gen();
        Self(format!("{}-{}", millis, hex::encode(suffix)))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single chat message.
///
/// Immutable once created. `outgoing` is relative to whichever user owns the
/// session the message was created in: true when `from` is the session
/// user's own phone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Sender's phone.
    pub from: String,
    /// Recipient's phone.
    pub to: String,
    /// Message text.
    pub text: String,
    /// When the message was created (UTC).
    pub timestamp: DateTime<Utc>,
    /// Whether the session user sent this message.
    pub outgoing: bool,
}

impl Message {
    /// Create a new outgoing message stamped with the current time.
    pub fn new_outgoing(from: String, to: String, text: String) -> Self {
        Self {
            id: MessageId::new(),
            from,
            to,
            text,
            timestamp: Utc::now(),
            outgoing: true,
        }
    }

    /// Create a new incoming message stamped with the current time.
    pub fn new_incoming(from: String, to: String, text: String) -> Self {
        Self {
            id: MessageId::new(),
            from,
            to,
            text,
            timestamp: Utc::now(),
            outgoing: false,
        }
    }
}

/// A contact in the session's contact list.
///
/// A denormalized copy of a directory user's public fields, unique by phone
/// within one session. Removed only by a full session reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Display name, copied from the directory record
    pub nickname: String,

    /// Phone number, the contact key
    pub phone: String,

    /// When this contact was added
    pub added_at: DateTime<Utc>,
}

impl Contact {
    /// Create a contact from a directory user, stamped with the current time.
    pub fn from_user(user: &crate::directory::User) -> Self {
        Self {
            nickname: user.nickname.clone(),
            phone: user.phone.clone(),
            added_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::User;

    #[test]
    fn test_message_id_generation() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();
        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_message_id_has_timestamp_prefix() {
        let before = Utc::now().timestamp_millis();
        let id = MessageId::new();
        let after = Utc::now().timestamp_millis();

        let (prefix, suffix) = id.as_str().split_once('-').unwrap();
        let millis: i64 = prefix.parse().unwrap();
        assert!(millis >= before && millis <= after);
        assert_eq!(suffix.len(), 8);
    }

    #[test]
    fn test_outgoing_and_incoming_direction() {
        let out = Message::new_outgoing("alice".into(), "bob".into(), "Hi".into());
        assert!(out.outgoing);
        assert_eq!(out.from, "alice");

        let inc = Message::new_incoming("bob".into(), "alice".into(), "Hello".into());
        assert!(!inc.outgoing);
        assert_eq!(inc.from, "bob");
    }

    #[test]
    fn test_contact_from_user_copies_public_fields() {
        let user = User::new("Alice", "5551234567");
        let contact = Contact::from_user(&user);

        assert_eq!(contact.nickname, "Alice");
        assert_eq!(contact.phone, "5551234567");
    }

    #[test]
    fn test_message_serialization_roundtrip() {
        let msg = Message::new_outgoing("5551234567".into(), "5559876543".into(), "hello".into());
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}
