//! Error types for the core library.

use thiserror::Error;

/// Main error type for the core library.
///
/// Every variant is recoverable. The `Display` string of a variant is the
/// message the presentation layer shows to the user verbatim.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed registration or contact input
    #[error("{0}")]
    Validation(String),

    /// Registration conflict on phone number
    #[error("a user with this phone number already exists")]
    DuplicatePhone,

    /// Registration conflict on nickname (case-insensitive)
    #[error("a user with this nickname already exists")]
    DuplicateNickname,

    /// No directory user matches the given nickname and phone
    #[error("user not found")]
    UserNotFound,

    /// Attempt to add the current user to their own contact list
    #[error("you cannot add yourself as a contact")]
    SelfAdd,

    /// The phone is already present in the contact list
    #[error("contact already exists")]
    DuplicateContact,

    /// No contact with this phone in the current session
    #[error("no contact with phone {0}")]
    ContactNotFound(String),

    /// Storage backend error
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
