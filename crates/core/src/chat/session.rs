//! The chat session state machine.
//!
//! A [`ChatSession`] owns the logged-in identity, the contact list, and the
//! per-contact message threads, persisting all of it through the pluggable
//! [`Storage`] abstraction after every mutation. The presentation layer
//! drives it in response to user intent and re-renders from session state
//! whenever a [`SessionEvent`] arrives.

use crate::chat::reply::{self, ReplyScheduler};
use crate::chat::types::{Contact, Message};
use crate::config::SessionConfig;
use crate::directory::{User, UserDirectory};
use crate::error::{Error, Result};
use crate::storage::{keys, Storage};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events emitted by session operations for presentation-layer notification.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user registered and became the session's current user.
    Registered { user: User },
    /// A contact was added to the contact list.
    ContactAdded { contact: Contact },
    /// An outgoing message was appended to a thread.
    MessageSent {
        contact_phone: String,
        message: Message,
    },
    /// An auto-reply arrived in the currently open thread.
    ///
    /// Replies landing in a closed thread are stored silently and surface
    /// when the thread is next opened.
    MessageReceived {
        contact_phone: String,
        message: Message,
    },
    /// The session was reset to the logged-out state.
    LoggedOut,
}

/// Sending half of the session event channel.
pub type SessionEventSender = mpsc::UnboundedSender<SessionEvent>;

/// The session's mutable state, persisted under three storage keys.
#[derive(Debug, Default)]
struct SessionState {
    current_user: Option<User>,
    contacts: Vec<Contact>,
    /// contact phone -> ordered message thread
    messages: HashMap<String, Vec<Message>>,
    /// Phone of the thread the presentation layer has open. Transient.
    current_chat: Option<String>,
}

impl SessionState {
    /// Load session state from storage.
    ///
    /// If any of the three persisted keys fails to deserialize, all three are
    /// reset to empty and the reset is persisted immediately. Corrupt state
    /// is recovered from, never surfaced.
    fn load(storage: &dyn Storage) -> Result<Self> {
        match Self::try_load(storage) {
            Ok(state) => Ok(state),
            Err(Error::Serialization(e)) => {
                tracing::warn!("corrupt session state, resetting: {}", e);
                let state = Self::default();
                state.save(storage)?;
                Ok(state)
            }
            Err(e) => Err(e),
        }
    }

    fn try_load(storage: &dyn Storage) -> Result<Self> {
        let current_user = match storage.get(keys::CURRENT_USER)? {
            Some(contents) => serde_json::from_str(&contents)?,
            None => None,
        };
        let contacts = match storage.get(keys::CONTACTS)? {
            Some(contents) => serde_json::from_str(&contents)?,
            None => Vec::new(),
        };
        let messages = match storage.get(keys::MESSAGES)? {
            Some(contents) => serde_json::from_str(&contents)?,
            None => HashMap::new(),
        };

        Ok(Self {
            current_user,
            contacts,
            messages,
            current_chat: None,
        })
    }

    /// Persist all three session namespaces. Full overwrite every time.
    fn save(&self, storage: &dyn Storage) -> Result<()> {
        storage.set(keys::CURRENT_USER, &serde_json::to_string(&self.current_user)?)?;
        storage.set(keys::CONTACTS, &serde_json::to_string(&self.contacts)?)?;
        storage.set(keys::MESSAGES, &serde_json::to_string(&self.messages)?)?;
        Ok(())
    }

    /// Clear everything back to the logged-out state.
    fn reset(&mut self) {
        self.current_user = None;
        self.contacts.clear();
        self.messages.clear();
        self.current_chat = None;
    }
}

/// The chat session core.
///
/// All operations are synchronous and serialize against the in-flight
/// auto-reply tasks through the state mutex. [`send_message`] spawns a
/// delayed task, so the session must live inside a tokio runtime.
///
/// [`send_message`]: ChatSession::send_message
pub struct ChatSession {
    state: Arc<Mutex<SessionState>>,
    storage: Arc<dyn Storage>,
    event_tx: SessionEventSender,
    replies: ReplyScheduler,
    reply_delay: Duration,
    reply_preview_len: usize,
}

impl ChatSession {
    /// Create a session over the given storage with default configuration.
    pub fn new(storage: Arc<dyn Storage>, event_tx: SessionEventSender) -> Result<Self> {
        Self::with_config(storage, event_tx, &SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(
        storage: Arc<dyn Storage>,
        event_tx: SessionEventSender,
        config: &SessionConfig,
    ) -> Result<Self> {
        let state = SessionState::load(storage.as_ref())?;

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            storage,
            event_tx,
            replies: ReplyScheduler::default(),
            reply_delay: config.reply_delay(),
            reply_preview_len: config.reply_preview_len,
        })
    }

    // ==================== Registration ====================

    /// Register a new user and make them the session's current user.
    ///
    /// Both fields are trimmed before validation. Any pre-existing current
    /// user is overwritten without complaint; the previous identity stays in
    /// the directory.
    pub fn register(&self, nickname: &str, phone: &str) -> Result<User> {
        let nickname = nickname.trim();
        let phone = phone.trim();

        if nickname.chars().count() < 3 {
            return Err(Error::Validation(
                "nickname must be at least 3 characters".to_string(),
            ));
        }
        if phone.chars().count() < 10 {
            return Err(Error::Validation(
                "enter a valid phone number".to_string(),
            ));
        }

        let mut directory = self.load_directory()?;
        if directory.contains_phone(phone) {
            return Err(Error::DuplicatePhone);
        }
        if directory.find_by_nickname(nickname).is_some() {
            return Err(Error::DuplicateNickname);
        }

        let user = User::new(nickname, phone);
        directory.insert(user.clone());
        directory.save(self.storage.as_ref())?;

        let mut state = lock(&self.state);
        state.current_user = Some(user.clone());
        state.save(self.storage.as_ref())?;
        drop(state);

        let _ = self.event_tx.send(SessionEvent::Registered { user: user.clone() });
        Ok(user)
    }

    /// Find a directory user by nickname (case-insensitive) and exact phone.
    pub fn find_user(&self, nickname: &str, phone: &str) -> Option<User> {
        match self.load_directory() {
            Ok(directory) => directory.find(nickname, phone).cloned(),
            Err(e) => {
                tracing::warn!("failed to load user directory: {}", e);
                None
            }
        }
    }

    /// Load the shared directory from storage.
    ///
    /// Reloaded on every registration and lookup so that concurrent sessions
    /// over the same storage observe each other's registrations.
    fn load_directory(&self) -> Result<UserDirectory> {
        UserDirectory::load(self.storage.as_ref())
    }

    // ==================== Contacts ====================

    /// Add a directory user to the contact list.
    ///
    /// The contact must exist in the directory under both fields, must not be
    /// the current user, and must not already be a contact. An empty message
    /// thread is created for the contact if none exists.
    pub fn add_contact(&self, nickname: &str, phone: &str) -> Result<Contact> {
        let nickname = nickname.trim();
        let phone = phone.trim();

        if nickname.is_empty() || phone.is_empty() {
            return Err(Error::Validation("all fields are required".to_string()));
        }

        let user = self.find_user(nickname, phone).ok_or(Error::UserNotFound)?;

        let mut state = lock(&self.state);
        if state
            .current_user
            .as_ref()
            .is_some_and(|u| u.phone == phone)
        {
            return Err(Error::SelfAdd);
        }
        if state.contacts.iter().any(|c| c.phone == phone) {
            return Err(Error::DuplicateContact);
        }

        let contact = Contact::from_user(&user);
        state.contacts.push(contact.clone());
        state.messages.entry(user.phone.clone()).or_default();
        state.save(self.storage.as_ref())?;
        drop(state);

        let _ = self.event_tx.send(SessionEvent::ContactAdded {
            contact: contact.clone(),
        });
        Ok(contact)
    }

    // ==================== Chat threads ====================

    /// Open the thread with a contact, marking it as the focused chat.
    ///
    /// Returns the thread so the caller can render it.
    pub fn open_chat(&self, contact_phone: &str) -> Result<Vec<Message>> {
        let mut state = lock(&self.state);
        if !state.contacts.iter().any(|c| c.phone == contact_phone) {
            return Err(Error::ContactNotFound(contact_phone.to_string()));
        }
        state.current_chat = Some(contact_phone.to_string());
        Ok(state.messages.get(contact_phone).cloned().unwrap_or_default())
    }

    /// Close the open thread, if any.
    pub fn close_chat(&self) {
        lock(&self.state).current_chat = None;
    }

    /// Get the message thread for a contact. Empty if none exists.
    pub fn get_chat_messages(&self, contact_phone: &str) -> Vec<Message> {
        lock(&self.state)
            .messages
            .get(contact_phone)
            .cloned()
            .unwrap_or_default()
    }

    // ==================== Messaging ====================

    /// Send a message to a contact and schedule the simulated auto-reply.
    ///
    /// Fire-and-forget: a no-op when the trimmed text is empty or no user is
    /// logged in, and persistence failures are logged rather than returned.
    pub fn send_message(&self, contact_phone: &str, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        let own_phone = {
            let mut state = lock(&self.state);
            let Some(user) = state.current_user.as_ref() else {
                return;
            };
            let own_phone = user.phone.clone();

            let message = Message::new_outgoing(
                own_phone.clone(),
                contact_phone.to_string(),
                text.to_string(),
            );
            state
                .messages
                .entry(contact_phone.to_string())
                .or_default()
                .push(message.clone());

            if let Err(e) = state.save(self.storage.as_ref()) {
                tracing::warn!("failed to persist outgoing message: {}", e);
            }
            drop(state);

            let _ = self.event_tx.send(SessionEvent::MessageSent {
                contact_phone: contact_phone.to_string(),
                message,
            });
            own_phone
        };

        self.schedule_reply(contact_phone.to_string(), own_phone, text.to_string());
    }

    /// Schedule the canned reply to an outgoing send.
    ///
    /// The reply fires once after the configured delay, appends to the same
    /// thread, persists, and notifies only when that thread is still the open
    /// one. Each send gets its own independent task.
    fn schedule_reply(&self, contact_phone: String, own_phone: String, sent_text: String) {
        let state = Arc::clone(&self.state);
        let storage = Arc::clone(&self.storage);
        let event_tx = self.event_tx.clone();
        let text = reply::reply_text(&sent_text, self.reply_preview_len);

        tracing::debug!("scheduling auto-reply from {}", contact_phone);
        self.replies.spawn_after(self.reply_delay, async move {
            let message = Message::new_incoming(contact_phone.clone(), own_phone, text);

            let mut state = lock(&state);
            state
                .messages
                .entry(contact_phone.clone())
                .or_default()
                .push(message.clone());

            if let Err(e) = state.save(storage.as_ref()) {
                tracing::warn!("failed to persist auto-reply: {}", e);
            }

            let thread_open = state.current_chat.as_deref() == Some(contact_phone.as_str());
            drop(state);

            if thread_open {
                let _ = event_tx.send(SessionEvent::MessageReceived {
                    contact_phone,
                    message,
                });
            }
        });
    }

    // ==================== Lifecycle ====================

    /// Log out: abort pending auto-replies, clear all session state, persist
    /// the cleared state. The user directory survives.
    pub fn logout(&self) {
        self.replies.abort_all();

        let mut state = lock(&self.state);
        state.reset();
        if let Err(e) = state.save(self.storage.as_ref()) {
            tracing::warn!("failed to persist session reset: {}", e);
        }
        drop(state);

        let _ = self.event_tx.send(SessionEvent::LoggedOut);
    }

    // ==================== Accessors ====================

    /// The currently logged-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        lock(&self.state).current_user.clone()
    }

    /// The session's contact list, in insertion order.
    pub fn contacts(&self) -> Vec<Contact> {
        lock(&self.state).contacts.clone()
    }

    /// Phone of the thread the presentation layer has open, if any.
    pub fn current_chat(&self) -> Option<String> {
        lock(&self.state).current_chat.clone()
    }
}

/// Lock a mutex, recovering the guard if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
