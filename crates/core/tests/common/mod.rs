//! Common test utilities for integration tests.
//!
//! This module provides shared helpers and configuration for integration
//! testing the chat session core.

use beamchat_core::{ChatSession, MemoryStorage, SessionConfig, SessionEvent, Storage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Default timeout for test operations.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Auto-reply delay used by test sessions, much shorter than the production
/// 2000 ms default.
pub const TEST_REPLY_DELAY_MS: u64 = 50;

/// Initialize test logging with appropriate filters.
///
/// Call this at the start of tests that need debug output.
/// Safe to call multiple times (subsequent calls are no-ops).
#[allow(dead_code)]
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("beamchat_core=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Run an async operation with a timeout.
///
/// Returns the result if the operation completes within the timeout,
/// or panics with a timeout message if it doesn't.
#[allow(dead_code)]
pub async fn with_timeout<T, F>(fut: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, fut)
        .await
        .expect("Test operation timed out")
}

/// Test session configuration with a short auto-reply delay.
#[allow(dead_code)]
pub fn test_config() -> SessionConfig {
    SessionConfig {
        reply_delay_ms: TEST_REPLY_DELAY_MS,
        ..SessionConfig::default()
    }
}

/// Create a session over fresh in-memory storage.
#[allow(dead_code)]
pub fn new_session() -> (ChatSession, UnboundedReceiver<SessionEvent>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let (session, rx) = session_over(storage.clone() as Arc<dyn Storage>);
    (session, rx, storage)
}

/// Create a test-configured session over the given storage.
#[allow(dead_code)]
pub fn session_over(storage: Arc<dyn Storage>) -> (ChatSession, UnboundedReceiver<SessionEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let session = ChatSession::with_config(storage, tx, &test_config())
        .expect("failed to create test session");
    (session, rx)
}

/// Sleep long enough for any pending test auto-reply to have fired.
#[allow(dead_code)]
pub async fn wait_for_reply_window() {
    tokio::time::sleep(Duration::from_millis(TEST_REPLY_DELAY_MS * 4)).await;
}
