//! Simulated auto-reply: the canned response text and the delayed tasks
//! that deliver it.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Build the canned reply text quoting the start of the sent message.
///
/// Quotes the first `preview_len` characters, with `...` appended when the
/// original was longer.
pub fn reply_text(sent: &str, preview_len: usize) -> String {
    let quoted: String = sent.chars().take(preview_len).collect();
    let ellipsis = if sent.chars().count() > preview_len {
        "..."
    } else {
        ""
    };
    format!("Reply to: \"{}{}\"", quoted, ellipsis)
}

/// Tracks the in-flight auto-reply tasks owned by a session.
///
/// Each outgoing send schedules one independent task; there is no coalescing
/// and no cap. All outstanding tasks are aborted on session reset so a late
/// reply can never write into cleared state.
#[derive(Default)]
pub(crate) struct ReplyScheduler {
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ReplyScheduler {
    /// Spawn `task` after `delay`, keeping its handle for cancellation.
    ///
    /// Must be called within a tokio runtime.
    pub(crate) fn spawn_after<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.retain(|h| !h.is_finished());
        tasks.push(handle);
    }

    /// Abort every outstanding task.
    pub(crate) fn abort_all(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        for handle in tasks.drain(..) {
            handle.abort();
        }
    }
}
