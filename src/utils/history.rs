//! Append-only chat message log.
//!
//! The log is process-wide shared state handed to the dispatcher and the
//! transport at construction. Id assignment and the push happen under one lock,
//! so concurrent appends never share an id.

use chrono::Utc;
use parking_lot::Mutex;

use crate::models::{Message, Sender};

/// In-memory, insertion-ordered message log
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Mutex<Vec<Message>>,
}

impl MessageLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append a message and return the stored copy with its assigned id
    pub fn append(&self, session_id: &str, sender: Sender, text: &str) -> Message {
        let mut entries = self.entries.lock();
        let id = entries.last().map_or(1, |last| last.id + 1);
        let message = Message {
            id,
            sender,
            text: text.to_string(),
            timestamp: Utc::now(),
            session_id: session_id.to_string(),
        };
        entries.push(message.clone());
        tracing::debug!(id, session = session_id, sender = sender.as_str(), "Message appended");
        message
    }

    /// Messages of one session, in log order (empty when the session is unknown)
    pub fn session(&self, session_id: &str) -> Vec<Message> {
        self.entries
            .lock()
            .iter()
            .filter(|m| m.in_session(session_id))
            .cloned()
            .collect()
    }

    /// Highest id handed out so far (0 when empty)
    pub fn last_id(&self) -> u64 {
        self.entries.lock().last().map_or(0, |m| m.id)
    }

    /// Total number of messages across all sessions
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
