//! Mock tool for testing purposes.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::Tool;
use crate::error::ChatError;
use crate::models::Params;

/// A mock tool that returns a predefined reply and records what it was called with.
#[derive(Debug)]
pub struct MockTool {
    id: String,
    reply: Mutex<Result<String, String>>,
    calls: Mutex<Vec<Params>>,
    follow_up: Option<String>,
}

impl MockTool {
    /// Create a mock tool answering with its own name.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            reply: Mutex::new(Ok(format!("{} result", id))),
            calls: Mutex::new(Vec::new()),
            follow_up: None,
        }
    }

    /// Attach a follow-up chunk for the streaming path.
    pub fn with_follow_up(mut self, follow_up: &str) -> Self {
        self.follow_up = Some(follow_up.to_string());
        self
    }

    /// Set the reply to return.
    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock() = Ok(reply.to_string());
    }

    /// Make every invocation fail with a provider error.
    pub fn set_failure(&self, message: &str) {
        *self.reply.lock() = Err(message.to_string());
    }

    /// Parameters of every invocation so far, oldest first.
    pub fn calls(&self) -> Vec<Params> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Tool for MockTool {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        "Mock tool"
    }

    fn follow_up(&self) -> Option<&str> {
        self.follow_up.as_deref()
    }

    async fn invoke(&self, params: &Params) -> Result<String, ChatError> {
        self.calls.lock().push(params.clone());
        self.reply.lock().clone().map_err(ChatError::Provider)
    }
}
