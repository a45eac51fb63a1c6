//! Mock AI provider for testing purposes.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{AiProvider, TokenStream};
use crate::error::ChatError;

/// A scripted provider: streams fixed tokens and can fail part-way through.
#[derive(Debug, Default)]
pub struct MockProvider {
    configured: bool,
    tokens: Vec<String>,
    fail_after: Option<usize>,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// A configured provider that answers with the given tokens.
    pub fn new(tokens: &[&str]) -> Self {
        Self {
            configured: true,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    /// A provider with no credential.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Fail with a provider error after emitting `count` tokens.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Every message the provider was asked about, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    fn check(&self, message: &str) -> Result<(), ChatError> {
        self.prompts.lock().push(message.to_string());
        if self.configured {
            Ok(())
        } else {
            Err(ChatError::BackendUnavailable("mock provider not configured".into()))
        }
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(&self, message: &str) -> Result<String, ChatError> {
        self.check(message)?;
        match self.fail_after {
            Some(_) => Err(ChatError::Provider("mock failure".into())),
            None => Ok(self.tokens.concat()),
        }
    }

    fn stream(&self, message: &str) -> TokenStream {
        let mut items: Vec<Result<String, ChatError>> = match self.check(message) {
            Ok(()) => self.tokens.iter().cloned().map(Ok).collect(),
            Err(e) => vec![Err(e)],
        };

        if let Some(count) = self.fail_after {
            items.truncate(count);
            items.push(Err(ChatError::Provider("mock failure".into())));
        }

        Box::pin(futures_util::stream::iter(items))
    }
}
