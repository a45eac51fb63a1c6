//! Generative AI fallback.
//!
//! Messages no intent rule claims are answered by an [`AiProvider`]. The
//! provider is an injected collaborator: [`OpenAiProvider`] talks to any
//! OpenAI-compatible chat completion endpoint, [`MockProvider`] is the test
//! double.

pub mod mock;
mod openai;

pub use mock::MockProvider;
pub use openai::OpenAiProvider;

use async_trait::async_trait;
use futures_util::Stream;
use std::pin::Pin;

use crate::error::ChatError;

/// Fixed reply when no provider credential is configured
pub const AI_UNAVAILABLE: &str = "I'm sorry, but I don't have access to AI capabilities right now. However, I can help you with weather, search, jokes, quotes, games, MCP operations, and more! Try asking about files, git, HTTP requests, or database queries.";

/// Incremental tokens from a provider, in arrival order
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

#[async_trait]
pub trait AiProvider: Send + Sync + std::fmt::Debug {
    /// Whether a usable credential is configured
    fn is_configured(&self) -> bool;

    /// Generate a complete reply
    async fn complete(&self, message: &str) -> Result<String, ChatError>;

    /// Generate a reply token by token
    ///
    /// The stream ends when the provider signals completion; a failure is
    /// yielded as an `Err` item.
    fn stream(&self, message: &str) -> TokenStream;
}

/// User-facing sentence for a provider failure
pub fn apology(err: &ChatError) -> String {
    match err {
        ChatError::BackendUnavailable(_) => AI_UNAVAILABLE.to_string(),
        ChatError::Provider(detail) => format!("Sorry, I encountered an error: {}", detail),
        other => format!("Sorry, I encountered an error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apology() {
        assert_eq!(
            apology(&ChatError::BackendUnavailable("no key".into())),
            AI_UNAVAILABLE
        );
        assert_eq!(
            apology(&ChatError::Provider("rate limited".into())),
            "Sorry, I encountered an error: rate limited"
        );
    }
}
