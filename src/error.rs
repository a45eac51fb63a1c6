//! Error types for the chat backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Main error type for capability invocation and request handling
#[derive(Error, Debug)]
pub enum ChatError {
    /// Requested tool, server or operation is not in the registry
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// Missing credential or unreachable provider
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Sandboxed code ran past its wall-clock budget
    #[error("Code execution timed out (max {0} seconds)")]
    ExecutionTimeout(u64),

    /// Sandboxed code mentioned a banned token
    #[error("Sorry, I can't execute code that uses '{0}' for security reasons.")]
    ExecutionRejected(String),

    /// Malformed request at the boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// Provider answered with an error
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Serialisable discriminator for [`ChatError`], carried in error envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownCapability,
    BackendUnavailable,
    ExecutionTimeout,
    ExecutionRejected,
    Validation,
    Internal,
}

impl ChatError {
    /// Taxonomy bucket of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::UnknownCapability(_) => ErrorKind::UnknownCapability,
            ChatError::BackendUnavailable(_) | ChatError::Network(_) => {
                ErrorKind::BackendUnavailable
            }
            ChatError::ExecutionTimeout(_) => ErrorKind::ExecutionTimeout,
            ChatError::ExecutionRejected(_) => ErrorKind::ExecutionRejected,
            ChatError::Validation(_) => ErrorKind::Validation,
            _ => ErrorKind::Internal,
        }
    }

    /// Whether the caller is at fault (maps to a 4xx status at the HTTP boundary)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ChatError::UnknownCapability(_) | ChatError::Validation(_)
        )
    }
}
