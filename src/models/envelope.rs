//! Normalised result of any capability invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ChatError, ErrorKind};
use crate::mcp::render_success;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Error,
}

/// Envelope body: plain text or a structured protocol result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Structured(Value),
}

/// Success/error wrapper produced by the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub outcome: Outcome,
    pub payload: Payload,
    /// Name of the capability that produced the payload (`ai` for the fallback)
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ResponseEnvelope {
    pub fn success(origin: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success,
            payload: Payload::Text(text.into()),
            origin: origin.into(),
            error_kind: None,
        }
    }

    pub fn structured(origin: impl Into<String>, value: Value) -> Self {
        Self {
            outcome: Outcome::Success,
            payload: Payload::Structured(value),
            origin: origin.into(),
            error_kind: None,
        }
    }

    pub fn error(origin: impl Into<String>, kind: ErrorKind, text: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Error,
            payload: Payload::Text(text.into()),
            origin: origin.into(),
            error_kind: Some(kind),
        }
    }

    /// Build an error envelope from a capability fault
    pub fn from_error(origin: impl Into<String>, err: &ChatError) -> Self {
        Self::error(origin, err.kind(), err.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// Human-readable form of the payload
    ///
    /// Structured payloads are protocol results and render with the
    /// success marker and the result's `data` sentence.
    pub fn text(&self) -> String {
        match &self.payload {
            Payload::Text(text) => text.clone(),
            Payload::Structured(value) => render_success(&self.origin, value),
        }
    }
}
