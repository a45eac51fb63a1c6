//! Capability catalog models.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters extracted from a message or supplied by a caller
pub type Params = HashMap<String, String>;

/// Whether a capability is a built-in tool or a protocol server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Tool,
    Protocol,
}

/// Name and description of a unit of request handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub description: String,
    pub kind: CapabilityKind,
}

impl CapabilityDescriptor {
    pub fn tool(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: CapabilityKind::Tool,
        }
    }

    pub fn protocol(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: CapabilityKind::Protocol,
        }
    }
}

/// A named external capability endpoint exposing a fixed operation set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolServer {
    pub name: String,
    /// Endpoint identifier (e.g. `mcp://localhost:3001`)
    pub url: String,
    pub capabilities: Vec<String>,
    pub description: String,
}

impl ProtocolServer {
    pub fn new(name: &str, url: &str, capabilities: &[&str], description: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            description: description.to_string(),
        }
    }

    pub fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::protocol(&self.name, &self.description)
    }
}

/// A protocol server together with its live connection flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(flatten)]
    pub server: ProtocolServer,
    pub connected: bool,
}
