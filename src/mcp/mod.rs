//! Protocol server layer (MCP).
//!
//! The dispatcher talks to protocol servers only through [`ProtocolBackend`].
//! [`McpManager`] is the built-in backend: it tracks a connection per server
//! and answers operations from in-process simulated handlers. No filesystem,
//! git, network or database access happens behind it.

mod manager;
mod simulated;

pub use manager::{McpManager, ProtocolConnection};
pub use simulated::{handler_for, ServerHandler};

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::models::{Params, ServerStatus};

/// Failures of the protocol layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown MCP server: {0}")]
    UnknownServer(String),

    #[error("Could not connect to MCP server: {0}")]
    CouldNotConnect(String),

    /// `server` is the handler's label, e.g. "HTTP" for the http server
    #[error("Unknown {server} tool: {operation}")]
    UnknownOperation { server: String, operation: String },
}

impl ProtocolError {
    /// Wire form used in place of a result object
    pub fn to_value(&self) -> Value {
        json!({ "error": self.to_string() })
    }

    /// Every protocol failure names a server or operation that does not exist
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::UnknownCapability
    }
}

/// Connect/execute/disconnect lifecycle against named protocol servers
#[async_trait]
pub trait ProtocolBackend: Send + Sync + std::fmt::Debug {
    /// Open (or refresh) the connection to a server
    async fn connect(&self, server: &str) -> Result<(), ProtocolError>;

    /// Run an operation, connecting first if needed
    async fn execute(
        &self,
        server: &str,
        operation: &str,
        params: &Params,
    ) -> Result<Value, ProtocolError>;

    /// Drop the connection record; returns whether one existed
    async fn disconnect(&self, server: &str) -> bool;

    /// Declared operations of a server; empty when unknown
    fn capabilities(&self, server: &str) -> BTreeSet<String>;

    /// Every known server with its connection flag
    fn servers(&self) -> Vec<ServerStatus>;
}

/// Render an execute outcome the way it appears in chat
pub fn render_result(server: &str, result: &Result<Value, ProtocolError>) -> String {
    match result {
        Ok(value) => render_success(server, value),
        Err(e) => format!("❌ MCP Error: {}", e),
    }
}

/// Chat form of a successful result object
pub fn render_success(server: &str, value: &Value) -> String {
    format!(
        "✅ MCP {} result: {}",
        server,
        value
            .get("data")
            .and_then(Value::as_str)
            .unwrap_or("Operation completed")
    )
}
