//! Simulated protocol server handlers.
//!
//! Each handler recognises a subset of its server's declared operations and
//! returns a deterministic `{success, data, ...}` object.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::ProtocolError;
use crate::models::Params;

/// Executes operations for one protocol server
#[async_trait]
pub trait ServerHandler: Send + Sync + std::fmt::Debug {
    /// Label used in "unknown operation" errors
    fn label(&self) -> &str;

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value, ProtocolError>;

    fn unknown(&self, operation: &str) -> ProtocolError {
        ProtocolError::UnknownOperation {
            server: self.label().to_string(),
            operation: operation.to_string(),
        }
    }
}

/// Handler for a built-in server name
pub fn handler_for(server: &str) -> Option<Box<dyn ServerHandler>> {
    match server {
        "filesystem" => Some(Box::new(FilesystemHandler)),
        "git" => Some(Box::new(GitHandler)),
        "http" => Some(Box::new(HttpHandler)),
        "database" => Some(Box::new(DatabaseHandler)),
        _ => None,
    }
}

fn param<'a>(params: &'a Params, key: &str, default: &'a str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or(default)
}

#[derive(Debug)]
struct FilesystemHandler;

#[async_trait]
impl ServerHandler for FilesystemHandler {
    fn label(&self) -> &str {
        "filesystem"
    }

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value, ProtocolError> {
        match operation {
            "file_read" => Ok(json!({
                "success": true,
                "data": format!("Simulated file read from: {}", param(params, "path", "")),
                "content": "This is simulated file content from MCP filesystem server.",
            })),
            "file_list" => Ok(json!({
                "success": true,
                "data": format!("Files in {}:", param(params, "path", ".")),
                "files": ["file1.txt", "file2.py", "directory1/"],
            })),
            _ => Err(self.unknown(operation)),
        }
    }
}

#[derive(Debug)]
struct GitHandler;

#[async_trait]
impl ServerHandler for GitHandler {
    fn label(&self) -> &str {
        "git"
    }

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value, ProtocolError> {
        match operation {
            "git_status" => Ok(json!({
                "success": true,
                "data": "Git repository status:",
                "status": "clean",
                "changes": [],
            })),
            "git_commit" => Ok(json!({
                "success": true,
                "data": format!("Committed with message: {}", param(params, "message", "Update")),
                "commit_hash": "abc123def456",
            })),
            _ => Err(self.unknown(operation)),
        }
    }
}

#[derive(Debug)]
struct HttpHandler;

#[async_trait]
impl ServerHandler for HttpHandler {
    fn label(&self) -> &str {
        "HTTP"
    }

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value, ProtocolError> {
        match operation {
            "http_get" => Ok(json!({
                "success": true,
                "data": format!("HTTP GET response from {}", param(params, "url", "")),
                "status": 200,
                "content": "This is simulated HTTP content from MCP http server.",
            })),
            _ => Err(self.unknown(operation)),
        }
    }
}

#[derive(Debug)]
struct DatabaseHandler;

#[async_trait]
impl ServerHandler for DatabaseHandler {
    fn label(&self) -> &str {
        "database"
    }

    async fn execute(&self, operation: &str, params: &Params) -> Result<Value, ProtocolError> {
        match operation {
            "db_query" => Ok(json!({
                "success": true,
                "data": format!("Database query executed: {}", param(params, "query", "")),
                "results": [{"id": 1, "name": "example"}],
            })),
            _ => Err(self.unknown(operation)),
        }
    }
}
