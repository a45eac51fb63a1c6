//! Connection tracking for protocol servers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::simulated::{handler_for, ServerHandler};
use super::{ProtocolBackend, ProtocolError};
use crate::models::{Params, ProtocolServer, ServerStatus};
use crate::tools::CapabilityRegistry;

/// Live connection to one protocol server
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolConnection {
    pub server: ProtocolServer,
    pub connected: bool,
    pub last_used: DateTime<Utc>,
}

/// Protocol backend answering from simulated handlers
///
/// The connection table is keyed by server name and guarded by a single
/// mutex; every read-modify-write of a connection happens under one lock.
#[derive(Debug)]
pub struct McpManager {
    registry: Arc<CapabilityRegistry>,
    handlers: HashMap<String, Box<dyn ServerHandler>>,
    connections: Mutex<HashMap<String, ProtocolConnection>>,
}

impl McpManager {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        let handlers = registry
            .list_servers()
            .into_iter()
            .filter_map(|s| handler_for(&s.name).map(|h| (s.name, h)))
            .collect();

        Self {
            registry,
            handlers,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of a server's connection record
    pub fn connection(&self, server: &str) -> Option<ProtocolConnection> {
        self.connections.lock().get(server).cloned()
    }

    pub fn is_connected(&self, server: &str) -> bool {
        self.connections
            .lock()
            .get(server)
            .map(|c| c.connected)
            .unwrap_or(false)
    }

    fn open(&self, name: &str) -> Result<(), ProtocolError> {
        let server = match self.registry.server(name) {
            Some(server) => server.clone(),
            None => {
                tracing::error!("Unknown MCP server: {}", name);
                return Err(ProtocolError::UnknownServer(name.to_string()));
            }
        };

        self.connections.lock().insert(
            name.to_string(),
            ProtocolConnection {
                server,
                connected: true,
                last_used: Utc::now(),
            },
        );
        tracing::info!("Connected to MCP server: {}", name);
        Ok(())
    }

    /// Refresh `last_used`; false when there is no connection record
    fn touch(&self, name: &str) -> bool {
        match self.connections.lock().get_mut(name) {
            Some(conn) => {
                conn.last_used = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ProtocolBackend for McpManager {
    async fn connect(&self, server: &str) -> Result<(), ProtocolError> {
        self.open(server)
    }

    async fn execute(
        &self,
        server: &str,
        operation: &str,
        params: &Params,
    ) -> Result<Value, ProtocolError> {
        if !self.touch(server) {
            tracing::debug!("Auto-connecting to MCP server: {}", server);
            self.open(server)
                .map_err(|_| ProtocolError::CouldNotConnect(server.to_string()))?;
        }

        let result = match self.handlers.get(server) {
            Some(handler) => handler.execute(operation, params).await,
            None => Err(ProtocolError::UnknownOperation {
                server: server.to_string(),
                operation: operation.to_string(),
            }),
        };

        if let Err(e) = &result {
            tracing::warn!("MCP {} on {} failed: {}", operation, server, e);
        }
        result
    }

    async fn disconnect(&self, server: &str) -> bool {
        let removed = self.connections.lock().remove(server).is_some();
        if removed {
            tracing::info!("Disconnected from MCP server: {}", server);
        }
        removed
    }

    fn capabilities(&self, server: &str) -> BTreeSet<String> {
        self.registry.capabilities_of(server)
    }

    fn servers(&self) -> Vec<ServerStatus> {
        let connections = self.connections.lock();
        self.registry
            .list_servers()
            .into_iter()
            .map(|server| ServerStatus {
                connected: connections
                    .get(&server.name)
                    .map(|c| c.connected)
                    .unwrap_or(false),
                server,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::default_servers;

    fn manager() -> McpManager {
        let mut registry = CapabilityRegistry::empty();
        for server in default_servers() {
            registry.register_server(server);
        }
        McpManager::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        let mcp = manager();

        mcp.connect("git").await.unwrap();
        let first = mcp.connection("git").unwrap().last_used;
        mcp.connect("git").await.unwrap();
        let second = mcp.connection("git").unwrap().last_used;

        assert!(mcp.is_connected("git"));
        assert!(second >= first);
    }

    #[tokio::test]
    async fn test_connect_unknown_server() {
        let mcp = manager();
        let err = mcp.connect("ftp").await.unwrap_err();

        assert_eq!(err, ProtocolError::UnknownServer("ftp".into()));
        assert!(mcp.connection("ftp").is_none());
    }

    #[tokio::test]
    async fn test_execute_auto_connects() {
        let mcp = manager();
        assert!(!mcp.is_connected("database"));

        let mut params = Params::new();
        params.insert("query".to_string(), "users".to_string());
        let result = mcp.execute("database", "db_query", &params).await.unwrap();

        assert_eq!(result["data"], "Database query executed: users");
        assert!(mcp.is_connected("database"));
    }

    #[tokio::test]
    async fn test_execute_refreshes_last_used() {
        let mcp = manager();
        mcp.connect("filesystem").await.unwrap();
        let before = mcp.connection("filesystem").unwrap().last_used;

        mcp.execute("filesystem", "file_list", &Params::new())
            .await
            .unwrap();

        assert!(mcp.connection("filesystem").unwrap().last_used >= before);
    }

    #[tokio::test]
    async fn test_execute_unknown_server_fails_gracefully() {
        let mcp = manager();
        let err = mcp
            .execute("ftp", "ftp_get", &Params::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Could not connect to MCP server: ftp");
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let mcp = manager();
        let err = mcp
            .execute("git", "git_rebase", &Params::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::UnknownOperation { .. }));
        // The connection is still made
        assert!(mcp.is_connected("git"));
    }

    #[tokio::test]
    async fn test_disconnect() {
        let mcp = manager();
        mcp.connect("http").await.unwrap();

        assert!(mcp.disconnect("http").await);
        assert!(!mcp.disconnect("http").await);
        assert!(!mcp.is_connected("http"));
    }

    #[tokio::test]
    async fn test_servers_report_connection_flag() {
        let mcp = manager();
        mcp.connect("git").await.unwrap();

        let servers = mcp.servers();
        assert_eq!(servers.len(), 4);
        for status in servers {
            assert_eq!(status.connected, status.server.name == "git");
        }
        assert_eq!(mcp.capabilities("filesystem").len(), 3);
        assert!(mcp.capabilities("ftp").is_empty());
    }
}
