//! Registry of built-in tools and protocol servers.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::{
    CodeTool, JokeTool, PlayTool, QuoteTool, SearchTool, TimeTool, Tool, WeatherTool,
};
use crate::config::Config;
use crate::models::{CapabilityDescriptor, ProtocolServer};
use crate::utils::HttpClient;

/// The protocol servers every deployment starts with
pub fn default_servers() -> Vec<ProtocolServer> {
    vec![
        ProtocolServer::new(
            "filesystem",
            "mcp://localhost:3001",
            &["file_read", "file_write", "file_list"],
            "File system operations",
        ),
        ProtocolServer::new(
            "git",
            "mcp://localhost:3002",
            &["git_status", "git_commit", "git_push"],
            "Git repository management",
        ),
        ProtocolServer::new(
            "http",
            "mcp://localhost:3003",
            &["http_get", "http_post", "http_put"],
            "HTTP request handling",
        ),
        ProtocolServer::new(
            "database",
            "mcp://localhost:3004",
            &["db_query", "db_insert", "db_update"],
            "Database operations",
        ),
    ]
}

/// Catalog of every capability the dispatcher can route to
///
/// Both lists keep registration order; the catalog endpoints and the
/// classifier rely on it.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    tools: Vec<Arc<dyn Tool>>,
    servers: Vec<ProtocolServer>,
}

impl CapabilityRegistry {
    /// Create a registry with all built-in tools and the default servers,
    /// sharing one HTTP client between the network-backed tools
    pub fn with_client(client: HttpClient, config: &Config) -> Self {
        let mut registry = Self::empty();

        registry.register(Arc::new(WeatherTool::new(client.clone(), config)));
        registry.register(Arc::new(SearchTool::new(client, config)));
        registry.register(Arc::new(CodeTool::new(&config.sandbox)));
        registry.register(Arc::new(TimeTool::new()));
        registry.register(Arc::new(JokeTool::new()));
        registry.register(Arc::new(QuoteTool::new()));
        registry.register(Arc::new(PlayTool::new()));

        for server in default_servers() {
            registry.register_server(server);
        }

        registry
    }

    /// A registry with nothing in it
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same id in place
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter().position(|t| t.id() == tool.id()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    /// Register a protocol server, replacing any server with the same name in place
    pub fn register_server(&mut self, server: ProtocolServer) {
        match self.servers.iter().position(|s| s.name == server.name) {
            Some(idx) => self.servers[idx] = server,
            None => self.servers.push(server),
        }
    }

    pub fn list_tools(&self) -> Vec<CapabilityDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    pub fn list_servers(&self) -> Vec<ProtocolServer> {
        self.servers.clone()
    }

    /// Declared operations of a server; empty when the server is unknown
    pub fn capabilities_of(&self, server_name: &str) -> BTreeSet<String> {
        self.server(server_name)
            .map(|s| s.capabilities.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get a tool by id
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.id() == id)
    }

    /// Get a protocol server by name
    pub fn server(&self, name: &str) -> Option<&ProtocolServer> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Descriptor of a tool or server by name, tools first
    pub fn descriptor(&self, name: &str) -> Option<CapabilityDescriptor> {
        self.get(name)
            .map(|t| t.descriptor())
            .or_else(|| self.server(name).map(ProtocolServer::descriptor))
    }

    /// Check if a tool or server with this name exists
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some() || self.server(name).is_some()
    }

    /// Tool ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.id())
    }

    /// Number of registered tools and servers
    pub fn len(&self) -> usize {
        self.tools.len() + self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.servers.is_empty()
    }
}
