//! # Oasiz Chat
//!
//! A chat backend that routes free-text messages to built-in tools, simulated
//! MCP protocol servers, or a generative AI fallback, and returns the result
//! whole or as a stream of chunks.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Message, CapabilityDescriptor, ResponseEnvelope, etc.)
//! - [`tools`]: Built-in tools with an extensible trait-based architecture, plus the capability registry
//! - [`mcp`]: Protocol server backend trait and the simulated MCP manager
//! - [`intent`]: Ordered rule-based intent classification
//! - [`ai`]: Generative AI providers
//! - [`dispatch`]: Routing of classified messages into response envelopes
//! - [`stream`]: Chunked emission of replies
//! - [`server`]: HTTP, SSE and WebSocket surfaces
//! - [`utils`]: HTTP client and the message log
//! - [`config`]: Configuration management

pub mod ai;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod mcp;
pub mod models;
pub mod server;
pub mod stream;
pub mod tools;
pub mod utils;

// Re-export commonly used types
pub use dispatch::Dispatcher;
pub use error::{ChatError, ErrorKind, Result};
pub use models::{Message, ResponseEnvelope};
pub use stream::{StreamChunk, StreamEmitter};
pub use tools::{CapabilityRegistry, Tool};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
