//! Built-in tools with an extensible trait-based architecture.
//!
//! This module defines the [`Tool`] trait that every built-in capability
//! implements. Tools are registered with the [`CapabilityRegistry`], which also
//! carries the static catalog of protocol servers.
//!
//! # Built-in tools
//!
//! | Name           | Backend                                   |
//! |----------------|-------------------------------------------|
//! | `weather`      | OpenWeatherMap (with key) or wttr.in      |
//! | `search`       | DuckDuckGo Instant Answer                 |
//! | `code_execute` | Interpreter subprocess under a hard timeout |
//! | `time`         | Local clock                               |
//! | `joke`         | Fixed list                                |
//! | `quote`        | Fixed list                                |
//! | `play`         | Rock-paper-scissors, number guess, hangman |
//!
//! Tools degrade rather than fail: an unreachable backend yields an apologetic
//! sentence, and sandbox rejections/timeouts are reported as normal text.

mod code;
mod joke;
pub mod mock;
mod play;
mod quote;
mod registry;
mod sandbox;
mod search;
mod time;
mod weather;

pub use code::CodeTool;
pub use joke::JokeTool;
pub use mock::MockTool;
pub use play::{PlayTool, DEFAULT_GAME};
pub use quote::QuoteTool;
pub use registry::{default_servers, CapabilityRegistry};
pub use sandbox::{Sandbox, SandboxOutput};
pub use search::SearchTool;
pub use time::TimeTool;
pub use weather::{WeatherTool, DEFAULT_LOCATION};

use async_trait::async_trait;

use crate::error::ChatError;
use crate::models::{CapabilityDescriptor, Params};

/// The Tool trait defines the interface for all built-in capabilities.
///
/// # Implementing a New Tool
///
/// 1. Create a struct that implements `Tool`
/// 2. Implement `id`, `description` and `invoke`
/// 3. Override `follow_up` if streamed replies should carry a trailing chunk
/// 4. Add it to `CapabilityRegistry::with_client()` or register it dynamically
#[async_trait]
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// Unique name used by the classifier and the tool endpoint (e.g. "weather")
    fn id(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Catalog entry for this tool
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::tool(self.id(), self.description())
    }

    /// Conversational chunk emitted after the result on the streaming path
    fn follow_up(&self) -> Option<&str> {
        None
    }

    /// Run the tool with the given parameters and return its textual result
    async fn invoke(&self, params: &Params) -> Result<String, ChatError>;
}

/// Read a non-blank parameter, falling back to a default
pub(crate) fn param_or<'a>(params: &'a Params, key: &str, default: &'a str) -> &'a str {
    params
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}
