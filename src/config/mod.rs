//! Configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file, then
//! `OASIZ_*` environment variables (nested keys separated by `__`, e.g.
//! `OASIZ_SERVER__PORT=9000`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! openai = "sk-..."
//! weather = "openweathermap-key"
//!
//! [ai]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-3.5-turbo"
//! max_tokens = 500
//! temperature = 0.7
//!
//! [providers]
//! openweathermap_url = "http://api.openweathermap.org/data/2.5/weather"
//! wttr_url = "https://wttr.in"
//! search_url = "https://api.duckduckgo.com/"
//!
//! [sandbox]
//! interpreter = "python3"
//! timeout_secs = 10
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ChatError;

/// Placeholder values shipped in sample `.env` files; treated as "not configured"
const OPENAI_KEY_PLACEHOLDER: &str = "your-openai-api-key-here";
const WEATHER_KEY_PLACEHOLDER: &str = "your-weather-api-key-here";

/// File name searched for by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "oasiz.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Generative AI fallback settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Backend endpoints for the built-in tools
    #[serde(default)]
    pub providers: ProviderConfig,

    /// Code execution sandbox settings
    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// HTTP/WebSocket listener settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// OpenAI-compatible chat completion key
    #[serde(default)]
    pub openai: Option<String>,

    /// OpenWeatherMap key (optional, wttr.in is used without it)
    #[serde(default)]
    pub weather: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self {
            openai: std::env::var("OPENAI_API_KEY").ok(),
            weather: std::env::var("WEATHER_API_KEY").ok(),
        }
    }
}

impl ApiKeys {
    /// The OpenAI key, if one is set and is not the sample placeholder
    pub fn openai_key(&self) -> Option<&str> {
        usable_key(self.openai.as_deref(), OPENAI_KEY_PLACEHOLDER)
    }

    /// The weather key, if one is set and is not the sample placeholder
    pub fn weather_key(&self) -> Option<&str> {
        usable_key(self.weather.as_deref(), WEATHER_KEY_PLACEHOLDER)
    }
}

fn usable_key<'a>(key: Option<&'a str>, placeholder: &str) -> Option<&'a str> {
    key.map(str::trim)
        .filter(|k| !k.is_empty() && *k != placeholder)
}

/// Generative AI fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Whole-response limit for streamed completions, which outlive the
    /// shared client's request timeout
    #[serde(default = "default_stream_timeout")]
    pub stream_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            stream_timeout_secs: default_stream_timeout(),
        }
    }
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

fn default_stream_timeout() -> u64 {
    300
}

fn default_system_prompt() -> String {
    "You are Oasiz, a helpful and friendly AI assistant. You have access to various tools \
     like weather, web search, code execution, jokes, quotes, games, and MCP operations \
     (filesystem, git, HTTP, database). Be conversational, helpful, and engaging. Use emojis \
     occasionally to make responses more friendly."
        .to_string()
}

/// Endpoints used by the weather and search tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_openweathermap_url")]
    pub openweathermap_url: String,

    #[serde(default = "default_wttr_url")]
    pub wttr_url: String,

    #[serde(default = "default_search_url")]
    pub search_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openweathermap_url: default_openweathermap_url(),
            wttr_url: default_wttr_url(),
            search_url: default_search_url(),
        }
    }
}

fn default_openweathermap_url() -> String {
    "http://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_wttr_url() -> String {
    "https://wttr.in".to_string()
}

fn default_search_url() -> String {
    "https://api.duckduckgo.com/".to_string()
}

/// Code execution sandbox configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    /// Interpreter used to run submitted snippets
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Hard wall-clock cap per run
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Substrings that cause a snippet to be rejected before it runs
    #[serde(default = "default_banned_tokens")]
    pub banned_tokens: Vec<String>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_secs: default_timeout_secs(),
            banned_tokens: default_banned_tokens(),
        }
    }
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_banned_tokens() -> Vec<String> {
    ["os", "subprocess", "sys", "importlib", "eval", "exec"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// HTTP/WebSocket listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Write this configuration as TOML
    pub fn save(&self, path: &Path) -> Result<(), ChatError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Load configuration from a file, with `OASIZ_*` environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("OASIZ")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut loaded: Config = settings.try_deserialize()?;

    // A file without [api_keys] still picks the keys up from the environment
    let env_keys = ApiKeys::default();
    if loaded.api_keys.openai.is_none() {
        loaded.api_keys.openai = env_keys.openai;
    }
    if loaded.api_keys.weather.is_none() {
        loaded.api_keys.weather = env_keys.weather;
    }

    Ok(loaded)
}

/// Look for a config file in the working directory, then the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("oasiz").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ai.model, "gpt-3.5-turbo");
        assert_eq!(config.ai.max_tokens, 500);
        assert_eq!(config.ai.stream_timeout_secs, 300);
        assert_eq!(config.sandbox.timeout_secs, 10);
        assert_eq!(config.sandbox.banned_tokens.len(), 6);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_placeholder_keys_are_ignored() {
        let keys = ApiKeys {
            openai: Some("your-openai-api-key-here".to_string()),
            weather: Some("  ".to_string()),
        };
        assert!(keys.openai_key().is_none());
        assert!(keys.weather_key().is_none());

        let keys = ApiKeys {
            openai: Some("sk-test".to_string()),
            weather: None,
        };
        assert_eq!(keys.openai_key(), Some("sk-test"));
    }

    #[test]
    fn test_config_file_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("oasiz.toml");

        std::fs::write(
            &path,
            r#"
[api_keys]
openai = "file-key"

[ai]
model = "gpt-4o-mini"

[sandbox]
timeout_secs = 3

[server]
port = 9100
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api_keys.openai_key(), Some("file-key"));
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.max_tokens, 500);
        assert_eq!(config.sandbox.timeout_secs, 3);
        assert_eq!(config.sandbox.interpreter, "python3");
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = Config::default();
        config.api_keys.openai = Some("saved-key".to_string());
        config.server.port = 8123;
        config.save(&path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.api_keys.openai.as_deref(), Some("saved-key"));
        assert_eq!(loaded.server.port, 8123);
    }

    #[test]
    fn test_config_file_nonexistent() {
        let result = load_config(Path::new("/nonexistent/oasiz.toml"));
        assert!(result.is_err());
    }
}
