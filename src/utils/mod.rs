//! Utility modules shared by the capability layer and the transport.
//!
//! - [`HttpClient`]: shared reqwest client with sensible timeouts
//! - [`MessageLog`]: append-only, process-wide chat history

mod history;
mod http;

pub use history::MessageLog;
pub use http::HttpClient;
