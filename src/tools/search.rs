//! Web search tool.
//!
//! Uses the DuckDuckGo Instant Answer API (no key required).
//! API documentation: <https://duckduckgo.com/api>

use async_trait::async_trait;
use serde::Deserialize;

use super::{param_or, Tool};
use crate::config::Config;
use crate::error::ChatError;
use crate::models::Params;
use crate::utils::HttpClient;

#[derive(Debug, Clone)]
pub struct SearchTool {
    client: HttpClient,
    endpoint: String,
}

impl SearchTool {
    pub fn new(client: HttpClient, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.providers.search_url.clone(),
        }
    }

    async fn lookup(&self, query: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .client()
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(format!("Sorry, I couldn't search for '{}'", query));
        }

        // DuckDuckGo labels its JSON as application/x-javascript
        let body = response.text().await?;
        let answer: InstantAnswer = serde_json::from_str(&body)?;

        let reply = if !answer.abstract_text.is_empty() {
            format!("Search result for '{}': {}", query, answer.abstract_text)
        } else if !answer.answer.is_empty() {
            format!("Answer for '{}': {}", query, answer.answer)
        } else {
            format!(
                "I found some results for '{}' but couldn't get a specific answer.",
                query
            )
        };

        Ok(reply)
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn id(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web for information"
    }

    async fn invoke(&self, params: &Params) -> Result<String, ChatError> {
        let query = param_or(params, "query", "");

        match self.lookup(query).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                tracing::warn!("Search failed for '{}': {}", query, e);
                Ok(format!("Error searching: {}", e))
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Abstract", default)]
    abstract_text: String,
    #[serde(rename = "Answer", default)]
    answer: String,
}
