//! OpenAI-compatible chat completion provider.
//!
//! API documentation: <https://platform.openai.com/docs/api-reference/chat>

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{AiProvider, TokenStream};
use crate::config::{AiConfig, Config};
use crate::error::ChatError;
use crate::utils::HttpClient;

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: HttpClient,
    api_key: Option<String>,
    settings: AiConfig,
}

impl OpenAiProvider {
    pub fn new(client: HttpClient, config: &Config) -> Self {
        Self {
            client,
            api_key: config.api_keys.openai_key().map(str::to_string),
            settings: config.ai.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn request<'a>(&'a self, message: &'a str, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.settings.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stream,
        }
    }

    /// Streamed bodies run longer than the client-wide timeout allows
    fn stream_request(&self, key: &str, message: &str) -> reqwest::RequestBuilder {
        self.client
            .client()
            .post(self.endpoint())
            .bearer_auth(key)
            .timeout(Duration::from_secs(self.settings.stream_timeout_secs))
            .json(&self.request(message, true))
    }

    fn key(&self) -> Result<&str, ChatError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ChatError::BackendUnavailable("OpenAI API key not configured".into()))
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, message: &str) -> Result<String, ChatError> {
        let key = self.key()?;

        let response = self
            .client
            .client()
            .post(self.endpoint())
            .bearer_auth(key)
            .json(&self.request(message, false))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!("AI provider returned an error: {}", error_text);
            return Err(ChatError::Provider(error_text));
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::Provider("empty completion".into()))
    }

    fn stream(&self, message: &str) -> TokenStream {
        let key = match self.key() {
            Ok(key) => key.to_string(),
            Err(e) => {
                return Box::pin(futures_util::stream::once(async move {
                    Err::<String, ChatError>(e)
                }))
            }
        };

        let request = self.stream_request(&key, message);

        Box::pin(async_stream::stream! {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    yield Err(ChatError::from(e));
                    return;
                }
            };

            if !response.status().is_success() {
                let error_text = response.text().await.unwrap_or_default();
                tracing::warn!("AI provider returned an error: {}", error_text);
                yield Err(ChatError::Provider(error_text));
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ChatError::from(e));
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);

                while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    let line = String::from_utf8_lossy(&line);

                    match parse_sse_line(line.trim()) {
                        SseEvent::Token(token) => yield Ok(token),
                        SseEvent::Done => return,
                        SseEvent::Skip => {}
                    }
                }
            }
        })
    }
}

/// One parsed line of the event stream
#[derive(Debug, PartialEq, Eq)]
enum SseEvent {
    Token(String),
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseEvent {
    let payload = match line.strip_prefix("data:") {
        Some(payload) => payload.trim_start(),
        None => return SseEvent::Skip,
    };

    if payload == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .filter(|content| !content.is_empty())
            .map(SseEvent::Token)
            .unwrap_or(SseEvent::Skip),
        Err(e) => {
            tracing::debug!("Skipping malformed stream line: {}", e);
            SseEvent::Skip
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}
