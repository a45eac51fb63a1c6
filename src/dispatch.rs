//! Routing of classified messages to capabilities.
//!
//! Every capability fault is turned into an error [`ResponseEnvelope`] here;
//! nothing below this layer reaches the transport as a failure.

use std::sync::Arc;

use serde_json::Value;

use crate::ai::{apology, AiProvider, OpenAiProvider, AI_UNAVAILABLE};
use crate::config::Config;
use crate::error::{ChatError, ErrorKind};
use crate::intent::{IntentClassifier, IntentMatch, Target};
use crate::mcp::{render_result, McpManager, ProtocolBackend, ProtocolError};
use crate::models::{Message, Params, ResponseEnvelope, Sender};
use crate::tools::CapabilityRegistry;
use crate::utils::{HttpClient, MessageLog};

/// Origin name of AI fallback envelopes
pub const AI_ORIGIN: &str = "ai";

#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    classifier: IntentClassifier,
    protocol: Arc<dyn ProtocolBackend>,
    ai: Arc<dyn AiProvider>,
    log: Arc<MessageLog>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        protocol: Arc<dyn ProtocolBackend>,
        ai: Arc<dyn AiProvider>,
        log: Arc<MessageLog>,
    ) -> Self {
        let classifier = IntentClassifier::new(&registry);
        Self {
            registry,
            classifier,
            protocol,
            ai,
            log,
        }
    }

    /// Wire up the built-in tools, the simulated protocol servers and the
    /// OpenAI provider from configuration
    pub fn from_config(config: &Config) -> Result<Self, ChatError> {
        let client = HttpClient::new()?;
        let registry = Arc::new(CapabilityRegistry::with_client(client.clone(), config));
        let protocol = Arc::new(McpManager::new(registry.clone()));
        let ai = Arc::new(OpenAiProvider::new(client, config));

        Ok(Self::new(registry, protocol, ai, Arc::new(MessageLog::new())))
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn protocol(&self) -> &Arc<dyn ProtocolBackend> {
        &self.protocol
    }

    pub fn ai(&self) -> &Arc<dyn AiProvider> {
        &self.ai
    }

    pub fn log(&self) -> &Arc<MessageLog> {
        &self.log
    }

    pub fn classify(&self, text: &str) -> Option<IntentMatch> {
        self.classifier.classify(text)
    }

    /// Record the user message, route it, and record the reply
    #[tracing::instrument(skip(self, text), fields(session = %session_id))]
    pub async fn dispatch(&self, session_id: &str, text: &str) -> ResponseEnvelope {
        self.log.append(session_id, Sender::User, text);
        let (envelope, _) = self.reply(session_id, text).await;
        envelope
    }

    /// Route a message whose user side is already logged, and record the reply
    #[tracing::instrument(skip(self, text), fields(session = %session_id))]
    pub async fn reply(&self, session_id: &str, text: &str) -> (ResponseEnvelope, Message) {
        let envelope = self.evaluate(text).await;
        let message = self.log.append(session_id, Sender::Bot, &envelope.text());
        (envelope, message)
    }

    /// Route a message without touching the log
    pub async fn evaluate(&self, text: &str) -> ResponseEnvelope {
        match self.classify(text) {
            Some(intent) => self.run_intent(&intent).await,
            None => {
                tracing::debug!("No intent matched, asking the AI provider");
                self.ask_ai(text).await
            }
        }
    }

    /// Invoke the capability an intent selected
    pub async fn run_intent(&self, intent: &IntentMatch) -> ResponseEnvelope {
        tracing::debug!("Intent matched: {}", intent.capability.name);
        match intent.target {
            Target::Tool(name) => self.invoke_tool(name, &intent.params).await,
            Target::Protocol { server, operation } => {
                match self.execute_protocol(server, operation, &intent.params).await {
                    Ok(value) => ResponseEnvelope::structured(server, value),
                    Err(e) => ResponseEnvelope::error(server, e.kind(), render_result(server, &Err(e))),
                }
            }
        }
    }

    /// Run a tool by name; unknown names produce an error envelope
    pub async fn invoke_tool(&self, name: &str, params: &Params) -> ResponseEnvelope {
        let tool = match self.registry.get(name) {
            Some(tool) => tool,
            None => {
                tracing::warn!("Unknown tool requested: {}", name);
                return ResponseEnvelope::from_error(
                    name,
                    &ChatError::UnknownCapability(name.to_string()),
                );
            }
        };

        match tool.invoke(params).await {
            Ok(text) => ResponseEnvelope::success(name, text),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                ResponseEnvelope::from_error(name, &e)
            }
        }
    }

    pub async fn execute_protocol(
        &self,
        server: &str,
        operation: &str,
        params: &Params,
    ) -> Result<Value, ProtocolError> {
        self.protocol.execute(server, operation, params).await
    }

    async fn ask_ai(&self, text: &str) -> ResponseEnvelope {
        if !self.ai.is_configured() {
            return ResponseEnvelope::error(
                AI_ORIGIN,
                ErrorKind::BackendUnavailable,
                AI_UNAVAILABLE,
            );
        }

        match self.ai.complete(text).await {
            Ok(reply) => ResponseEnvelope::success(AI_ORIGIN, reply),
            Err(e) => {
                tracing::warn!("AI provider failed: {}", e);
                ResponseEnvelope::error(AI_ORIGIN, e.kind(), apology(&e))
            }
        }
    }
}
