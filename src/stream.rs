//! Streaming emission of dispatch results.
//!
//! Tool and protocol intents are computed whole and emitted as one chunk
//! (plus the tool's follow-up, if any). Unclassified messages are streamed
//! token by token from the AI provider and always end with [`StreamChunk::Done`].

use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;

use crate::ai::{apology, AI_UNAVAILABLE};
use crate::dispatch::Dispatcher;
use crate::intent::Target;
use crate::models::Sender;

/// One emitted unit of a streamed reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    Text(String),
    /// Terminal sentinel of the AI path
    Done,
}

impl StreamChunk {
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamChunk::Text(text) => Some(text),
            StreamChunk::Done => None,
        }
    }
}

pub type ChunkStream = Pin<Box<dyn Stream<Item = StreamChunk> + Send>>;

#[derive(Debug, Clone)]
pub struct StreamEmitter {
    dispatcher: Arc<Dispatcher>,
}

impl StreamEmitter {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Lazily produce the reply to `text` as a finite chunk sequence
    ///
    /// The user message is logged when the stream is first polled; the bot
    /// reply is logged only if the stream is driven to the end, so dropping
    /// it part-way leaves no partial reply behind.
    pub fn stream(&self, session_id: &str, text: &str) -> ChunkStream {
        let dispatcher = self.dispatcher.clone();
        let session_id = session_id.to_string();
        let text = text.to_string();

        Box::pin(async_stream::stream! {
            tracing::debug!(session = %session_id, "Stream started");
            dispatcher.log().append(&session_id, Sender::User, &text);
            let mut reply = String::new();

            if let Some(intent) = dispatcher.classify(&text) {
                let envelope = dispatcher.run_intent(&intent).await;
                reply = envelope.text();
                yield StreamChunk::Text(reply.clone());

                // Failed tools get no follow-up
                let follow_up = match intent.target {
                    Target::Tool(name) if envelope.is_success() => dispatcher
                        .registry()
                        .get(name)
                        .and_then(|tool| tool.follow_up())
                        .map(str::to_string),
                    _ => None,
                };
                if let Some(follow_up) = follow_up {
                    yield StreamChunk::Text(follow_up);
                }
            } else if !dispatcher.ai().is_configured() {
                reply = AI_UNAVAILABLE.to_string();
                yield StreamChunk::Text(reply.clone());
                yield StreamChunk::Done;
            } else {
                let mut tokens = dispatcher.ai().stream(&text);
                while let Some(token) = tokens.next().await {
                    match token {
                        Ok(token) => {
                            reply.push_str(&token);
                            yield StreamChunk::Text(token);
                        }
                        Err(e) => {
                            tracing::warn!("AI stream failed: {}", e);
                            let message = apology(&e);
                            reply.push_str(&message);
                            yield StreamChunk::Text(message);
                            break;
                        }
                    }
                }
                yield StreamChunk::Done;
            }

            dispatcher.log().append(&session_id, Sender::Bot, &reply);
            tracing::debug!(session = %session_id, "Stream finished");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockProvider;
    use crate::mcp::McpManager;
    use crate::tools::{default_servers, CapabilityRegistry, MockTool};
    use crate::utils::MessageLog;

    fn emitter(ai: MockProvider) -> StreamEmitter {
        emitter_with(ai, Arc::new(MockTool::new("joke")))
    }

    fn emitter_with(ai: MockProvider, joke: Arc<MockTool>) -> StreamEmitter {
        let mut registry = CapabilityRegistry::empty();
        registry.register(joke);
        for server in default_servers() {
            registry.register_server(server);
        }
        let registry = Arc::new(registry);
        let protocol = Arc::new(McpManager::new(registry.clone()));

        StreamEmitter::new(Arc::new(Dispatcher::new(
            registry,
            protocol,
            Arc::new(ai),
            Arc::new(MessageLog::new()),
        )))
    }

    #[tokio::test]
    async fn test_tool_path_is_one_chunk() {
        let chunks: Vec<StreamChunk> = emitter(MockProvider::new(&[]))
            .stream("s1", "tell me a joke")
            .collect()
            .await;

        assert_eq!(chunks, [StreamChunk::Text("joke result".into())]);
    }

    #[tokio::test]
    async fn test_follow_up_only_after_success() {
        let joke = Arc::new(MockTool::new("joke").with_follow_up("Want another one?"));
        let emitter = emitter_with(MockProvider::new(&[]), joke.clone());

        let chunks: Vec<StreamChunk> = emitter.stream("s1", "tell me a joke").collect().await;
        assert_eq!(
            chunks,
            [
                StreamChunk::Text("joke result".into()),
                StreamChunk::Text("Want another one?".into())
            ]
        );

        joke.set_failure("backend down");
        let chunks: Vec<StreamChunk> = emitter.stream("s1", "tell me a joke").collect().await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text().unwrap().contains("backend down"));
    }

    #[tokio::test]
    async fn test_protocol_path() {
        let chunks: Vec<StreamChunk> = emitter(MockProvider::new(&[]))
            .stream("s1", "db users")
            .collect()
            .await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].text(),
            Some("✅ MCP database result: Database query executed: users")
        );
    }

    #[tokio::test]
    async fn test_ai_tokens_then_sentinel() {
        let emitter = emitter(MockProvider::new(&["Hel", "lo"]));
        let chunks: Vec<StreamChunk> = emitter.stream("s1", "hello?").collect().await;

        assert_eq!(
            chunks,
            [
                StreamChunk::Text("Hel".into()),
                StreamChunk::Text("lo".into()),
                StreamChunk::Done
            ]
        );

        let history = emitter.dispatcher.log().session("s1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "Hello");
    }

    #[tokio::test]
    async fn test_mid_stream_failure() {
        let chunks: Vec<StreamChunk> = emitter(MockProvider::new(&["a", "b", "c"]).failing_after(1))
            .stream("s1", "hello?")
            .collect()
            .await;

        assert_eq!(
            chunks,
            [
                StreamChunk::Text("a".into()),
                StreamChunk::Text("Sorry, I encountered an error: mock failure".into()),
                StreamChunk::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_unconfigured_provider() {
        let chunks: Vec<StreamChunk> = emitter(MockProvider::unconfigured())
            .stream("s1", "hello?")
            .collect()
            .await;

        assert_eq!(
            chunks,
            [StreamChunk::Text(AI_UNAVAILABLE.into()), StreamChunk::Done]
        );
    }

    #[tokio::test]
    async fn test_dropped_stream_logs_no_reply() {
        let emitter = emitter(MockProvider::new(&["a", "b"]));
        let mut stream = emitter.stream("s1", "hello?");

        assert_eq!(stream.next().await, Some(StreamChunk::Text("a".into())));
        drop(stream);

        let history = emitter.dispatcher.log().session("s1");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].sender, Sender::User);
    }
}
