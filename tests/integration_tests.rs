//! Integration tests for Oasiz Chat
//!
//! These tests drive the dispatcher, the stream emitter and the HTTP router
//! end to end, with the network-backed tools and the AI provider replaced by
//! in-crate mocks.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use futures_util::StreamExt;
use oasiz_chat::ai::{MockProvider, AI_UNAVAILABLE};
use oasiz_chat::config::Config;
use oasiz_chat::mcp::{McpManager, ProtocolBackend};
use oasiz_chat::models::{Outcome, Params};
use oasiz_chat::server::{router, AppState};
use oasiz_chat::tools::{CapabilityRegistry, MockTool};
use oasiz_chat::utils::{HttpClient, MessageLog};
use oasiz_chat::{Dispatcher, ErrorKind, StreamChunk, StreamEmitter};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Full registry with the weather and search tools swapped for mocks
fn offline_registry() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::with_client(HttpClient::default(), &Config::default());

    let weather = Arc::new(MockTool::new("weather"));
    weather.set_reply("🌤️ Paris: ☀️ +21°C");
    registry.register(weather);
    registry.register(Arc::new(MockTool::new("search")));

    registry
}

fn dispatcher(ai: MockProvider) -> Arc<Dispatcher> {
    dispatcher_from(offline_registry(), ai)
}

fn dispatcher_from(registry: CapabilityRegistry, ai: MockProvider) -> Arc<Dispatcher> {
    let registry = Arc::new(registry);
    let protocol = Arc::new(McpManager::new(registry.clone()));
    Arc::new(Dispatcher::new(
        registry,
        protocol,
        Arc::new(ai),
        Arc::new(MessageLog::new()),
    ))
}

async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn call_json(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = call(app, request).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Data payloads of a `text/event-stream` body, joined the way an
/// EventSource client joins multi-line events
fn sse_data(body: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(body).replace("\r\n", "\n");
    text.split("\n\n")
        .filter_map(|block| {
            let lines: Vec<&str> = block
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|data| data.strip_prefix(' ').unwrap_or(data))
                .collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        })
        .collect()
}

#[tokio::test]
async fn test_every_known_tool_succeeds() {
    let dispatcher = dispatcher(MockProvider::new(&[]));
    let names: Vec<String> = dispatcher
        .registry()
        .list_tools()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names.len(), 7);

    for name in names {
        let envelope = dispatcher.invoke_tool(&name, &Params::new()).await;
        assert_eq!(envelope.outcome, Outcome::Success, "tool {}", name);
        assert!(!envelope.text().is_empty(), "tool {}", name);
    }

    let unknown = dispatcher.invoke_tool("teleport", &Params::new()).await;
    assert_eq!(unknown.outcome, Outcome::Error);
    assert_eq!(unknown.error_kind, Some(ErrorKind::UnknownCapability));
}

#[tokio::test]
async fn test_connect_then_execute_every_server() {
    let registry = Arc::new(offline_registry());
    let mcp = McpManager::new(registry.clone());

    let cases = [
        ("filesystem", "file_read"),
        ("git", "git_status"),
        ("http", "http_get"),
        ("database", "db_query"),
    ];
    for (server, operation) in cases {
        mcp.connect(server).await.unwrap();
        let result = mcp.execute(server, operation, &Params::new()).await.unwrap();
        assert_eq!(result["success"], true, "{} {}", server, operation);
    }
}

#[tokio::test]
async fn test_code_with_banned_token_is_rejected() {
    let dispatcher = dispatcher(MockProvider::new(&[]));
    let text = "execute this code\n```python\nimport os\nprint(os.listdir())\n```";

    let envelope = dispatcher.dispatch("s1", text).await;
    assert!(envelope.is_success());
    assert!(envelope.text().contains("security"));
}

#[tokio::test]
async fn test_weather_stream_has_follow_up() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/Paris")
        .match_query(mockito::Matcher::UrlEncoded("format".into(), "3".into()))
        .with_status(200)
        .with_body("Paris: ☀️ +21°C\n")
        .create_async()
        .await;

    let mut config = Config::default();
    config.api_keys.weather = None;
    config.providers.wttr_url = server.url();

    let registry = Arc::new(CapabilityRegistry::with_client(HttpClient::default(), &config));
    let protocol = Arc::new(McpManager::new(registry.clone()));
    let dispatcher = Arc::new(Dispatcher::new(
        registry,
        protocol,
        Arc::new(MockProvider::new(&[])),
        Arc::new(MessageLog::new()),
    ));

    let chunks: Vec<StreamChunk> = StreamEmitter::new(dispatcher)
        .stream("s1", "What's the weather in Paris")
        .collect()
        .await;

    assert_eq!(
        chunks,
        [
            StreamChunk::Text("🌤️ Paris: ☀️ +21°C".into()),
            StreamChunk::Text("Is there anything else you'd like to know about the weather?".into()),
        ]
    );
}

#[tokio::test]
async fn test_unclassified_stream_ends_with_sentinel() {
    let emitter = StreamEmitter::new(dispatcher(MockProvider::new(&["Hi", "!"])));
    let chunks: Vec<StreamChunk> = emitter
        .stream("s1", "xyz completely unrelated gibberish")
        .collect()
        .await;

    assert_eq!(chunks.last(), Some(&StreamChunk::Done));
    assert_eq!(chunks.len(), 3);
}

#[tokio::test]
async fn test_root_and_health() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&[]))));

    let (status, body) = call_json(app.clone(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("running"));

    let (status, body) = call_json(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_tools_endpoint() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&[]))));
    let (status, body) = call_json(app, get("/tools")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tools"]["code_execute"], "Execute Python code safely");
    assert_eq!(body["tools"].as_object().unwrap().len(), 7);
}

#[tokio::test]
async fn test_tool_execute_endpoint() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&[]))));

    let (status, body) = call_json(
        app.clone(),
        post("/tools/execute", json!({"tool": "play", "params": {"game_type": "number"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tool"], "play");
    assert!(body["result"].as_str().unwrap().contains("between 1 and 100"));

    let (status, body) = call_json(
        app,
        post("/tools/execute", json!({"tool": "teleport", "params": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("teleport"));
}

#[tokio::test]
async fn test_malformed_request_is_client_error() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&[]))));
    let (status, _) = call(app, post("/tools/execute", json!({"params": {}}))).await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_chat_send_and_history() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&[]))));

    for text in ["first", "second"] {
        let (status, body) = call_json(
            app.clone(),
            post(
                "/chat/send",
                json!({"sender": "user", "text": text, "session_id": "abc"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], text);
    }

    let (status, body) = call_json(app.clone(), get("/chat/history?session_id=abc")).await;
    assert_eq!(status, StatusCode::OK);
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0]["id"].as_u64() < history[1]["id"].as_u64());

    let (status, body) = call_json(app, get("/chat/history?session_id=nobody")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_ai_chat_endpoint() {
    let app = router(AppState::new(dispatcher(MockProvider::unconfigured())));

    let (status, body) = call_json(
        app.clone(),
        post("/ai/chat", json!({"message": "hello?", "session_id": "s1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], AI_UNAVAILABLE);

    let (_, body) = call_json(
        app,
        post("/ai/chat", json!({"message": "git status", "session_id": "s1"})),
    )
    .await;
    assert_eq!(body["response"], "✅ MCP git result: Git repository status:");
}

#[tokio::test]
async fn test_ai_stream_endpoint() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&["Hel", "lo"]))));
    let (status, body) = call(
        app,
        post("/ai/stream", json!({"message": "hello?", "session_id": "s1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(sse_data(&body), ["Hel", "lo", "[DONE]"]);
}

#[tokio::test]
async fn test_ai_stream_keeps_multiline_tokens() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&[
        "Step 1\nStep 2",
        "Step 3\r\nStep 4",
    ]))));
    let (status, body) = call(
        app,
        post("/ai/stream", json!({"message": "hello?", "session_id": "s1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sse_data(&body),
        ["Step 1\nStep 2", "Step 3\nStep 4", "[DONE]"]
    );
}

#[tokio::test]
async fn test_code_result_streams_with_output() {
    let mut registry = offline_registry();
    let code = Arc::new(MockTool::new("code_execute"));
    code.set_reply("Code executed successfully:\nHello, World!\n");
    registry.register(code.clone());

    let app = router(AppState::new(dispatcher_from(registry, MockProvider::new(&[]))));
    let message = "execute this code\n```python\nprint(\"Hello, World!\")\n```";
    let (_, body) = call(
        app,
        post("/ai/stream", json!({"message": message, "session_id": "s1"})),
    )
    .await;

    let events = sse_data(&body);
    assert_eq!(events.len(), 1);
    assert!(events[0].starts_with("Code executed successfully:\nHello, World!"));
    assert_eq!(code.calls()[0]["code"], "print(\"Hello, World!\")");
}

#[tokio::test]
#[ignore = "requires python3 on PATH"]
async fn test_python_output_reaches_stream_client() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&[]))));
    let message = "execute this code\n```python\nprint(\"Hello, World!\")\n```";
    let (_, body) = call(
        app,
        post("/ai/stream", json!({"message": message, "session_id": "s1"})),
    )
    .await;

    let events = sse_data(&body);
    assert_eq!(events.len(), 1);
    assert!(events[0].starts_with("Code executed successfully:\n"));
    assert!(events[0].contains("Hello, World!"));
}

#[tokio::test]
async fn test_mcp_endpoints() {
    let app = router(AppState::new(dispatcher(MockProvider::new(&[]))));

    let (_, body) = call_json(app.clone(), get("/mcp/servers")).await;
    let servers = body["servers"].as_array().unwrap();
    assert_eq!(servers.len(), 4);
    assert!(servers.iter().all(|s| s["connected"] == false));
    assert_eq!(servers[0]["url"], "mcp://localhost:3001");

    let (status, _) = call_json(app.clone(), post("/mcp/connect/git", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call_json(app.clone(), post("/mcp/connect/ftp", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Failed to connect to MCP server: ftp");

    let (_, body) = call_json(app.clone(), get("/mcp/servers")).await;
    let git = body["servers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "git")
        .unwrap()
        .clone();
    assert_eq!(git["connected"], true);

    let (status, body) = call_json(
        app.clone(),
        post(
            "/mcp/execute",
            json!({"server_name": "git", "tool_name": "git_commit", "params": {"message": "Initial"}}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["data"], "Committed with message: Initial");
    assert_eq!(body["server"], "git");

    let (_, body) = call_json(
        app.clone(),
        post(
            "/mcp/execute",
            json!({"server_name": "ftp", "tool_name": "ftp_get"}),
        ),
    )
    .await;
    assert_eq!(body["result"]["error"], "Could not connect to MCP server: ftp");

    let (status, body) = call_json(
        app.clone(),
        post("/mcp/execute", json!({"server_name": "git", "tool_name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Validation error"));

    let (_, body) = call_json(app.clone(), get("/mcp/capabilities/http")).await;
    assert_eq!(body["capabilities"], json!(["http_get", "http_post", "http_put"]));

    let (_, body) = call_json(app, get("/mcp/capabilities/ftp")).await;
    assert_eq!(body["capabilities"], json!([]));
}
