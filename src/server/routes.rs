//! HTTP handlers.

use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::convert::Infallible;

use super::{ApiError, AppState};
use crate::error::ChatError;
use crate::models::{Message, Params, Sender};
use crate::stream::StreamChunk;

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Oasiz Chatbot Backend is running!" }))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": crate::VERSION,
        "services": {
            "api": "running",
            "mcp": "available",
        },
    }))
}

pub async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    let tools: Map<String, Value> = state
        .dispatcher
        .registry()
        .list_tools()
        .into_iter()
        .map(|d| (d.name, Value::String(d.description)))
        .collect();
    Json(json!({ "tools": tools }))
}

#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    tool: String,
    #[serde(default)]
    params: HashMap<String, Value>,
}

pub async fn execute_tool(
    State(state): State<AppState>,
    Json(request): Json<ToolRequest>,
) -> Result<Json<Value>, ApiError> {
    if state.dispatcher.registry().get(&request.tool).is_none() {
        return Err(ChatError::UnknownCapability(request.tool).into());
    }

    let envelope = state
        .dispatcher
        .invoke_tool(&request.tool, &params_from_json(request.params))
        .await;

    Ok(Json(json!({ "result": envelope.text(), "tool": request.tool })))
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    sender: Sender,
    text: String,
    session_id: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<SendRequest>,
) -> Json<Message> {
    Json(
        state
            .dispatcher
            .log()
            .append(&request.session_id, request.sender, &request.text),
    )
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    session_id: String,
}

pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<Message>> {
    Json(state.dispatcher.log().session(&query.session_id))
}

#[derive(Debug, Deserialize)]
pub struct AiRequest {
    message: String,
    session_id: String,
}

pub async fn ai_chat(
    State(state): State<AppState>,
    Json(request): Json<AiRequest>,
) -> Json<Value> {
    let envelope = state
        .dispatcher
        .dispatch(&request.session_id, &request.message)
        .await;
    Json(json!({ "response": envelope.text() }))
}

pub async fn ai_stream(
    State(state): State<AppState>,
    Json(request): Json<AiRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = state
        .emitter
        .stream(&request.session_id, &request.message)
        .map(|chunk| Ok::<_, Infallible>(sse_event(chunk)));

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// One event per chunk; multi-line text becomes several `data:` lines
pub(crate) fn sse_event(chunk: StreamChunk) -> Event {
    match chunk {
        // Event fields may not carry a carriage return
        StreamChunk::Text(text) => {
            Event::default().data(text.replace("\r\n", "\n").replace('\r', "\n"))
        }
        StreamChunk::Done => Event::default().data("[DONE]"),
    }
}

pub async fn mcp_servers(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "servers": state.dispatcher.protocol().servers() }))
}

pub async fn mcp_connect(
    State(state): State<AppState>,
    Path(server_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.dispatcher.protocol().connect(&server_name).await {
        Ok(()) => Ok(Json(json!({
            "message": format!("Connected to MCP server: {}", server_name)
        }))),
        Err(_) => Err(ApiError::bad_request(format!(
            "Failed to connect to MCP server: {}",
            server_name
        ))),
    }
}

#[derive(Debug, Deserialize)]
pub struct McpRequest {
    #[serde(default)]
    server_name: String,
    #[serde(default)]
    tool_name: String,
    #[serde(default)]
    params: HashMap<String, Value>,
}

pub async fn mcp_execute(
    State(state): State<AppState>,
    Json(request): Json<McpRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.server_name.trim().is_empty() || request.tool_name.trim().is_empty() {
        return Err(ChatError::Validation(
            "server_name and tool_name are required".to_string(),
        )
        .into());
    }

    let result = state
        .dispatcher
        .execute_protocol(
            &request.server_name,
            &request.tool_name,
            &params_from_json(request.params),
        )
        .await
        .unwrap_or_else(|e| e.to_value());

    Ok(Json(json!({
        "result": result,
        "server": request.server_name,
        "tool": request.tool_name,
    })))
}

pub async fn mcp_capabilities(
    State(state): State<AppState>,
    Path(server_name): Path<String>,
) -> Json<Value> {
    let capabilities = state.dispatcher.protocol().capabilities(&server_name);
    Json(json!({ "server": server_name, "capabilities": capabilities }))
}

/// Flatten JSON parameter values to strings; `null` entries are dropped
pub(crate) fn params_from_json(raw: HashMap<String, Value>) -> Params {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}
