//! HTTP, server-sent event and WebSocket surfaces.
//!
//! Handlers are thin: they validate the request shape, call the
//! [`Dispatcher`], [`StreamEmitter`] or protocol backend, and serialise the
//! result. Request-shape problems are the only failures reported with a
//! client-error status; capability failures travel inside normal replies.

mod routes;
mod ws;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;
use crate::error::ChatError;
use crate::stream::StreamEmitter;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub emitter: StreamEmitter,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            emitter: StreamEmitter::new(dispatcher.clone()),
            dispatcher,
        }
    }
}

/// Error body in the `{"detail": ...}` shape
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Build the full router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/tools", get(routes::list_tools))
        .route("/tools/execute", post(routes::execute_tool))
        .route("/chat/send", post(routes::send_message))
        .route("/chat/history", get(routes::history))
        .route("/ai/chat", post(routes::ai_chat))
        .route("/ai/stream", post(routes::ai_stream))
        .route("/mcp/servers", get(routes::mcp_servers))
        .route("/mcp/connect/:server_name", post(routes::mcp_connect))
        .route("/mcp/execute", post(routes::mcp_execute))
        .route("/mcp/capabilities/:server_name", get(routes::mcp_capabilities))
        .route("/ws/:session_id", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(dispatcher: Arc<Dispatcher>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(AppState::new(dispatcher));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutting down");
        })
        .await
}
