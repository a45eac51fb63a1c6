//! Per-session duplex channel.
//!
//! Each connection is served by one loop, so a session's messages are
//! acknowledged and answered strictly in arrival order.

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::models::{Message, Sender};

/// Frames sent by the client
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    Message { message: String },
}

/// Frames sent by the server
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerFrame {
    MessageSent { message: Message },
    BotResponse { message: Message },
    Error { message: String },
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

async fn handle_socket(mut socket: WebSocket, session_id: String, state: AppState) {
    tracing::info!(session = %session_id, "Client connected");

    while let Some(Ok(frame)) = socket.recv().await {
        let text = match frame {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            _ => continue,
        };

        let message = match serde_json::from_str::<ClientFrame>(&text) {
            Ok(ClientFrame::Message { message }) => message,
            Err(e) => {
                let error = ServerFrame::Error {
                    message: format!("Invalid message: {}", e),
                };
                if send(&mut socket, &error).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let user = state
            .dispatcher
            .log()
            .append(&session_id, Sender::User, &message);
        if send(&mut socket, &ServerFrame::MessageSent { message: user })
            .await
            .is_err()
        {
            break;
        }

        let (_, reply) = state.dispatcher.reply(&session_id, &message).await;
        if send(&mut socket, &ServerFrame::BotResponse { message: reply })
            .await
            .is_err()
        {
            break;
        }
    }

    tracing::info!(session = %session_id, "Client disconnected");
}

async fn send(socket: &mut WebSocket, frame: &ServerFrame) -> Result<(), axum::Error> {
    let json = serde_json::to_string(frame).unwrap_or_default();
    socket.send(WsMessage::Text(json)).await
}
