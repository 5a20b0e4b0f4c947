//! `WebSocket` handler for real-time view streaming.
//!
//! Clients connect to `GET /ws/view` and receive each [`ViewMessage`] the
//! map session produces as a JSON text frame. A newly connected client
//! first gets the cached latest frame, so it can draw immediately.
//!
//! If a client falls behind, lagged messages are skipped; the next frame
//! carries the full view anyway.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use eventmap_core::Geocoder;
use eventmap_types::ViewMessage;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming view messages.
///
/// # Route
///
/// `GET /ws/view`
pub async fn ws_view<G: Geocoder>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<G>>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize and send one message. Returns `false` once the client is gone.
async fn send_message(socket: &mut WebSocket, message: &ViewMessage) -> bool {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize view message: {e}");
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}

async fn handle_ws<G: Geocoder>(mut socket: WebSocket, state: Arc<AppState<G>>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the cache so no frame falls in between.
    let mut rx = state.feed.subscribe();
    if let Some(frame) = state.feed.latest()
        && !send_message(&mut socket, &ViewMessage::Frame(frame)).await
    {
        debug!("WebSocket client disconnected (initial frame)");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(message) => {
                        if !send_message(&mut socket, &message).await {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("View feed closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    // Commands go through the REST endpoints.
                    _ => {}
                }
            }
        }
    }
}
