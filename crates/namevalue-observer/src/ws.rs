//! `WebSocket` handler for the live leaderboard stream.
//!
//! Clients connect to `GET /ws/leaderboard`, immediately receive the
//! current [`LeaderboardView`], then a fresh view after every state change.
//! A client that falls behind skips straight to the newest view.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use namevalue_ledger::LeaderboardView;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` leaderboard stream.
///
/// # Route
///
/// `GET /ws/leaderboard`
pub async fn ws_leaderboard(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Serialize a view into a text frame.
fn frame(view: &LeaderboardView) -> Option<Message> {
    match serde_json::to_string(view) {
        Ok(json) => Some(Message::Text(json.into())),
        Err(e) => {
            warn!(error = %e, "failed to serialize leaderboard view");
            None
        }
    }
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before reading so no change between the two is lost.
    let mut rx = state.subscribe();
    let initial = state.dispatcher.leaderboard().await;
    if let Some(msg) = frame(&initial)
        && socket.send(msg).await.is_err()
    {
        debug!("WebSocket client disconnected before first frame");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(view) => {
                        let Some(msg) = frame(&view) else { continue };
                        if socket.send(msg).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(RecvError::Closed) => {
                        debug!("leaderboard channel closed, shutting down WebSocket");
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
                        debug!(error = %e, "WebSocket error");
                        return;
                    }
                    _ => {}
                }
            }
        }
    }
}
