//! WebSocket stream of casino events
//!
//! `GET /ws` streams every event; `GET /ws?player=<id>` only the settlement
//! events for that player.

use super::handlers::AppState;
use crate::games::events::CasinoEvent;
use crate::games::types::AccountId;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub player: Option<String>,
}

/// GET /ws?player={id}
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
) -> Response {
    let filter = query.player.map(AccountId::new);
    ws.on_upgrade(move |socket| handle_connection(socket, state, filter))
}

/// Whether a client with `filter` should receive `event`
pub fn should_send_event(event: &CasinoEvent, filter: Option<&AccountId>) -> bool {
    match filter {
        None => true,
        Some(player) => event.player() == Some(player),
    }
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>, filter: Option<AccountId>) {
    let client_id = generate_client_id();
    state.metrics.websocket_connected();
    info!(client_id, player = ?filter, "WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.casino.subscribe();

    let welcome = serde_json::json!({
        "type": "connected",
        "client_id": client_id,
        "randomness": state.casino.randomness_kind(),
    });
    if sender.send(Message::Text(welcome.to_string())).await.is_err() {
        warn!(client_id, "Failed to send welcome message");
        state.metrics.websocket_disconnected();
        return;
    }

    // Client messages are ignored apart from close
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(client_id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    let metrics = state.metrics.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(client_id, skipped, "WebSocket client lagging; events dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if !should_send_event(&event, filter.as_ref()) {
                continue;
            }

            let message = match serde_json::to_string(&event) {
                Ok(msg) => Message::Text(msg),
                Err(e) => {
                    error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };
            if sender.send(message).await.is_err() {
                break;
            }
            metrics.record_websocket_message();
        }
    });

    tokio::select! {
        _ = &mut receive_task => send_task.abort(),
        _ = &mut send_task => receive_task.abort(),
    }

    state.metrics.websocket_disconnected();
    info!(client_id, "WebSocket client disconnected");
}

fn generate_client_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
