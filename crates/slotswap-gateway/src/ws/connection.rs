use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use slotswap_core::config::{HANDSHAKE_TIMEOUT_MS, HEARTBEAT_INTERVAL_SECS, MAX_PAYLOAD_BYTES};
use slotswap_core::{ConnId, ProfileId};
use slotswap_protocol::methods::EV_TICK;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::ws::{handshake, message, send};

/// WS connection states — linear progression, no backwards transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnState {
    AwaitingConnect,
    Authenticated { profile_id: ProfileId },
    Closing,
}

impl ConnState {
    pub fn profile(&self) -> Option<&ProfileId> {
        match self {
            ConnState::Authenticated { profile_id } => Some(profile_id),
            _ => None,
        }
    }
}

/// Axum handler — upgrades HTTP to WebSocket at GET /ws.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_PAYLOAD_BYTES)
        .on_upgrade(|socket| run_connection(socket, state))
}

/// Per-connection event loop — lives for the entire WS session.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ConnId::new().to_string();
    info!(conn_id = %conn_id, "new WS connection");

    let (mut tx, mut rx) = socket.split();
    let mut broadcast_rx = state.broadcaster.subscribe();

    // send challenge and enter AwaitingConnect state
    let nonce = handshake::make_nonce();
    if send::text(&mut tx, handshake::challenge_event(&nonce)).await.is_err() {
        return;
    }
    let mut conn_state = ConnState::AwaitingConnect;

    // handshake must complete within 10s
    let deadline =
        tokio::time::Instant::now() + std::time::Duration::from_millis(HANDSHAKE_TIMEOUT_MS);
    let mut handshake_timer = Box::pin(tokio::time::sleep_until(deadline));

    // heartbeat tick after auth
    let mut tick = tokio::time::interval(std::time::Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_PAYLOAD_BYTES {
                            warn!(conn_id, size = text.len(), "payload too large");
                            break;
                        }
                        conn_state = message::handle(
                            &conn_id, text.as_str(), conn_state, &mut tx, &state,
                        ).await;
                        if matches!(conn_state, ConnState::Closing) { break; }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = tx.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(conn_id, error = %e, "WS read error");
                        break;
                    }
                    _ => {}
                }
            }

            notice = broadcast_rx.recv() => {
                match notice {
                    Ok(notice) => {
                        let Some(profile) = conn_state.profile() else { continue };
                        if !notice.audience.includes(profile) {
                            continue;
                        }
                        if send::text(&mut tx, notice.frame.clone()).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(conn_id, skipped, "push events dropped for slow client");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            _ = tick.tick() => {
                if conn_state.profile().is_some() {
                    let seq = state.next_seq();
                    let ev = slotswap_protocol::frames::EventFrame::new(
                        EV_TICK,
                        serde_json::json!({ "ts": chrono::Utc::now().timestamp_millis() }),
                    ).with_seq(seq);
                    if send::json(&mut tx, &ev).await.is_err() {
                        break;
                    }
                }
            }

            _ = &mut handshake_timer, if matches!(conn_state, ConnState::AwaitingConnect) => {
                warn!(conn_id, "handshake timeout");
                break;
            }
        }
    }

    state.ws_clients.remove(&conn_id);
    info!(conn_id, "WS connection closed");
}
