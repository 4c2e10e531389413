//! `ReportHealth`: the bidirectional heartbeat stream.
//!
//! One inbound JSON heartbeat per message, one JSON ack per message. A
//! failure applying a single heartbeat sends an error ack and keeps the
//! stream open; only the client closing the socket (or a protocol error)
//! ends it.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use tracing::{debug, warn};

use crate::handlers::{apply_heartbeat, heartbeat_input};
use crate::state::AppState;
use crate::wire::{AckStatus, HeartbeatAck, HeartbeatMessage};

/// `GET /rpc/report-health`, upgraded to a WebSocket.
pub async fn report_health(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    loop {
        let Some(next) = socket.recv().await else {
            debug!("report-health stream closed by peer");
            break;
        };

        let message = match next {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "report-health stream error");
                break;
            }
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => {
                debug!("report-health stream received close frame");
                break;
            }
            _ => continue,
        };

        let ack = match serde_json::from_str::<HeartbeatMessage>(&text) {
            Ok(heartbeat) => {
                let agent_id = heartbeat.agent_id.clone();
                match apply_heartbeat(&state, heartbeat_input(&heartbeat), &agent_id).await {
                    Ok(()) => HeartbeatAck {
                        agent_id,
                        status: AckStatus::Ok,
                        message: "applied".to_string(),
                    },
                    Err(err) => HeartbeatAck {
                        agent_id,
                        status: AckStatus::Error,
                        message: err.to_string(),
                    },
                }
            }
            Err(err) => HeartbeatAck {
                agent_id: coordinator_primitives::AgentId::new("unknown")
                    .expect("literal id is non-empty"),
                status: AckStatus::Error,
                message: format!("malformed heartbeat payload: {err}"),
            },
        };

        let Ok(payload) = serde_json::to_string(&ack) else {
            warn!("failed to encode heartbeat ack");
            break;
        };
        if socket.send(Message::Text(payload)).await.is_err() {
            debug!("report-health stream write failed, client likely gone");
            break;
        }
    }
}
