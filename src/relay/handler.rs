//! WebSocket connection lifecycle handling

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::envelope::Envelope;

use super::registry::{ConnectionId, OUTBOUND_BUFFER};
use super::state::AppState;

/// Upper bound on a single socket write before the peer is considered dead
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// WebSocket upgrade handler for the `/sync` endpoint
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual relay connection
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let id = state.next_id();

    // The greeting goes out before the connection joins the registry, so
    // no broadcast can reach this client ahead of its welcome frame
    let welcome = Envelope::connected(id);
    if let Ok(json) = welcome.to_json() {
        if socket.send(Message::Text(json)).await.is_err() {
            return; // Client disconnected immediately
        }
    }

    let (sender, mut outbound) = mpsc::channel(OUTBOUND_BUFFER);
    state.registry.add(id, sender);
    debug!(connection = id, "client connected");

    loop {
        tokio::select! {
            // Frames relayed from other connections
            frame = outbound.recv() => {
                match frame {
                    Some(text) => {
                        match tokio::time::timeout(WRITE_TIMEOUT, socket.send(Message::Text(text))).await {
                            Ok(Ok(())) => {}
                            Ok(Err(_)) => break, // Client disconnected
                            Err(_) => {
                                warn!(connection = id, "write timed out, dropping connection");
                                break;
                            }
                        }
                    }
                    // Registry entry was removed (slow consumer or shutdown)
                    None => break,
                }
            }

            // Frames arriving from this client, processed in arrival order
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(msg)) => {
                        if !handle_frame(msg, id, &state, &mut socket).await {
                            break;
                        }
                    }
                    Some(Err(err)) => {
                        debug!(connection = id, error = %err, "socket error");
                        break;
                    }
                    None => break, // Client disconnected
                }
            }
        }
    }

    state.registry.remove(id);
    debug!(connection = id, "client disconnected");
}

/// Handle one inbound frame
/// Returns false if the connection should be closed
async fn handle_frame(
    msg: Message,
    id: ConnectionId,
    state: &AppState,
    socket: &mut WebSocket,
) -> bool {
    match msg {
        Message::Text(text) => {
            match Envelope::decode(&text) {
                Ok(envelope) => {
                    let delivered = state.relay_from(id, &text);
                    debug!(
                        connection = id,
                        kind = %envelope.kind,
                        delivered,
                        "relayed frame"
                    );
                }
                Err(err) => {
                    // Malformed frames are dropped; the connection stays open
                    warn!(connection = id, error = %err, "dropped malformed frame");
                }
            }
            true
        }
        Message::Binary(_) => true, // Ignore binary messages
        Message::Ping(data) => {
            let _ = socket.send(Message::Pong(data)).await;
            true
        }
        Message::Pong(_) => true, // Ignore pong responses
        Message::Close(_) => false, // Client requested close
    }
}
