//! Client-side sync connector
//!
//! Maintains a persistent connection to the relay and turns inbound
//! envelopes into refetch dispatches against the embedding
//! application's own store.
//!
//! ## Lifecycle
//! `Disconnected -> Connecting -> Connected`, looping back through
//! `Disconnected` with exponential backoff on any close or error.
//! Reconnection retries forever; the relay may restart independently of
//! any one client. The loop only terminates when the application drops
//! every [`SyncHandle`].

pub mod backoff;

pub use backoff::ReconnectBackoff;

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use crate::config::ConnectorConfig;
use crate::envelope::{kind, Envelope};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Outbound queue depth while connected
const OUTBOUND_BUFFER: usize = 32;

/// Connection lifecycle states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorState {
    Disconnected,
    Connecting,
    Connected,
}

/// Client-side classification of refetch triggers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefetchTarget {
    Products,
    Sliders,
    Settings,
}

impl RefetchTarget {
    /// Map an envelope kind to the store data it invalidates
    pub fn from_kind(value: &str) -> Option<Self> {
        match value {
            kind::PRODUCTS_UPDATED => Some(Self::Products),
            kind::SLIDERS_UPDATED => Some(Self::Sliders),
            kind::SETTINGS_UPDATED => Some(Self::Settings),
            _ => None,
        }
    }
}

/// Application-side sink for relay notifications
///
/// `refetch` may be called repeatedly for the same target in quick
/// succession; implementations are expected to make the underlying
/// refetch idempotent rather than rely on exactly-once delivery.
pub trait UpdateListener: Send + Sync {
    fn refetch(&self, target: RefetchTarget, envelope: &Envelope);
}

/// Handle for interacting with a running connector
#[derive(Clone)]
pub struct SyncHandle {
    outbound: mpsc::Sender<Envelope>,
    state_rx: watch::Receiver<ConnectorState>,
}

impl SyncHandle {
    /// Current lifecycle state
    pub fn state(&self) -> ConnectorState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectorState::Connected
    }

    /// Queue an envelope for the relay. Returns false without blocking
    /// when the connector is not connected or the queue is full.
    pub fn send(&self, envelope: Envelope) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.outbound.try_send(envelope).is_ok()
    }

    /// Wait until the connector reaches the given state. Returns false
    /// if the connector task has shut down.
    pub async fn wait_for(&mut self, target: ConnectorState) -> bool {
        self.state_rx.wait_for(|state| *state == target).await.is_ok()
    }
}

/// Connector front door: pair a configuration with the application's
/// update listener, then spawn the run loop
pub struct SyncConnector {
    config: ConnectorConfig,
    listener: Arc<dyn UpdateListener>,
}

impl SyncConnector {
    pub fn new(config: ConnectorConfig, listener: Arc<dyn UpdateListener>) -> Self {
        Self { config, listener }
    }

    /// Spawn the connector task and return a handle to it
    pub fn spawn(self) -> SyncHandle {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER);
        let (state_tx, state_rx) = watch::channel(ConnectorState::Disconnected);

        tokio::spawn(run(self.config, self.listener, outbound_rx, state_tx));

        SyncHandle {
            outbound: outbound_tx,
            state_rx,
        }
    }
}

/// Reconnect loop: dial, drive one session, back off, repeat
async fn run(
    config: ConnectorConfig,
    listener: Arc<dyn UpdateListener>,
    mut outbound: mpsc::Receiver<Envelope>,
    state_tx: watch::Sender<ConnectorState>,
) {
    let mut backoff = ReconnectBackoff::new(config.initial_backoff, config.max_backoff);

    loop {
        let _ = state_tx.send(ConnectorState::Connecting);

        match connect_async(config.endpoint.as_str()).await {
            Ok((stream, _response)) => {
                backoff.reset();
                let _ = state_tx.send(ConnectorState::Connected);
                info!(endpoint = %config.endpoint, "sync connection established");

                session(stream, &listener, &mut outbound).await;
                debug!("sync connection lost");
            }
            Err(err) => {
                // Degrade silently to stale-until-reconnect; never fatal
                debug!(endpoint = %config.endpoint, error = %err, "sync connect failed");
            }
        }

        let _ = state_tx.send(ConnectorState::Disconnected);
        if state_tx.is_closed() {
            return; // Application dropped every handle
        }
        tokio::time::sleep(backoff.next_delay()).await;
    }
}

/// Drive one established connection until it drops
async fn session(
    stream: WsStream,
    listener: &Arc<dyn UpdateListener>,
    outbound: &mut mpsc::Receiver<Envelope>,
) {
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            frame = source.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => handle_envelope(&text, listener),
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(_)) => {} // Ignore binary and pong frames
                    Some(Err(err)) => {
                        debug!(error = %err, "sync socket error");
                        return;
                    }
                }
            }

            envelope = outbound.recv() => {
                match envelope {
                    Some(envelope) => {
                        let json = match envelope.to_json() {
                            Ok(json) => json,
                            Err(err) => {
                                warn!(error = %err, "failed to serialize outbound envelope");
                                continue;
                            }
                        };
                        if sink.send(Message::Text(json)).await.is_err() {
                            return;
                        }
                    }
                    None => return, // Every handle dropped
                }
            }
        }
    }
}

/// Decode an inbound frame and dispatch any refetch trigger it carries
fn handle_envelope(text: &str, listener: &Arc<dyn UpdateListener>) {
    let envelope = match Envelope::decode(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!(error = %err, "ignoring malformed frame");
            return;
        }
    };

    if envelope.kind == kind::CONNECTED {
        debug!("relay greeting received");
        return;
    }

    match RefetchTarget::from_kind(&envelope.kind) {
        Some(target) => listener.refetch(target, &envelope),
        None => {} // Unrecognized kinds are ignored without error
    }
}
