//! Shared relay state and broadcast fan-out

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::registry::{ConnectionId, ConnectionRegistry};

/// Shared application state for the relay server
pub struct AppState {
    /// All currently-open connections
    pub registry: ConnectionRegistry,

    /// Monotonically increasing connection identity counter
    next_connection_id: AtomicU64,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            next_connection_id: AtomicU64::new(0),
        }
    }

    /// Allocate a fresh identity for an accepted connection
    pub fn next_id(&self) -> ConnectionId {
        self.next_connection_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Forward a frame to every open connection except its origin.
    ///
    /// Delivery is best-effort: a recipient whose queue is full or
    /// closed is removed from the registry, exactly as if it had
    /// disconnected, and the fan-out continues. The frame text is
    /// forwarded verbatim. Returns the number of queued deliveries.
    pub fn relay_from(&self, origin: ConnectionId, frame: &str) -> usize {
        let recipients = self.registry.snapshot();
        let mut delivered = 0;

        for (id, sender) in recipients {
            if id == origin {
                continue;
            }
            match sender.try_send(frame.to_owned()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    // Full queue and closed channel both mean the peer
                    // is no longer usable for sending
                    self.registry.remove(id);
                    debug!(connection = id, "dropped unreachable connection during broadcast");
                }
            }
        }

        delivered
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
