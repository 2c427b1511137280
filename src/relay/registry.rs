//! Live connection membership registry
//!
//! Tracks the outbound channel of every open connection. Membership
//! changes only on accept and close events, never on message content.
//! The lock is held for individual add/remove/snapshot operations and
//! never across a send.

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::mpsc;

/// Identity assigned to a connection at accept time, never client-supplied
pub type ConnectionId = u64;

/// Outbound frame queue depth per connection. A client that falls this
/// far behind is treated as unreachable and dropped.
pub const OUTBOUND_BUFFER: usize = 64;

/// Sender half of a connection's outbound frame queue
pub type FrameSender = mpsc::Sender<String>;

/// Set of currently-open connections, keyed by identity
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, FrameSender>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a connection. From this point it is eligible to receive
    /// broadcasts.
    pub fn add(&self, id: ConnectionId, sender: FrameSender) {
        self.connections.write().insert(id, sender);
    }

    /// Remove a connection. Dropping the stored sender closes the
    /// connection's outbound stream, so removal doubles as the
    /// disconnect signal for its socket task.
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.connections.write().remove(&id).is_some()
    }

    /// Remove every connection at once, as on relay shutdown. Each
    /// dropped sender ends its connection's outbound stream.
    pub fn clear(&self) {
        self.connections.write().clear();
    }

    /// Consistent snapshot of current membership for one broadcast
    pub fn snapshot(&self) -> Vec<(ConnectionId, FrameSender)> {
        self.connections
            .read()
            .iter()
            .map(|(id, sender)| (*id, sender.clone()))
            .collect()
    }

    /// Number of open connections
    pub fn len(&self) -> usize {
        self.connections.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.read().is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
