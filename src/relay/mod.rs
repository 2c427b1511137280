//! Broadcast relay for storefront change notifications
//!
//! Provides the WebSocket endpoint at `/sync` that forwards every valid
//! client frame to all other connected clients.
//!
//! ## Guarantees
//! - The origin never receives its own broadcast
//! - Frames from one connection are delivered in the order they were sent
//! - Delivery is best-effort: no acknowledgement, retry, or replay
//! - One unreachable client never stalls delivery to the rest

pub mod handler;
pub mod registry;
pub mod state;

// Re-export commonly used items
pub use registry::{ConnectionId, ConnectionRegistry};
pub use state::AppState;
