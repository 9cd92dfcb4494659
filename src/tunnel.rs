//! Push-channel seam between the engine and connected clients
//!
//! The engine never talks to the network directly. Every participant is
//! reachable through a tunnel looked up by id, and a missing tunnel simply
//! means that participant is currently disconnected. Implementations may
//! use WebSockets, Server-Sent Events, or anything else that can push
//! messages to a client.

use crate::session::{SyncMessage, UpdateMessage};

/// Trait for pushing messages to one connected client
pub trait Tunnel {
    /// Sends a delta notifying the client of a change to its view
    fn send(&self, message: &UpdateMessage);

    /// Sends a full-state synchronization message
    ///
    /// Sync messages are sent when a client connects or reconnects so it
    /// can rebuild its view from scratch.
    fn send_sync(&self, message: &SyncMessage);

    /// Closes the channel
    ///
    /// Called when the session ends or the participant is removed; the
    /// client should treat the closure like a vanished session and return
    /// to a join-capable state.
    fn close(self);
}
