//! Change notifications emitted after the remote store has confirmed a
//! mutation. Modeled as an explicit broadcast channel so hosts can bridge
//! events into their own notification systems without coupling the engine to
//! any of them.

use tokio::sync::broadcast;

/// Bounded capacity; a slow subscriber lags rather than blocking the engine
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A path was created or its content changed
    Changed(String),
    /// A path was removed
    Deleted(String),
    /// A path moved; carries both endpoints
    Renamed { old: String, new: String },
}

pub(crate) fn channel() -> broadcast::Sender<ChangeEvent> {
    broadcast::channel(EVENT_CHANNEL_CAPACITY).0
}
