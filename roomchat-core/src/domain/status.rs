use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate connection status of the local session
///
/// Derived from the peer set (see `PresenceTracker::status`), never stored
/// independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// No peers and no join attempt in flight
    #[default]
    Disconnected,
    /// A join/create was issued and no peer signal has arrived yet
    Connecting,
    /// At least one peer is known
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Connected => write!(f, "connected"),
        }
    }
}
