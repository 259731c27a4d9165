// Domain layer (session-level value types)
pub mod domain;

// Application layer (orchestration)
pub mod application;

// Infrastructure layer (bus adapters)
pub mod infrastructure;

pub mod error;

// Re-exports for convenience
pub use application::{HeartbeatDriver, JoinPolicy, Session, SessionBuilder, SessionConfig};
#[cfg(feature = "native")]
pub use application::{RuntimeConfig, SessionCommand, SessionRuntime, SessionSnapshot};
pub use domain::{ChatEntry, EntryKind, Role, Screen, SessionEvent};
pub use error::{Result, SessionError};
pub use infrastructure::{BusAdapter, BusChannel, BusError, LocalBus, LocalChannel, MessageBus};
pub use roomchat_core::{ConnectionStatus, PeerId, RoomCode, RoomRegistry};
