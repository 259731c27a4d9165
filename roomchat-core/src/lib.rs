pub mod domain;
pub mod error;

pub use domain::{
    Clock, ConnectionStatus, Frame, FrameKind, ManualClock, PeerId, PeerRecord, PresenceChange,
    PresenceTracker, RoomCode, RoomEntry, RoomRegistry, SystemClock,
};
pub use error::{CoreError, Result};
