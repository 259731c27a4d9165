mod clock;
mod frame;
mod peer;
mod presence;
mod registry;
mod room_code;
mod status;

pub use clock::{Clock, ManualClock, SystemClock};
pub use frame::{Frame, FrameKind};
pub use peer::PeerId;
pub use presence::{PeerRecord, PresenceChange, PresenceTracker};
pub use registry::{RoomEntry, RoomRegistry};
pub use room_code::RoomCode;
pub use status::ConnectionStatus;
