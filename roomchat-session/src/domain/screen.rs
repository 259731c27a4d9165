use serde::{Deserialize, Serialize};
use std::fmt;

/// Which view the presentation layer should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    /// Create/join prompt
    #[default]
    Welcome,
    /// Room created, waiting for the first peer
    RoomCreated,
    /// Chatting
    Chat,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Screen::Welcome => write!(f, "welcome"),
            Screen::RoomCreated => write!(f, "room-created"),
            Screen::Chat => write!(f, "chat"),
        }
    }
}
