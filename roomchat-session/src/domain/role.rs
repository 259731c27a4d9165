use serde::{Deserialize, Serialize};
use std::fmt;

/// How the local context entered its room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Created the room
    Initiator,
    /// Joined by code
    Joiner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => write!(f, "initiator"),
            Role::Joiner => write!(f, "joiner"),
        }
    }
}
