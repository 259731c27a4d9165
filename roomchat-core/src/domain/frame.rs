use crate::domain::PeerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One protocol frame exchanged over a room's channel
///
/// Serialized as a flat JSON object tagged by `kind`:
///
/// ```json
/// {"kind":"heartbeat","senderId":"user_1700000000000_k3j9x0a1b","timestamp":1700000000000}
/// {"kind":"message","senderId":"user_...","text":"hello","timestamp":"2024-01-01T12:00:00Z"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Frame {
    /// Presence announcement from a context that just opened the channel
    Join {
        #[serde(rename = "senderId")]
        sender_id: PeerId,
        /// Unix milliseconds
        timestamp: i64,
    },

    /// One-shot reply to a `join` so the newcomer learns about us
    JoinResponse {
        #[serde(rename = "senderId")]
        sender_id: PeerId,
        timestamp: i64,
    },

    /// Chat message
    Message {
        #[serde(rename = "senderId")]
        sender_id: PeerId,
        text: String,
        /// ISO-8601 send time
        timestamp: DateTime<Utc>,
    },

    /// Explicit departure
    Leave {
        #[serde(rename = "senderId")]
        sender_id: PeerId,
        timestamp: i64,
    },

    /// Periodic liveness beacon
    Heartbeat {
        #[serde(rename = "senderId")]
        sender_id: PeerId,
        timestamp: i64,
    },
}

/// Frame discriminator (for logging and filtering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Join,
    JoinResponse,
    Message,
    Leave,
    Heartbeat,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::Join => "join",
            FrameKind::JoinResponse => "join-response",
            FrameKind::Message => "message",
            FrameKind::Leave => "leave",
            FrameKind::Heartbeat => "heartbeat",
        };
        f.write_str(name)
    }
}

impl Frame {
    pub fn join(sender_id: PeerId) -> Self {
        Frame::Join {
            sender_id,
            timestamp: now_millis(),
        }
    }

    pub fn join_response(sender_id: PeerId) -> Self {
        Frame::JoinResponse {
            sender_id,
            timestamp: now_millis(),
        }
    }

    pub fn message(sender_id: PeerId, text: impl Into<String>) -> Self {
        Frame::Message {
            sender_id,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn leave(sender_id: PeerId) -> Self {
        Frame::Leave {
            sender_id,
            timestamp: now_millis(),
        }
    }

    pub fn heartbeat(sender_id: PeerId) -> Self {
        Frame::Heartbeat {
            sender_id,
            timestamp: now_millis(),
        }
    }

    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Join { .. } => FrameKind::Join,
            Frame::JoinResponse { .. } => FrameKind::JoinResponse,
            Frame::Message { .. } => FrameKind::Message,
            Frame::Leave { .. } => FrameKind::Leave,
            Frame::Heartbeat { .. } => FrameKind::Heartbeat,
        }
    }

    pub fn sender_id(&self) -> &PeerId {
        match self {
            Frame::Join { sender_id, .. }
            | Frame::JoinResponse { sender_id, .. }
            | Frame::Message { sender_id, .. }
            | Frame::Leave { sender_id, .. }
            | Frame::Heartbeat { sender_id, .. } => sender_id,
        }
    }

    /// Whether this frame proves its sender is still active
    pub fn is_liveness_signal(&self) -> bool {
        !matches!(self, Frame::Leave { .. })
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
