use crate::infrastructure::BusError;
use roomchat_core::{CoreError, RoomCode};

/// Errors surfaced by session operations
///
/// Publish failures never appear here: the bus adapter swallows them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid room code: {0}")]
    InvalidFormat(#[from] CoreError),

    #[error("Room {0} not found")]
    RoomNotFound(RoomCode),

    #[error("Local broadcast transport unavailable: {0}")]
    UnsupportedTransport(String),

    #[error("No active channel")]
    NoActiveChannel,
}

impl SessionError {
    pub(crate) fn unsupported(err: BusError) -> Self {
        SessionError::UnsupportedTransport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
