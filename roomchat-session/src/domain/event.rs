use crate::domain::{ChatEntry, Screen};
use roomchat_core::ConnectionStatus;
use serde::Serialize;

/// Notifications for the presentation layer
///
/// The session queues these as they happen; callers drain them with
/// `Session::drain_events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    ScreenChanged(Screen),
    MessageReceived(ChatEntry),
    ConnectionStatusChanged(ConnectionStatus),
    /// User-visible, transient notice
    ErrorRaised(String),
}
