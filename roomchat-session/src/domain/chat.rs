use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Sent by the local context (local echo)
    Own,
    /// Received from a peer
    Other,
    /// Presence notice generated locally
    System,
}

/// One line of the session's message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub kind: EntryKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatEntry {
    pub fn new(kind: EntryKind, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(EntryKind::System, text, Utc::now())
    }

    /// `HH:MM` in local time
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string()
    }
}
