use crate::types::constants::stream_events;
use serde::{Deserialize, Serialize};

/// Type-safe names of the events carried by the notification stream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEvent {
    /// Server handshake after the stream opens
    Connected,

    /// New notification for the current user
    Notification,

    /// Keep-alive
    Heartbeat,

    /// Unnamed SSE frame
    Message,

    /// Any other named event
    Custom(String),
}

impl StreamEvent {
    /// Parse an SSE event name into a StreamEvent
    pub fn from_str(s: &str) -> Self {
        match s {
            stream_events::CONNECTED => Self::Connected,
            stream_events::NOTIFICATION => Self::Notification,
            stream_events::HEARTBEAT => Self::Heartbeat,
            stream_events::MESSAGE | "" => Self::Message,
            _ => Self::Custom(s.to_string()),
        }
    }

    /// Convert event to its wire name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connected => stream_events::CONNECTED,
            Self::Notification => stream_events::NOTIFICATION,
            Self::Heartbeat => stream_events::HEARTBEAT,
            Self::Message => stream_events::MESSAGE,
            Self::Custom(s) => s,
        }
    }
}

impl From<&str> for StreamEvent {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl std::fmt::Display for StreamEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
