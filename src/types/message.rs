use serde::{Deserialize, Serialize};

use crate::StreamEvent;
use crate::types::error::Result;

/// A single dispatched Server-Sent Events frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
    /// Last event id in effect when the frame was dispatched
    pub id: Option<String>,
}

impl SseFrame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Severity attached to a notification, used to pick the toast style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum NotificationLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl From<String> for NotificationLevel {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" | "warn" => Self::Warning,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Payload of a `notification` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub level: NotificationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
}

/// Structured event delivered to the channel subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Handshake sent by the server right after the stream opens
    Connected { raw: String },
    Notification(NotificationEvent),
    /// Keep-alive; only meaningful for liveness
    Heartbeat { raw: String },
}

impl InboundEvent {
    /// Decodes a frame into a typed event.
    ///
    /// Returns `Ok(None)` for event names this channel does not handle and an error when a
    /// `notification` payload does not match the expected schema.
    pub fn decode(frame: &SseFrame) -> Result<Option<Self>> {
        let event = match StreamEvent::from_str(&frame.event) {
            StreamEvent::Connected => Self::Connected {
                raw: frame.data.clone(),
            },
            StreamEvent::Notification => Self::Notification(serde_json::from_str(&frame.data)?),
            StreamEvent::Heartbeat => Self::Heartbeat {
                raw: frame.data.clone(),
            },
            StreamEvent::Message | StreamEvent::Custom(_) => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn stream_event(&self) -> StreamEvent {
        match self {
            Self::Connected { .. } => StreamEvent::Connected,
            Self::Notification(_) => StreamEvent::Notification,
            Self::Heartbeat { .. } => StreamEvent::Heartbeat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"id":7,"title":"Build done","content":"Pipeline #12 passed","type":"SYSTEM","level":"success","linkUrl":"/ci/12"}"#;

    #[test]
    fn test_decode_notification() {
        let frame = SseFrame::new("notification", PAYLOAD);
        let event = InboundEvent::decode(&frame).unwrap().unwrap();

        let InboundEvent::Notification(notification) = event else {
            panic!("expected notification, got {:?}", event);
        };
        assert_eq!(notification.id, 7);
        assert_eq!(notification.title, "Build done");
        assert_eq!(notification.kind, "SYSTEM");
        assert_eq!(notification.level, NotificationLevel::Success);
        assert_eq!(notification.link_url.as_deref(), Some("/ci/12"));
    }

    #[test]
    fn test_decode_notification_without_link() {
        let frame = SseFrame::new(
            "notification",
            r#"{"id":1,"title":"t","content":"c","type":"USER","level":"WARNING"}"#,
        );
        let Some(InboundEvent::Notification(notification)) = InboundEvent::decode(&frame).unwrap()
        else {
            panic!("expected notification");
        };
        assert_eq!(notification.link_url, None);
        assert_eq!(notification.level, NotificationLevel::Warning);
    }

    #[test]
    fn test_decode_malformed_notification_is_error() {
        let frame = SseFrame::new("notification", "{not json");
        assert!(InboundEvent::decode(&frame).is_err());

        let missing_title = SseFrame::new("notification", r#"{"id":1,"content":"c","type":"x"}"#);
        assert!(InboundEvent::decode(&missing_title).is_err());
    }

    #[test]
    fn test_decode_heartbeat_and_connected_keep_raw_payload() {
        let heartbeat = SseFrame::new("heartbeat", r#"{"timestamp": 1}"#);
        assert_eq!(
            InboundEvent::decode(&heartbeat).unwrap(),
            Some(InboundEvent::Heartbeat {
                raw: r#"{"timestamp": 1}"#.to_string()
            })
        );

        // Heartbeat payloads are opaque, even when they are not JSON.
        let opaque = SseFrame::new("heartbeat", "ping");
        assert!(matches!(
            InboundEvent::decode(&opaque).unwrap(),
            Some(InboundEvent::Heartbeat { .. })
        ));

        let connected = SseFrame::new("connected", "{}");
        assert_eq!(
            InboundEvent::decode(&connected).unwrap().map(|e| e.stream_event()),
            Some(StreamEvent::Connected)
        );
    }

    #[test]
    fn test_decode_unknown_event_is_ignored() {
        assert_eq!(InboundEvent::decode(&SseFrame::new("message", "hi")).unwrap(), None);
        assert_eq!(InboundEvent::decode(&SseFrame::new("audit", "{}")).unwrap(), None);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        assert_eq!(NotificationLevel::from("critical".to_string()), NotificationLevel::Info);
        assert_eq!(NotificationLevel::from("Error".to_string()), NotificationLevel::Error);
    }
}
