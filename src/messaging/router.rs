use super::sink::{DesktopNotification, NotificationSink};
use crate::session::PageVisibility;
use crate::types::constants::NOTIFICATION_QUERY_KEYS;
use crate::types::{InboundEvent, NotificationEvent, SseFrame};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};

/// Routes incoming frames to the notification sink and the channel subscriber
pub struct EventRouter {
    sink: Arc<dyn NotificationSink>,
    visibility: PageVisibility,
    subscriber: RwLock<Option<mpsc::Sender<InboundEvent>>>,
}

impl EventRouter {
    pub fn new(sink: Arc<dyn NotificationSink>, visibility: PageVisibility) -> Self {
        Self {
            sink,
            visibility,
            subscriber: RwLock::new(None),
        }
    }

    /// Installs the single subscriber, replacing any previous one
    pub async fn set_subscriber(&self, sender: mpsc::Sender<InboundEvent>) {
        let previous = self.subscriber.write().await.replace(sender);
        if previous.is_some() {
            tracing::debug!("Replacing existing live update subscriber");
        }
    }

    /// Decodes a frame and delivers it. Malformed payloads are dropped.
    pub async fn route(&self, frame: SseFrame) {
        let event = match InboundEvent::decode(&frame) {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::debug!("Ignoring unhandled stream event '{}'", frame.event);
                return;
            }
            Err(e) => {
                tracing::warn!(
                    "Dropping malformed '{}' payload: {} - Raw: {}",
                    frame.event,
                    e,
                    frame.data
                );
                return;
            }
        };

        match &event {
            InboundEvent::Notification(notification) => self.handle_notification(notification),
            InboundEvent::Heartbeat { raw } => tracing::debug!("Heartbeat: {}", raw),
            InboundEvent::Connected { raw } => tracing::info!("Server acknowledged stream: {}", raw),
        }

        self.forward(event).await;
    }

    fn handle_notification(&self, notification: &NotificationEvent) {
        tracing::info!(
            id = notification.id,
            kind = %notification.kind,
            "Received notification"
        );

        self.sink.increment_unread();
        self.sink.invalidate_queries(&NOTIFICATION_QUERY_KEYS);
        self.sink
            .show_toast(&notification.title, &notification.content, notification.level);

        if !self.visibility.is_visible() {
            self.sink
                .show_desktop_notification(DesktopNotification::from_event(notification));
        }
    }

    /// Never waits on the subscriber: a full queue drops the event so the stream keeps
    /// being read and the sink keeps receiving notifications.
    async fn forward(&self, event: InboundEvent) {
        let Some(sender) = self.subscriber.read().await.clone() else {
            return;
        };

        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    event = %event.stream_event(),
                    "Live update subscriber is not keeping up, dropping event"
                );
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Live update subscriber dropped its receiver");
                let mut subscriber = self.subscriber.write().await;
                if subscriber
                    .as_ref()
                    .is_some_and(|current| current.same_channel(&sender))
                {
                    *subscriber = None;
                }
            }
        }
    }
}
