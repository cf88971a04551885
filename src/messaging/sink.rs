use crate::types::constants::DEFAULT_NOTIFICATION_ROUTE;
use crate::types::{NotificationEvent, NotificationLevel};

/// Platform-level desktop notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopNotification {
    pub title: String,
    pub body: String,
    /// Lets the platform collapse repeated notifications for the same item
    pub tag: String,
    /// Route to navigate to when the notification is clicked
    pub click_target: String,
}

impl DesktopNotification {
    pub fn from_event(event: &NotificationEvent) -> Self {
        Self {
            title: event.title.clone(),
            body: event.content.clone(),
            tag: format!("notification-{}", event.id),
            click_target: event
                .link_url
                .clone()
                .unwrap_or_else(|| DEFAULT_NOTIFICATION_ROUTE.to_string()),
        }
    }
}

/// Host-side effects triggered by an incoming notification.
///
/// The unread counter, the query cache and the UI all belong to the host application;
/// the channel only tells it what happened.
pub trait NotificationSink: Send + Sync + 'static {
    fn increment_unread(&self);

    fn invalidate_queries(&self, keys: &[&str]);

    fn show_toast(&self, title: &str, content: &str, level: NotificationLevel);

    fn show_desktop_notification(&self, notification: DesktopNotification);
}

/// Sink that only logs; used when the host does not provide one.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn increment_unread(&self) {
        tracing::debug!("Unread notification count incremented");
    }

    fn invalidate_queries(&self, keys: &[&str]) {
        tracing::debug!(?keys, "Invalidating notification queries");
    }

    fn show_toast(&self, title: &str, content: &str, level: NotificationLevel) {
        tracing::info!(?level, title, content, "Notification");
    }

    fn show_desktop_notification(&self, notification: DesktopNotification) {
        tracing::info!(
            tag = %notification.tag,
            target = %notification.click_target,
            "Desktop notification: {}",
            notification.title
        );
    }
}
