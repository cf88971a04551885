// Messaging module - Event names, routing and host side effects
pub mod event;
pub mod router;
pub mod sink;

pub use event::StreamEvent;
pub use router::EventRouter;
pub use sink::{DesktopNotification, NotificationSink, TracingSink};
