//! # Live Update Channel
//!
//! Server-Sent Events client that keeps an admin console's live notification stream open.
//!
//! A [`LiveChannel`] holds at most one stream connection, reconnects after failures with
//! capped exponential backoff and jitter, gives up after a bounded number of attempts, and
//! hands decoded events to a [`NotificationSink`] (unread counter, toasts, desktop
//! notifications) and to a single subscriber.
//!
//! ## Example
//!
//! ```no_run
//! use live_update_channel::{ChannelConfig, LiveChannel, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let session = Session::with_token("user-token");
//!     let channel = LiveChannel::builder(
//!         ChannelConfig::notifications("https://console.example.com/api"),
//!         session.clone(),
//!     )?
//!     .build();
//!
//!     let mut events = channel.subscribe().await;
//!     if let Some(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!
//!     session.revoke();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{ChannelConfig, ConnectionState, LiveChannel, LiveChannelBuilder};
pub use messaging::{DesktopNotification, NotificationSink, StreamEvent, TracingSink};
pub use session::{PageVisibility, Session};
pub use transport::{FrameStream, HttpTransport, Transport, TransportRequest};
pub use types::{
    InboundEvent, LiveChannelError, NotificationEvent, NotificationLevel, Result, SseFrame,
};
