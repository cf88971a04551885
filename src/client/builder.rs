use super::{ChannelConfig, LiveChannel};
use crate::messaging::{NotificationSink, TracingSink};
use crate::session::{PageVisibility, Session};
use crate::transport::{HttpTransport, Transport};
use crate::types::Result;
use std::sync::Arc;

/// Builder for LiveChannel that wires its collaborators and spawns its watchers
pub struct LiveChannelBuilder {
    config: ChannelConfig,
    session: Session,
    visibility: PageVisibility,
    transport: Option<Arc<dyn Transport>>,
    sink: Option<Arc<dyn NotificationSink>>,
    follow_session: bool,
}

impl LiveChannelBuilder {
    /// Create a new builder, validating the configuration
    pub fn new(config: ChannelConfig, session: Session) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            session,
            visibility: PageVisibility::new(),
            transport: None,
            sink: None,
            follow_session: true,
        })
    }

    /// Visibility signal of the page hosting the channel
    pub fn visibility(mut self, visibility: PageVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Transport used to open streams. Defaults to [`HttpTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Receiver of notification side effects. Defaults to [`TracingSink`].
    pub fn sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Whether the channel connects when the session gains a credential and disconnects
    /// when it is revoked. Enabled by default.
    pub fn follow_session(mut self, follow: bool) -> Self {
        self.follow_session = follow;
        self
    }

    /// Build the channel and spawn its background watchers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> LiveChannel {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));

        let channel = LiveChannel::new(
            self.config,
            self.session,
            self.visibility.clone(),
            transport,
            sink,
        );
        channel.spawn_watchers(&self.visibility, self.follow_session);
        channel
    }
}
