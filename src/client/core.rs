use super::{ChannelConfig, ChannelInner, ConnectionState, LiveChannelBuilder};
use crate::infrastructure::{Backoff, LivenessMonitor, TaskManager};
use crate::messaging::{EventRouter, NotificationSink};
use crate::session::{PageVisibility, Session};
use crate::transport::{Transport, TransportRequest, build_stream_url};
use crate::types::constants::{EVENT_BUFFER_SIZE, RECONNECT_SETTLE_DELAY_MS};
use crate::types::{InboundEvent, LiveChannelError, Result, SseFrame};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::time;

pub(crate) struct Shared {
    config: ChannelConfig,
    session: Session,
    transport: Arc<dyn Transport>,
    router: EventRouter,
    backoff: Backoff,
    liveness: LivenessMonitor,
    status_tx: watch::Sender<ConnectionState>,
    inner: Mutex<ChannelInner>,
    watchers: std::sync::Mutex<TaskManager>,
}

impl Shared {
    fn lock_watchers(&self) -> std::sync::MutexGuard<'_, TaskManager> {
        self.watchers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A live update channel: one server push connection that recovers on its own.
///
/// `LiveChannel` owns the transport task and the reconnect timer. It reconnects after
/// transport failures with exponential backoff and jitter, gives up after
/// `max_reconnect_attempts` consecutive failures, and delivers decoded events to the
/// notification sink and to its subscriber. Cloning yields another handle to the same
/// channel.
///
/// No operation reports transport failures to the caller; they show up in
/// [`status()`](Self::status) and [`last_error()`](Self::last_error).
///
/// # Example
///
/// ```no_run
/// use live_update_channel::{ChannelConfig, LiveChannel, Session};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = Session::with_token("user-token");
/// let channel = LiveChannel::builder(ChannelConfig::from_env(), session)?.build();
///
/// let mut events = channel.subscribe().await;
/// while let Some(event) = events.recv().await {
///     println!("{:?}", event);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LiveChannel {
    shared: Arc<Shared>,
}

impl LiveChannel {
    /// Starts building a channel for `config`, authenticated by `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (see [`ChannelConfig::validate`]).
    pub fn builder(config: ChannelConfig, session: Session) -> Result<LiveChannelBuilder> {
        LiveChannelBuilder::new(config, session)
    }

    pub(crate) fn new(
        config: ChannelConfig,
        session: Session,
        visibility: PageVisibility,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (status_tx, _status_rx) = watch::channel(ConnectionState::Disconnected);
        let backoff = Backoff::new(config.base_reconnect_delay_ms);
        let liveness = LivenessMonitor::new(config.heartbeat_timeout());

        Self {
            shared: Arc::new(Shared {
                config,
                session,
                transport,
                router: EventRouter::new(sink, visibility),
                backoff,
                liveness,
                status_tx,
                inner: Mutex::new(ChannelInner::new()),
                watchers: std::sync::Mutex::new(TaskManager::new()),
            }),
        }
    }

    fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    /// Spawns the tasks that react to visibility and, optionally, credential changes
    pub(crate) fn spawn_watchers(&self, visibility: &PageVisibility, follow_session: bool) {
        let mut watchers = self.shared.lock_watchers();
        watchers.spawn(watch_visibility(self.downgrade(), visibility.subscribe()));
        if follow_session {
            watchers.spawn(watch_session(self.downgrade(), self.shared.session.subscribe()));
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.shared.config
    }

    /// Current connection state
    pub fn status(&self) -> ConnectionState {
        *self.shared.status_tx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    /// Watches connection state transitions
    pub fn watch_status(&self) -> watch::Receiver<ConnectionState> {
        self.shared.status_tx.subscribe()
    }

    /// Error behind the most recent `Error`/`Disconnected` transition, cleared on open
    pub async fn last_error(&self) -> Option<Arc<LiveChannelError>> {
        self.shared.inner.lock().await.last_error.clone()
    }

    /// Consecutive failed attempts since the last successful open
    pub async fn reconnect_attempts(&self) -> u32 {
        self.shared.inner.lock().await.reconnect_attempts
    }

    /// Registers the channel's single event consumer.
    ///
    /// Events arrive for as long as the channel is connected. Calling this again replaces
    /// the previous receiver, which then stops receiving events.
    pub async fn subscribe(&self) -> mpsc::Receiver<InboundEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        self.shared.router.set_subscriber(tx).await;
        rx
    }

    /// Opens the stream.
    ///
    /// Closes the current transport and cancels any pending reconnect first, so there is
    /// never more than one live connection. Returns as soon as the transport task is
    /// spawned; the outcome arrives through [`status()`](Self::status). Does nothing when the
    /// session has no credential.
    pub async fn connect(&self) {
        let mut inner = self.shared.inner.lock().await;
        self.connect_locked(&mut inner);
    }

    /// Closes the stream and cancels any pending reconnect. Idempotent.
    pub async fn disconnect(&self) {
        let mut inner = self.shared.inner.lock().await;
        self.disconnect_locked(&mut inner);
    }

    /// Disconnects, resets the backoff and connects again after a short settle delay.
    pub async fn reconnect(&self) {
        let mut inner = self.shared.inner.lock().await;
        self.reconnect_locked(&mut inner);
    }

    /// Reacts to the page becoming visible by reviving a channel that gave up
    pub async fn on_visibility_change(&self, visible: bool) {
        if !visible || !self.shared.config.auto_reconnect {
            return;
        }

        let mut inner = self.shared.inner.lock().await;
        if self.status() != ConnectionState::Disconnected || !self.shared.session.has_token() {
            return;
        }
        tracing::info!("Page became visible, reconnecting live updates");
        self.reconnect_locked(&mut inner);
    }

    /// Stops the watchers and disconnects; used when the owning context goes away
    pub async fn shutdown(&self) {
        self.shared.lock_watchers().abort_all();
        self.disconnect().await;
    }

    fn set_state(&self, state: ConnectionState) {
        self.shared.status_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            tracing::debug!(from = %current, to = %state, "Live channel state changed");
            *current = state;
            true
        });
    }

    fn connect_locked(&self, inner: &mut ChannelInner) {
        let Some(token) = self.shared.session.token() else {
            tracing::warn!("No credential available, skipping live update connection");
            return;
        };

        inner.cancel_reconnect_timer();
        if inner.abort_transport() {
            tracing::debug!("Closed previous transport before connecting");
        }
        let generation = inner.next_generation();
        self.set_state(ConnectionState::Connecting);

        let url = match build_stream_url(&self.shared.config.endpoint, &token) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Failed to build stream URL: {}", e);
                inner.last_error = Some(Arc::new(e));
                self.set_state(ConnectionState::Error);
                return;
            }
        };

        tracing::info!("Connecting to {}", self.shared.config.endpoint);
        let request = TransportRequest {
            url,
            last_event_id: inner.last_event_id.clone(),
        };
        inner.transport_task = Some(tokio::spawn(run_transport(
            self.downgrade(),
            generation,
            request,
        )));
    }

    fn disconnect_locked(&self, inner: &mut ChannelInner) {
        let had_timer = inner.cancel_reconnect_timer();
        let had_transport = inner.abort_transport();
        if had_timer || had_transport {
            tracing::info!("Disconnecting live update stream");
        }

        inner.next_generation();
        inner.reconnect_attempts = 0;
        self.set_state(ConnectionState::Disconnected);
    }

    fn reconnect_locked(&self, inner: &mut ChannelInner) {
        tracing::info!("Manual reconnect requested");
        self.disconnect_locked(inner);
        self.spawn_timer(
            inner,
            Duration::from_millis(RECONNECT_SETTLE_DELAY_MS),
            false,
        );
    }

    /// Applies the retry policy after a transport failure
    fn schedule_reconnect_locked(&self, inner: &mut ChannelInner) {
        let config = &self.shared.config;
        let attempts = inner.reconnect_attempts;

        if config.auto_reconnect && attempts < config.max_reconnect_attempts {
            let delay = self.shared.backoff.delay_for(attempts);
            tracing::info!(
                "Reconnect attempt {} scheduled in {}ms",
                attempts + 1,
                delay.as_millis()
            );
            self.spawn_timer(inner, delay, true);
            return;
        }

        if config.auto_reconnect {
            tracing::error!(
                "Reached {} reconnect attempts, live updates unavailable",
                attempts
            );
            inner.last_error = Some(Arc::new(LiveChannelError::ReconnectExhausted(attempts)));
        } else {
            tracing::info!("Auto reconnect disabled, staying disconnected");
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn spawn_timer(&self, inner: &mut ChannelInner, delay: Duration, counts_as_attempt: bool) {
        inner.cancel_reconnect_timer();
        let weak = self.downgrade();
        let generation = inner.generation;

        inner.reconnect_timer = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            if let Some(channel) = LiveChannel::upgrade(&weak) {
                channel.fire_timer(generation, counts_as_attempt).await;
            }
        }));
    }

    async fn fire_timer(&self, generation: u64, counts_as_attempt: bool) {
        let mut inner = self.shared.inner.lock().await;
        if inner.generation != generation {
            tracing::debug!("Ignoring superseded reconnect timer");
            return;
        }

        // This task owns the handle; dropping it does not abort the task.
        inner.reconnect_timer = None;
        if counts_as_attempt {
            inner.reconnect_attempts += 1;
        }
        self.connect_locked(&mut inner);
    }

    /// Returns false when the transport belongs to a superseded generation
    async fn handle_open(&self, generation: u64) -> bool {
        let mut inner = self.shared.inner.lock().await;
        if inner.generation != generation {
            tracing::debug!("Ignoring open from superseded transport");
            return false;
        }

        inner.reconnect_attempts = 0;
        inner.last_error = None;
        self.set_state(ConnectionState::Connected);
        tracing::info!("Live update stream connected");
        true
    }

    async fn handle_frame(&self, generation: u64, frame: SseFrame) -> bool {
        {
            let mut inner = self.shared.inner.lock().await;
            if inner.generation != generation {
                return false;
            }
            if let Some(id) = &frame.id {
                inner.last_event_id = Some(id.clone());
            }
        }

        self.shared.router.route(frame).await;
        true
    }

    async fn handle_transport_error(&self, generation: u64, error: LiveChannelError) {
        let mut inner = self.shared.inner.lock().await;
        if inner.generation != generation {
            tracing::debug!("Ignoring error from superseded transport: {}", error);
            return;
        }

        tracing::error!("Live update transport error: {}", error);
        // Called from the transport task itself, which is about to finish.
        inner.transport_task = None;
        inner.last_error = Some(Arc::new(error));
        self.set_state(ConnectionState::Error);
        self.schedule_reconnect_locked(&mut inner);
    }
}

/// Body of the transport task for one generation
async fn run_transport(weak: Weak<Shared>, generation: u64, request: TransportRequest) {
    let Some((transport, liveness)) = weak
        .upgrade()
        .map(|shared| (Arc::clone(&shared.transport), shared.liveness))
    else {
        return;
    };

    let opened = liveness.open(transport.open(request)).await;
    let Some(channel) = LiveChannel::upgrade(&weak) else {
        return;
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(e) => {
            channel.handle_transport_error(generation, e).await;
            return;
        }
    };
    if !channel.handle_open(generation).await {
        return;
    }
    drop(channel);

    tracing::debug!("Starting read task for generation {}", generation);
    loop {
        let next = liveness.next_frame(&mut stream).await;
        let Some(channel) = LiveChannel::upgrade(&weak) else {
            return;
        };
        match next {
            Ok(Some(frame)) => {
                if !channel.handle_frame(generation, frame).await {
                    return;
                }
            }
            Ok(None) => {
                let error = LiveChannelError::Connection("stream closed by server".to_string());
                channel.handle_transport_error(generation, error).await;
                return;
            }
            Err(e) => {
                channel.handle_transport_error(generation, e).await;
                return;
            }
        }
    }
}

async fn watch_visibility(weak: Weak<Shared>, mut rx: watch::Receiver<bool>) {
    while rx.changed().await.is_ok() {
        let visible = *rx.borrow_and_update();
        let Some(channel) = LiveChannel::upgrade(&weak) else {
            break;
        };
        channel.on_visibility_change(visible).await;
    }
    tracing::debug!("Visibility watcher finished");
}

async fn watch_session(weak: Weak<Shared>, mut rx: watch::Receiver<Option<String>>) {
    // Act on the credential present at startup as well.
    rx.mark_changed();
    while rx.changed().await.is_ok() {
        let has_token = rx.borrow_and_update().is_some();
        let Some(channel) = LiveChannel::upgrade(&weak) else {
            break;
        };
        if has_token {
            tracing::info!("Credential available, connecting live updates");
            channel.connect().await;
        } else {
            channel.disconnect().await;
        }
    }
    tracing::debug!("Session watcher finished");
}
