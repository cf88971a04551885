//! In-memory collaborators for unit tests.

use crate::messaging::{DesktopNotification, NotificationSink};
use crate::transport::{FrameStream, Transport, TransportRequest};
use crate::types::{LiveChannelError, NotificationLevel, Result, SseFrame};
use futures::StreamExt;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer};

enum Script {
    Fail,
    Stall,
    Open(mpsc::UnboundedReceiver<Result<SseFrame>>),
}

/// Transport that replays scripted outcomes; once the script runs out every open fails.
#[derive(Default)]
pub(crate) struct MockTransport {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<(Instant, TransportRequest)>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_failure(&self) {
        self.scripts.lock().unwrap().push_back(Script::Fail);
    }

    /// Queues an open that never completes (server accepts but never answers)
    pub(crate) fn push_stall(&self) {
        self.scripts.lock().unwrap().push_back(Script::Stall);
    }

    /// Queues a stream that stays open until the returned sender is dropped
    pub(crate) fn push_stream(&self) -> mpsc::UnboundedSender<Result<SseFrame>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.scripts.lock().unwrap().push_back(Script::Open(rx));
        tx
    }

    pub(crate) fn opens(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    pub(crate) fn open_times(&self) -> Vec<Instant> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(at, _)| *at)
            .collect()
    }
}

impl Transport for MockTransport {
    fn open(&self, request: TransportRequest) -> BoxFuture<'static, Result<FrameStream>> {
        self.requests.lock().unwrap().push((Instant::now(), request));
        let script = self.scripts.lock().unwrap().pop_front();

        Box::pin(async move {
            match script {
                Some(Script::Open(rx)) => Ok(futures::stream::unfold(rx, |mut rx| async move {
                    rx.recv().await.map(|item| (item, rx))
                })
                .boxed()),
                Some(Script::Stall) => futures::future::pending::<Result<FrameStream>>().await,
                Some(Script::Fail) | None => Err(LiveChannelError::Connection(
                    "connection refused".to_string(),
                )),
            }
        })
    }
}

/// Sink that records every side effect
#[derive(Default)]
pub(crate) struct RecordingSink {
    unread: AtomicUsize,
    invalidated: Mutex<Vec<String>>,
    toasts: Mutex<Vec<(String, String, NotificationLevel)>>,
    desktop: Mutex<Vec<DesktopNotification>>,
}

impl RecordingSink {
    pub(crate) fn unread(&self) -> usize {
        self.unread.load(Ordering::SeqCst)
    }

    pub(crate) fn invalidated(&self) -> Vec<String> {
        self.invalidated.lock().unwrap().clone()
    }

    pub(crate) fn toasts(&self) -> Vec<(String, String, NotificationLevel)> {
        self.toasts.lock().unwrap().clone()
    }

    pub(crate) fn desktop(&self) -> Vec<DesktopNotification> {
        self.desktop.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn increment_unread(&self) {
        self.unread.fetch_add(1, Ordering::SeqCst);
    }

    fn invalidate_queries(&self, keys: &[&str]) {
        self.invalidated
            .lock()
            .unwrap()
            .extend(keys.iter().map(|key| key.to_string()));
    }

    fn show_toast(&self, title: &str, content: &str, level: NotificationLevel) {
        self.toasts
            .lock()
            .unwrap()
            .push((title.to_string(), content.to_string(), level));
    }

    fn show_desktop_notification(&self, notification: DesktopNotification) {
        self.desktop.lock().unwrap().push(notification);
    }
}

/// Layer that records every connection state the channel logs a transition to
#[derive(Clone, Default)]
pub(crate) struct StateRecorder {
    states: Arc<Mutex<Vec<String>>>,
}

impl StateRecorder {
    pub(crate) fn states(&self) -> Vec<String> {
        self.states.lock().unwrap().clone()
    }
}

struct TransitionVisitor(Option<String>);

impl Visit for TransitionVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "to" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for StateRecorder {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = TransitionVisitor(None);
        event.record(&mut visitor);
        if let Some(state) = visitor.0 {
            self.states.lock().unwrap().push(state);
        }
    }
}
