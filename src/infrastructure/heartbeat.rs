use crate::transport::FrameStream;
use crate::types::{LiveChannelError, Result, SseFrame};
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tokio::time;

/// Detects a silent stream.
///
/// The server sends a heartbeat periodically; when neither a heartbeat nor any other frame
/// arrives within `timeout`, the stream is considered dead even if the socket is still open.
/// The same window bounds how long opening the stream may take.
#[derive(Debug, Clone, Copy, Default)]
pub struct LivenessMonitor {
    timeout: Option<Duration>,
}

impl LivenessMonitor {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Waits for the transport to open the stream
    pub async fn open<F>(&self, open: F) -> Result<FrameStream>
    where
        F: Future<Output = Result<FrameStream>>,
    {
        match self.timeout {
            Some(timeout) => time::timeout(timeout, open)
                .await
                .map_err(|_| LiveChannelError::OpenTimeout(timeout))?,
            None => open.await,
        }
    }

    /// Waits for the next frame. `Ok(None)` means the server closed the stream.
    pub async fn next_frame(&self, stream: &mut FrameStream) -> Result<Option<SseFrame>> {
        let next = match self.timeout {
            Some(timeout) => time::timeout(timeout, stream.next())
                .await
                .map_err(|_| LiveChannelError::HeartbeatTimeout(timeout))?,
            None => stream.next().await,
        };
        next.transpose()
    }
}
