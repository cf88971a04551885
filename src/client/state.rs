use crate::types::LiveChannelError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Mutable state of a LiveChannel, serialized behind one lock
#[derive(Default)]
pub struct ChannelInner {
    /// Epoch of the current transport; callbacks from older epochs are ignored
    pub generation: u64,

    /// Consecutive failed attempts since the last successful open
    pub reconnect_attempts: u32,

    pub last_error: Option<Arc<LiveChannelError>>,

    /// Resume point for the next connection
    pub last_event_id: Option<String>,

    /// Task reading the current transport
    pub transport_task: Option<JoinHandle<()>>,

    /// Pending (re)connect timer
    pub reconnect_timer: Option<JoinHandle<()>>,
}

impl ChannelInner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new epoch and returns its id
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Cancels the pending reconnect timer. Returns true if one was pending.
    pub fn cancel_reconnect_timer(&mut self) -> bool {
        match self.reconnect_timer.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }

    /// Closes the current transport. Returns true if one was live.
    pub fn abort_transport(&mut self) -> bool {
        match self.transport_task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for ChannelInner {
    fn drop(&mut self) {
        self.cancel_reconnect_timer();
        self.abort_transport();
    }
}
