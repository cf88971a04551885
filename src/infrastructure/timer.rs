use crate::types::constants::{MAX_RECONNECT_DELAY_MS, RECONNECT_JITTER_MS};
use rand::Rng;
use std::time::Duration;

/// Reconnect delay policy: exponential backoff with a cap and random jitter
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    jitter_ms: u64,
}

impl Backoff {
    pub fn new(base_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms: MAX_RECONNECT_DELAY_MS,
            jitter_ms: RECONNECT_JITTER_MS,
        }
    }

    /// Exponential part of the delay: `min(base * 2^attempt, max)`
    pub fn capped_delay_ms(&self, attempt: u32) -> u64 {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        self.base_ms.saturating_mul(factor).min(self.max_ms)
    }

    /// Delay for a given jitter value (clamped below the jitter bound)
    pub fn delay_with_jitter(&self, attempt: u32, jitter_ms: u64) -> Duration {
        let jitter_ms = jitter_ms.min(self.jitter_ms.saturating_sub(1));
        Duration::from_millis(self.capped_delay_ms(attempt) + jitter_ms)
    }

    /// Delay before the reconnect that follows failure number `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = if self.jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..self.jitter_ms)
        };
        self.delay_with_jitter(attempt, jitter_ms)
    }
}
