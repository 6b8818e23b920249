//! Engine statistics
//!
//! Process-wide counters mutated during `update()` and readable from any
//! thread through an atomic snapshot, so a diagnostics thread can poll
//! them while the audio-service thread keeps ticking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct StatsCounters {
    buffer_underflow_count: AtomicU64,
    pool_exhaustion_count: AtomicU64,
    decode_error_count: AtomicU64,
}

/// Cloneable, thread-safe view of the engine counters.
#[derive(Debug, Clone, Default)]
pub struct StatsHandle {
    inner: Arc<StatsCounters>,
}

impl StatsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_buffer_underflow(&self) {
        self.inner
            .buffer_underflow_count
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_pool_exhaustion(&self) {
        self.inner
            .pool_exhaustion_count
            .fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_decode_error(&self) {
        self.inner
            .decode_error_count
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough copy of the counters (each counter is read
    /// atomically; the set is not fenced as a group).
    pub fn snapshot(&self) -> SoundStats {
        SoundStats {
            buffer_underflow_count: self.inner.buffer_underflow_count.load(Ordering::Relaxed),
            pool_exhaustion_count: self.inner.pool_exhaustion_count.load(Ordering::Relaxed),
            decode_error_count: self.inner.decode_error_count.load(Ordering::Relaxed),
        }
    }
}

/// Counter snapshot returned by [`StatsHandle::snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoundStats {
    /// Mix steps that found a still-playing instance with no ready buffer
    pub buffer_underflow_count: u64,

    /// Decode-ahead attempts stalled by an empty buffer pool
    pub pool_exhaustion_count: u64,

    /// Instances stopped by a decoder failure during update
    pub decode_error_count: u64,
}
