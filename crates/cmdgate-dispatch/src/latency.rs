//! Gateway round-trip estimates used to size the auto-defer delay.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const UNKNOWN: u64 = u64::MAX;

/// Reports the current gateway round-trip latency.
pub trait LatencyProbe: Send + Sync {
    /// Latest round-trip estimate, or `None` before the first heartbeat.
    fn round_trip(&self) -> Option<Duration>;
}

/// Latency estimate shared between the host's heartbeat monitor and the dispatcher.
#[derive(Debug)]
pub struct SharedLatency {
    millis: AtomicU64,
}

impl SharedLatency {
    /// Creates an estimate with no measurement yet.
    pub const fn new() -> Self {
        Self {
            millis: AtomicU64::new(UNKNOWN),
        }
    }

    /// Records a new measurement.
    pub fn record(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(UNKNOWN - 1);
        self.millis.store(millis.min(UNKNOWN - 1), Ordering::Relaxed);
    }

    /// Forgets the current measurement.
    pub fn clear(&self) {
        self.millis.store(UNKNOWN, Ordering::Relaxed);
    }
}

impl Default for SharedLatency {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyProbe for SharedLatency {
    fn round_trip(&self) -> Option<Duration> {
        match self.millis.load(Ordering::Relaxed) {
            UNKNOWN => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }
}
