mod types;

pub use types::{MetricsSnapshot, TickOutcome, TickRecord};

use std::sync::{Arc, Mutex, MutexGuard};

const MAX_RECENT_TICKS: usize = 20;

/// Per-session counters for the detection loop.
#[derive(Clone, Default)]
pub struct TickMetrics {
    inner: Arc<Mutex<MetricsSnapshot>>,
}

impl TickMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: TickRecord) {
        let mut state = self.lock();

        state.tick_count += 1;
        match record.outcome {
            TickOutcome::Detected => state.detected_count += 1,
            TickOutcome::NoFace => state.no_face_count += 1,
            TickOutcome::Failed => state.failure_count += 1,
            TickOutcome::TimedOut => state.timeout_count += 1,
            TickOutcome::Discarded => state.discarded_count += 1,
        }

        if state.recent_ticks.len() == MAX_RECENT_TICKS {
            state.recent_ticks.pop_front();
        }
        state.recent_ticks.push_back(record);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock().clone()
    }

    pub fn reset(&self) {
        *self.lock() = MetricsSnapshot::default();
    }

    fn lock(&self) -> MutexGuard<'_, MetricsSnapshot> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
