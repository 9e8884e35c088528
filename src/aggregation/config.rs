use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable thresholds for ingestion, calibration and smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffectConfig {
    /// Frames below this detection confidence are ignored by every aggregate
    pub min_confidence: f64,

    /// Valid frames averaged into the neutral baseline
    pub calibration_frames: usize,

    /// Trailing valid frames averaged into each snapshot
    pub smoothing_window: usize,

    /// Scheduler cadence
    pub tick_interval_ms: u64,

    /// Classifier calls slower than this count as a failed frame
    pub detect_timeout_ms: u64,

    /// Baseline correction weights
    pub neutral_damping: f64,
    pub happy_lift: f64,
}

impl Default for AffectConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            calibration_frames: 10,
            smoothing_window: 5,
            tick_interval_ms: 500,
            detect_timeout_ms: 2_000,
            neutral_damping: 0.3,
            happy_lift: 0.05,
        }
    }
}

impl AffectConfig {
    /// Pulls out-of-range values back to something the engine can run with.
    pub fn sanitized(mut self) -> Self {
        self.min_confidence = if self.min_confidence.is_finite() {
            self.min_confidence.clamp(0.0, 1.0)
        } else {
            Self::default().min_confidence
        };
        self.calibration_frames = self.calibration_frames.max(1);
        self.smoothing_window = self.smoothing_window.max(1);
        self.tick_interval_ms = self.tick_interval_ms.max(1);
        self.detect_timeout_ms = self.detect_timeout_ms.max(1);
        if !self.neutral_damping.is_finite() {
            self.neutral_damping = Self::default().neutral_damping;
        }
        if !self.happy_lift.is_finite() {
            self.happy_lift = Self::default().happy_lift;
        }
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn detect_timeout(&self) -> Duration {
        Duration::from_millis(self.detect_timeout_ms)
    }
}
