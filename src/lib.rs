//! Real-time affect inference for timed interview sessions.
//!
//! A fixed-cadence loop feeds per-frame expression probabilities from an
//! external classifier into a session log and a per-answer buffer. Snapshots
//! are smoothed over a short trailing window, corrected against a neutral
//! baseline taken from the first valid frames, and reduced to engagement,
//! stress and positivity indicators.

pub mod aggregation;
pub mod calibration;
pub mod emotion;
pub mod engine;
pub mod error;
pub mod frames;
pub mod metrics;
pub mod sensing;
pub mod settings;
pub mod snapshot;
pub mod timeline;
mod utils;

pub use aggregation::{compute_snapshot, compute_snapshot_with, AffectConfig, AggregationMode};
pub use calibration::Calibrator;
pub use emotion::{Emotion, EmotionScores};
pub use engine::{AffectEngine, EngineStatus};
pub use error::AffectError;
pub use frames::{FrameStore, RawFrame};
pub use metrics::{MetricsSnapshot, TickMetrics, TickOutcome};
pub use sensing::{
    AffectEvent, AffectObserver, CaptureDevice, ChannelObserver, Detection, ExpressionClassifier,
    NoopObserver, VideoFrame,
};
pub use settings::SettingsStore;
pub use snapshot::{AffectPayload, Snapshot};
pub use timeline::{AnswerSnapshot, Timeline, TimelineAverages};
pub use utils::logging::init_logging;
