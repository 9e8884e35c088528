use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a single scheduler tick ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TickOutcome {
    Detected,
    NoFace,
    Failed,
    TimedOut,
    /// Result arrived after detection was stopped
    Discarded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickRecord {
    pub timestamp: DateTime<Utc>,
    pub outcome: TickOutcome,
    pub detect_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub tick_count: u64,
    pub detected_count: u64,
    pub no_face_count: u64,
    pub failure_count: u64,
    pub timeout_count: u64,
    pub discarded_count: u64,
    pub recent_ticks: VecDeque<TickRecord>,
}
