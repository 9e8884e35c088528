mod store;

pub use store::FrameStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::emotion::EmotionScores;

/// One classifier observation, taken once per scheduler tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawFrame {
    pub timestamp: DateTime<Utc>,
    pub scores: EmotionScores,
    pub detection_confidence: f64,
    pub face_detected: bool,
}

impl RawFrame {
    pub fn detected(timestamp: DateTime<Utc>, scores: EmotionScores, confidence: f64) -> Self {
        let detection_confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            timestamp,
            scores: scores.clamped(),
            detection_confidence,
            face_detected: true,
        }
    }

    /// A tick where the classifier failed or saw nobody.
    pub fn no_face(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            scores: EmotionScores::zero(),
            detection_confidence: 0.0,
            face_detected: false,
        }
    }

    pub fn is_valid(&self, min_confidence: f64) -> bool {
        self.face_detected && self.detection_confidence >= min_confidence
    }
}
