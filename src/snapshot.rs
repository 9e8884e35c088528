//! Derived affect views and the record handed to downstream scoring.

use serde::{Deserialize, Serialize};

use crate::emotion::{Emotion, EmotionScores};

pub const UNKNOWN_LABEL: &str = "unknown";

/// Aggregated affect over a window of frames. Recomputed on demand, never stored as history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// `None` when no valid frame was available; serialized as `"unknown"`
    #[serde(with = "dominant_label")]
    pub dominant_emotion: Option<Emotion>,
    pub calibrated_scores: EmotionScores,
    pub average_confidence: f64,
    pub frame_count: usize,
    pub engagement: u8,
    pub stress: u8,
    pub positivity: u8,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl Snapshot {
    pub fn empty() -> Self {
        Self {
            dominant_emotion: None,
            calibrated_scores: EmotionScores::zero(),
            average_confidence: 0.0,
            frame_count: 0,
            engagement: 0,
            stress: 0,
            positivity: 0,
        }
    }

    pub fn dominant_label(&self) -> &'static str {
        self.dominant_emotion
            .map(|emotion| emotion.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn has_signal(&self) -> bool {
        self.frame_count > 0
    }

    pub fn to_payload(&self) -> AffectPayload {
        AffectPayload::from(self)
    }
}

mod dominant_label {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    use super::UNKNOWN_LABEL;
    use crate::emotion::Emotion;

    pub fn serialize<S>(value: &Option<Emotion>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map(|emotion| emotion.as_str()).unwrap_or(UNKNOWN_LABEL))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Emotion>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = String::deserialize(deserializer)?;
        if label == UNKNOWN_LABEL {
            return Ok(None);
        }
        Emotion::ALL
            .into_iter()
            .find(|emotion| emotion.as_str() == label)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unrecognized emotion label `{label}`")))
    }
}

/// Plain per-answer record consumed by the external scoring service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AffectPayload {
    pub dominant: String,
    pub scores: EmotionScores,
    pub confidence: f64,
    pub engagement: u8,
    pub stress: u8,
    pub positivity: u8,
    pub frame_count: usize,
}

impl From<&Snapshot> for AffectPayload {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            dominant: snapshot.dominant_label().to_string(),
            scores: snapshot.calibrated_scores,
            confidence: snapshot.average_confidence,
            engagement: snapshot.engagement,
            stress: snapshot.stress,
            positivity: snapshot.positivity,
            frame_count: snapshot.frame_count,
        }
    }
}
