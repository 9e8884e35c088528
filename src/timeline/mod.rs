mod report;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::emotion::EmotionScores;
use crate::frames::RawFrame;
use crate::snapshot::Snapshot;

/// Snapshot frozen at an answer boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSnapshot {
    pub answer_index: usize,
    pub captured_at: DateTime<Utc>,
    pub snapshot: Snapshot,
}

/// Read-only copy of everything a session produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub session_id: String,
    pub frames: Vec<RawFrame>,
    pub answers: Vec<AnswerSnapshot>,
    pub summary: Snapshot,
    pub baseline: Option<EmotionScores>,
}

impl Timeline {
    pub fn averages(&self) -> Option<TimelineAverages> {
        TimelineAverages::from_answers(&self.answers)
    }
}

/// Means of the per-answer composites across an interview.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineAverages {
    pub answers: usize,
    pub engagement: f64,
    pub stress: f64,
    pub positivity: f64,
}

impl TimelineAverages {
    pub fn from_answers(answers: &[AnswerSnapshot]) -> Option<Self> {
        if answers.is_empty() {
            return None;
        }

        let count = answers.len() as f64;
        let mean = |pick: fn(&Snapshot) -> u8| {
            answers
                .iter()
                .map(|answer| pick(&answer.snapshot) as f64)
                .sum::<f64>()
                / count
        };

        Some(Self {
            answers: answers.len(),
            engagement: mean(|s: &Snapshot| s.engagement),
            stress: mean(|s: &Snapshot| s.stress),
            positivity: mean(|s: &Snapshot| s.positivity),
        })
    }
}
