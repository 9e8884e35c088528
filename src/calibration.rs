//! Neutral-baseline calibration.
//!
//! The first `calibration_frames` valid frames of a session are averaged into
//! a baseline. The baseline is computed once and never revisited.

use crate::emotion::EmotionScores;
use crate::frames::RawFrame;

const ENABLE_LOGS: bool = true;

use crate::log_info;

#[derive(Debug)]
pub struct Calibrator {
    target_frames: usize,
    min_confidence: f64,
    collected: Vec<EmotionScores>,
    baseline: Option<EmotionScores>,
}

impl Calibrator {
    pub fn new(target_frames: usize, min_confidence: f64) -> Self {
        Self {
            target_frames,
            min_confidence,
            collected: Vec::with_capacity(target_frames),
            baseline: None,
        }
    }

    /// Feeds one ingested frame. Returns the baseline on the call that completes it.
    pub fn observe(&mut self, frame: &RawFrame) -> Option<EmotionScores> {
        if self.baseline.is_some() || !frame.is_valid(self.min_confidence) {
            return None;
        }

        self.collected.push(frame.scores);
        if self.collected.len() < self.target_frames {
            return None;
        }

        let baseline = EmotionScores::mean(&self.collected);
        self.collected = Vec::new();
        self.baseline = Some(baseline);
        log_info!(
            "calibration complete after {} valid frames (baseline neutral={:.3})",
            self.target_frames,
            baseline.neutral
        );
        Some(baseline)
    }

    pub fn is_calibrating(&self) -> bool {
        self.baseline.is_none()
    }

    pub fn baseline(&self) -> Option<&EmotionScores> {
        self.baseline.as_ref()
    }

    pub fn progress(&self) -> usize {
        if self.baseline.is_some() {
            self.target_frames
        } else {
            self.collected.len()
        }
    }

    pub fn reset(&mut self) {
        self.collected.clear();
        self.baseline = None;
    }
}
