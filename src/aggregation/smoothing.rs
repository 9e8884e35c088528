use crate::emotion::EmotionScores;
use crate::frames::RawFrame;
use crate::snapshot::Snapshot;

use super::composite::compute_composites;
use super::config::AffectConfig;

/// How much of the valid history shapes the scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregationMode {
    /// Only the last `smoothing_window` valid frames
    #[default]
    Trailing,
    /// Every valid frame in the input
    WholeSession,
}

/// Aggregates a frame sequence into a snapshot using the trailing window.
pub fn compute_snapshot(
    frames: &[RawFrame],
    baseline: Option<&EmotionScores>,
    config: &AffectConfig,
) -> Snapshot {
    compute_snapshot_with(frames, baseline, config, AggregationMode::Trailing)
}

pub fn compute_snapshot_with(
    frames: &[RawFrame],
    baseline: Option<&EmotionScores>,
    config: &AffectConfig,
    mode: AggregationMode,
) -> Snapshot {
    let valid: Vec<&RawFrame> = frames
        .iter()
        .filter(|frame| frame.is_valid(config.min_confidence))
        .collect();

    if valid.is_empty() {
        return Snapshot::empty();
    }

    let window = match mode {
        AggregationMode::Trailing => {
            let width = config.smoothing_window.max(1);
            &valid[valid.len().saturating_sub(width)..]
        }
        AggregationMode::WholeSession => &valid[..],
    };

    let averaged = EmotionScores::mean(window.iter().map(|frame| &frame.scores));
    let average_confidence =
        window.iter().map(|frame| frame.detection_confidence).sum::<f64>() / window.len() as f64;

    let scores = match baseline {
        Some(baseline) => apply_calibration(&averaged, baseline, config),
        None => averaged,
    };

    let composites = compute_composites(&scores);

    Snapshot {
        dominant_emotion: Some(scores.dominant()),
        calibrated_scores: scores,
        average_confidence,
        frame_count: valid.len(),
        engagement: composites.engagement,
        stress: composites.stress,
        positivity: composites.positivity,
    }
}

/// Shifts weight away from the candidate's resting neutral expression, then renormalizes.
pub fn apply_calibration(
    scores: &EmotionScores,
    baseline: &EmotionScores,
    config: &AffectConfig,
) -> EmotionScores {
    let mut adjusted = scores.clamped();
    adjusted.neutral = (scores.neutral - baseline.neutral * config.neutral_damping).max(0.0);
    adjusted.happy = (scores.happy + baseline.neutral * config.happy_lift).max(0.0);
    adjusted.clamped().normalized()
}
