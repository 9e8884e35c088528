use crate::emotion::EmotionScores;

/// Derived 0-100 indicators computed from calibrated weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Composites {
    pub engagement: u8,
    pub stress: u8,
    pub positivity: u8,
}

pub fn compute_composites(scores: &EmotionScores) -> Composites {
    Composites {
        engagement: to_percent(1.0 - scores.neutral),
        stress: to_percent(scores.angry + scores.fearful + scores.sad + scores.disgusted),
        positivity: to_percent(scores.happy + scores.surprised * 0.5),
    }
}

/// Scales a fraction to a rounded percentage clamped to [0, 100].
fn to_percent(fraction: f64) -> u8 {
    let scaled = (fraction * 100.0).round();
    if !scaled.is_finite() {
        return 0;
    }
    scaled.clamp(0.0, 100.0) as u8
}
