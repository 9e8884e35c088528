//! Plain-text renderings handed to the interview controller's prompts and transcripts.

use std::fmt;

use crate::emotion::Emotion;
use crate::snapshot::Snapshot;

use super::TimelineAverages;

impl Snapshot {
    /// Per-answer block describing the candidate's expression while answering.
    pub fn answer_context(&self) -> String {
        let detail = Emotion::ALL
            .iter()
            .map(|emotion| {
                format!(
                    "{}={:.0}%",
                    emotion,
                    self.calibrated_scores.get(*emotion) * 100.0
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Dominant Emotion: {}\nEngagement Level: {}% | Stress Level: {}% | Positivity: {}%\nDetailed: {}\n",
            self.dominant_label(),
            self.engagement,
            self.stress,
            self.positivity,
            detail
        )
    }
}

impl fmt::Display for TimelineAverages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Emotion Analysis Summary ---")?;
        writeln!(f, "Average Engagement: {:.0}%", self.engagement)?;
        writeln!(f, "Average Stress: {:.0}%", self.stress)?;
        writeln!(f, "Average Positivity: {:.0}%", self.positivity)?;
        writeln!(f, "--- End Emotion Summary ---")
    }
}
