//! Expression categories and their per-frame weights.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven expression categories reported by the classifier.
///
/// The declaration order is the tie-break order used when picking a
/// dominant emotion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Neutral,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Surprised,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Surprised => "surprised",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-negative weights for each expression category.
///
/// Missing categories deserialize as zero so partial classifier maps are accepted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmotionScores {
    pub neutral: f64,
    pub happy: f64,
    pub sad: f64,
    pub angry: f64,
    pub fearful: f64,
    pub disgusted: f64,
    pub surprised: f64,
}

impl EmotionScores {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Neutral => self.neutral,
            Emotion::Happy => self.happy,
            Emotion::Sad => self.sad,
            Emotion::Angry => self.angry,
            Emotion::Fearful => self.fearful,
            Emotion::Disgusted => self.disgusted,
            Emotion::Surprised => self.surprised,
        }
    }

    pub fn set(&mut self, emotion: Emotion, value: f64) {
        let slot = match emotion {
            Emotion::Neutral => &mut self.neutral,
            Emotion::Happy => &mut self.happy,
            Emotion::Sad => &mut self.sad,
            Emotion::Angry => &mut self.angry,
            Emotion::Fearful => &mut self.fearful,
            Emotion::Disgusted => &mut self.disgusted,
            Emotion::Surprised => &mut self.surprised,
        };
        *slot = value;
    }

    pub fn total(&self) -> f64 {
        Emotion::ALL.iter().map(|e| self.get(*e)).sum()
    }

    /// Applies `f` to every category.
    pub fn map(&self, mut f: impl FnMut(Emotion, f64) -> f64) -> Self {
        let mut out = Self::zero();
        for emotion in Emotion::ALL {
            out.set(emotion, f(emotion, self.get(emotion)));
        }
        out
    }

    /// Replaces negative and non-finite weights with zero.
    pub fn clamped(&self) -> Self {
        self.map(|_, value| if value.is_finite() { value.max(0.0) } else { 0.0 })
    }

    /// Scales the weights to sum to 1. An all-zero input stays all-zero.
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total > 0.0 {
            self.map(|_, value| value / total)
        } else {
            *self
        }
    }

    /// Component-wise arithmetic mean. Returns all-zero for an empty input.
    pub fn mean<'a, I>(scores: I) -> Self
    where
        I: IntoIterator<Item = &'a EmotionScores>,
    {
        let mut sum = Self::zero();
        let mut count = 0usize;
        for item in scores {
            for emotion in Emotion::ALL {
                sum.set(emotion, sum.get(emotion) + item.get(emotion));
            }
            count += 1;
        }

        if count == 0 {
            return sum;
        }

        sum.map(|_, value| value / count as f64)
    }

    /// The category with the strictly greatest weight; earlier categories win ties.
    pub fn dominant(&self) -> Emotion {
        let mut best = Emotion::Neutral;
        let mut best_value = self.get(best);
        for emotion in Emotion::ALL.iter().skip(1) {
            let value = self.get(*emotion);
            if value > best_value {
                best = *emotion;
                best_value = value;
            }
        }
        best
    }
}
