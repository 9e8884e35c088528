mod scores;

pub use scores::{Emotion, EmotionScores};
