//! Contracts for the collaborators the engine drives but does not implement:
//! the expression classifier and the camera.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;

use crate::emotion::EmotionScores;

/// A captured video frame as handed from the camera to the classifier.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub captured_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub data: Arc<Vec<u8>>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            captured_at: Utc::now(),
            width,
            height,
            data: Arc::new(data),
        }
    }
}

/// Raw classifier output for a frame where a face was found.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub expressions: EmotionScores,
    pub confidence: f64,
}

/// Face detection + expression classification model.
///
/// `detect` resolving to `Ok(None)` means no face was found. Errors are treated
/// the same way by the engine and never propagated.
pub trait ExpressionClassifier: Send + Sync + 'static {
    fn load(&self) -> impl Future<Output = Result<()>> + Send;

    fn detect(&self, frame: VideoFrame) -> impl Future<Output = Result<Option<Detection>>> + Send;
}

/// Camera or other video surface.
pub trait CaptureDevice: Send + 'static {
    fn acquire(&mut self, surface: &str) -> Result<()>;

    /// Latest frame, or `None` if the device has nothing to offer this tick.
    fn grab(&mut self) -> Option<VideoFrame>;

    fn release(&mut self);
}
