use crate::engine::EngineStatus;

/// Failure kinds surfaced by the engine. None of them is fatal to an interview.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AffectError {
    #[error("expression model failed to load: {0}")]
    ModelLoadFailure(String),

    #[error("capture device unavailable: {0}")]
    CaptureAccessFailure(String),

    #[error("frame detection failed: {0}")]
    PerFrameDetectionFailure(String),

    #[error("frame detection timed out after {0}ms")]
    DetectionTimeout(u64),

    #[error("engine has been destroyed")]
    Destroyed,

    #[error("cannot {operation} while {state:?}")]
    InvalidState {
        operation: &'static str,
        state: EngineStatus,
    },
}

impl AffectError {
    pub fn model_load(err: impl std::fmt::Display) -> Self {
        Self::ModelLoadFailure(err.to_string())
    }

    pub fn capture_access(err: impl std::fmt::Display) -> Self {
        Self::CaptureAccessFailure(err.to_string())
    }

    pub fn detection(err: impl std::fmt::Display) -> Self {
        Self::PerFrameDetectionFailure(err.to_string())
    }
}
