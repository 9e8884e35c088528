use serde::{Deserialize, Serialize};

/// Lifecycle of an engine instance.
///
/// `Uninitialized -> Ready -> Capturing -> Detecting <-> Stopped`, with
/// `Destroyed` reachable from anywhere and final.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum EngineStatus {
    #[default]
    Uninitialized,
    /// Models loaded
    Ready,
    /// Camera held, no detection loop
    Capturing,
    Detecting,
    /// Loop stopped, camera still held, history kept
    Stopped,
    Destroyed,
}

impl EngineStatus {
    pub fn holds_device(&self) -> bool {
        matches!(
            self,
            EngineStatus::Capturing | EngineStatus::Detecting | EngineStatus::Stopped
        )
    }
}
