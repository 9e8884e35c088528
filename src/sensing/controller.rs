use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::boundary::{CaptureDevice, ExpressionClassifier};
use super::loop_worker::{detection_loop, DetectionContext};

const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Owns the spawned detection loop and its cancellation token.
pub struct DetectionController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Default for DetectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    /// Spawns the loop on the current Tokio runtime.
    pub fn start<C, D>(&mut self, ctx: DetectionContext<C, D>) -> Result<()>
    where
        C: ExpressionClassifier,
        D: CaptureDevice,
    {
        if self.is_running() {
            bail!("detection already active");
        }

        let runtime = tokio::runtime::Handle::try_current()
            .context("detection needs a running Tokio runtime")?;

        let cancel_token = CancellationToken::new();
        let handle = runtime.spawn(detection_loop(ctx, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Signals the loop to stop and hands back its handle for the caller to await or drop.
    pub fn cancel(&mut self) -> Option<JoinHandle<()>> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
            log_info!("cancellation sent to detection loop");
        }
        self.handle.take()
    }
}
