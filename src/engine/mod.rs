//! Lifecycle controller and snapshot/timeline API for one interview session.

pub(crate) mod session;
mod state;

pub use state::EngineStatus;

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::aggregation::AffectConfig;
use crate::emotion::EmotionScores;
use crate::error::AffectError;
use crate::metrics::{MetricsSnapshot, TickMetrics};
use crate::sensing::{
    loop_worker::DetectionContext, AffectObserver, CaptureDevice, DetectionController,
    DeviceHandle, ExpressionClassifier,
};
use crate::settings::SettingsStore;
use crate::snapshot::{AffectPayload, Snapshot};
use crate::timeline::{AnswerSnapshot, Timeline, TimelineAverages};
use crate::utils::lock;

use session::SessionCore;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Affect-inference engine for a single session.
///
/// Explicitly constructed and owned by the interview controller. Lifecycle
/// failures are reported as `false` and never abort the interview; after
/// [`AffectEngine::destroy`] every call is a harmless no-op.
pub struct AffectEngine<C: ExpressionClassifier, D: CaptureDevice> {
    config: AffectConfig,
    classifier: Arc<C>,
    device: Arc<Mutex<DeviceHandle<D>>>,
    session: Arc<Mutex<SessionCore>>,
    /// Locked only while `session` is held.
    worker: Mutex<DetectionController>,
    metrics: TickMetrics,
}

impl<C: ExpressionClassifier, D: CaptureDevice> AffectEngine<C, D> {
    pub fn new(classifier: C, device: D, config: AffectConfig) -> Self {
        let config = config.sanitized();
        Self {
            classifier: Arc::new(classifier),
            device: Arc::new(Mutex::new(DeviceHandle::new(device))),
            session: Arc::new(Mutex::new(SessionCore::new(config.clone()))),
            worker: Mutex::new(DetectionController::new()),
            metrics: TickMetrics::new(),
            config,
        }
    }

    pub fn with_settings(classifier: C, device: D, settings: &SettingsStore) -> Self {
        Self::new(classifier, device, settings.affect_config())
    }

    pub fn config(&self) -> &AffectConfig {
        &self.config
    }

    pub fn session_id(&self) -> String {
        self.session().session_id.clone()
    }

    pub fn status(&self) -> EngineStatus {
        self.session().status
    }

    pub fn last_error(&self) -> Option<AffectError> {
        self.session().last_error()
    }

    /// Loads the classifier. `false` means the session should carry on without affect tracking.
    pub async fn load_models(&self) -> bool {
        let status = self.status();
        match status {
            EngineStatus::Uninitialized => {}
            EngineStatus::Destroyed => {
                self.session().fail(AffectError::Destroyed);
                return false;
            }
            _ => return true,
        }

        let result = self.classifier.load().await;

        let mut session = self.session();
        match result {
            Ok(()) => {
                if session.status == EngineStatus::Destroyed {
                    return false;
                }
                if session.status == EngineStatus::Uninitialized {
                    session.set_status(EngineStatus::Ready);
                }
                true
            }
            Err(err) => {
                session.fail(AffectError::model_load(format!("{err:#}")));
                false
            }
        }
    }

    /// Acquires the capture device on `surface`.
    pub fn start_webcam(&self, surface: &str) -> bool {
        let mut session = self.session();
        match session.status {
            EngineStatus::Ready => {}
            status if status.holds_device() => return true,
            EngineStatus::Destroyed => {
                session.fail(AffectError::Destroyed);
                return false;
            }
            state => {
                session.fail(AffectError::InvalidState {
                    operation: "start webcam",
                    state,
                });
                return false;
            }
        }

        let acquired = self.device().acquire(surface);
        match acquired {
            Ok(()) => {
                session.set_status(EngineStatus::Capturing);
                true
            }
            Err(err) => {
                session.fail(AffectError::capture_access(format!("{err:#}")));
                false
            }
        }
    }

    /// Releases the capture device, stopping detection first if it is running.
    pub fn stop_webcam(&self) {
        {
            let mut session = self.session();
            if session.status == EngineStatus::Detecting {
                session.end_run(EngineStatus::Ready);
            } else if session.status.holds_device() {
                session.set_status(EngineStatus::Ready);
            }
            drop(self.worker().cancel());
        }
        self.device().release();
    }

    /// Starts the sampling loop. Idempotent while detecting; refused before the
    /// camera is running or after destroy.
    pub fn start_detection(&self, observer: Arc<dyn AffectObserver>) -> bool {
        let mut session = self.session();
        let previous = session.status;
        match previous {
            EngineStatus::Detecting => return true,
            EngineStatus::Capturing | EngineStatus::Stopped => {}
            EngineStatus::Destroyed => {
                session.fail(AffectError::Destroyed);
                return false;
            }
            state => {
                session.fail(AffectError::InvalidState {
                    operation: "start detection",
                    state,
                });
                return false;
            }
        }

        let ctx = DetectionContext {
            run_id: session.begin_run(),
            config: self.config.clone(),
            classifier: Arc::clone(&self.classifier),
            device: Arc::clone(&self.device),
            session: Arc::clone(&self.session),
            observer,
            metrics: self.metrics.clone(),
        };

        let started = self.worker().start(ctx);
        if let Err(err) = started {
            log_warn!("could not start detection: {err:#}");
            session.end_run(previous);
            return false;
        }
        true
    }

    /// Stops the sampling loop. Frame history is kept.
    pub fn stop_detection(&self) {
        drop(self.halt_detection());
    }

    /// Like [`AffectEngine::stop_detection`], then waits for the loop task to exit.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.halt_detection() {
            if let Err(err) = handle.await {
                log_warn!("detection loop ended abnormally: {err}");
            }
        }
    }

    fn halt_detection(&self) -> Option<JoinHandle<()>> {
        let mut session = self.session();
        if session.status != EngineStatus::Detecting {
            return None;
        }
        session.end_run(EngineStatus::Stopped);
        self.worker().cancel()
    }

    /// Stops everything, releases the camera and drops all history. Final.
    pub fn destroy(&self) {
        {
            let mut session = self.session();
            if session.status == EngineStatus::Destroyed {
                return;
            }
            session.destroy();
            if let Some(handle) = self.worker().cancel() {
                handle.abort();
            }
        }
        self.device().release();
        self.metrics.reset();
        log_info!("affect engine destroyed");
    }

    /// Live snapshot of the current answer. No side effects.
    pub fn get_current_snapshot(&self) -> Snapshot {
        self.session().current_snapshot()
    }

    /// Freezes the current answer's snapshot into the timeline and starts a new answer.
    pub fn capture_answer_snapshot(&self) -> Snapshot {
        self.session().capture_answer()
    }

    /// Captures the answer and returns the downstream record, or `None` when
    /// no valid frame was seen during it.
    pub fn capture_answer_payload(&self) -> Option<AffectPayload> {
        let snapshot = self.capture_answer_snapshot();
        snapshot.has_signal().then(|| snapshot.to_payload())
    }

    /// Snapshot over the whole session log, still limited to the trailing window.
    pub fn get_session_summary(&self) -> Snapshot {
        self.session().session_summary()
    }

    /// Average over every valid frame of the session.
    pub fn get_session_average(&self) -> Snapshot {
        self.session().session_average()
    }

    pub fn get_timeline(&self) -> Timeline {
        self.session().timeline()
    }

    pub fn answer_snapshots(&self) -> Vec<AnswerSnapshot> {
        self.session().answers().to_vec()
    }

    pub fn timeline_averages(&self) -> Option<TimelineAverages> {
        TimelineAverages::from_answers(self.session().answers())
    }

    pub fn baseline(&self) -> Option<EmotionScores> {
        self.session().baseline()
    }

    pub fn is_calibrating(&self) -> bool {
        self.session().is_calibrating()
    }

    /// Valid frames collected toward the baseline so far.
    pub fn calibration_progress(&self) -> usize {
        self.session().calibration_progress()
    }

    pub fn is_active(&self) -> bool {
        self.status() == EngineStatus::Detecting
    }

    /// Frames in the session log.
    pub fn get_frame_count(&self) -> usize {
        self.session().frame_count()
    }

    /// Frames since the last answer boundary.
    pub fn get_answer_frame_count(&self) -> usize {
        self.session().answer_frame_count()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn session(&self) -> MutexGuard<'_, SessionCore> {
        lock(&self.session)
    }

    fn device(&self) -> MutexGuard<'_, DeviceHandle<D>> {
        lock(&self.device)
    }

    fn worker(&self) -> MutexGuard<'_, DetectionController> {
        lock(&self.worker)
    }
}

impl<C: ExpressionClassifier, D: CaptureDevice> Drop for AffectEngine<C, D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
