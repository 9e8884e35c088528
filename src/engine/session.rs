use chrono::Utc;
use uuid::Uuid;

use crate::aggregation::{compute_snapshot, compute_snapshot_with, AffectConfig, AggregationMode};
use crate::calibration::Calibrator;
use crate::emotion::EmotionScores;
use crate::error::AffectError;
use crate::frames::{FrameStore, RawFrame};
use crate::snapshot::Snapshot;
use crate::timeline::{AnswerSnapshot, Timeline};

use super::state::EngineStatus;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Everything the engine owns for one session, guarded by a single lock.
pub(crate) struct SessionCore {
    pub(crate) session_id: String,
    pub(crate) status: EngineStatus,
    /// Bumped on every detection start and stop so late results from an old run are dropped
    run_id: u64,
    config: AffectConfig,
    store: FrameStore,
    calibrator: Calibrator,
    answers: Vec<AnswerSnapshot>,
    last_error: Option<AffectError>,
}

impl SessionCore {
    pub(crate) fn new(config: AffectConfig) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            status: EngineStatus::Uninitialized,
            run_id: 0,
            calibrator: Calibrator::new(config.calibration_frames, config.min_confidence),
            config,
            store: FrameStore::new(),
            answers: Vec::new(),
            last_error: None,
        }
    }

    pub(crate) fn fail(&mut self, err: AffectError) {
        log_warn!("session {}: {err}", self.session_id);
        self.last_error = Some(err);
    }

    pub(crate) fn last_error(&self) -> Option<AffectError> {
        self.last_error.clone()
    }

    pub(crate) fn set_status(&mut self, status: EngineStatus) {
        if self.status != status {
            log_info!(
                "session {}: {:?} -> {:?}",
                self.session_id,
                self.status,
                status
            );
            self.status = status;
        }
    }

    /// Enters `Detecting` and returns the id the new loop must present when ingesting.
    pub(crate) fn begin_run(&mut self) -> u64 {
        self.run_id += 1;
        self.set_status(EngineStatus::Detecting);
        self.run_id
    }

    /// Leaves `Detecting`; results still in flight for the old run are refused.
    pub(crate) fn end_run(&mut self, next: EngineStatus) {
        self.run_id += 1;
        self.set_status(next);
    }

    /// Appends a frame from detection run `run_id` and recomputes the live snapshot.
    /// Returns `None` when the run is no longer current and the frame was dropped.
    pub(crate) fn ingest(&mut self, run_id: u64, frame: RawFrame) -> Option<Snapshot> {
        if self.status != EngineStatus::Detecting || self.run_id != run_id {
            log_debug!(
                "session {}: dropping frame from stale run {run_id}",
                self.session_id
            );
            return None;
        }

        self.calibrator.observe(&frame);
        self.store.append(frame);
        Some(self.current_snapshot())
    }

    pub(crate) fn current_snapshot(&self) -> Snapshot {
        compute_snapshot(
            self.store.answer_frames(),
            self.calibrator.baseline(),
            &self.config,
        )
    }

    pub(crate) fn capture_answer(&mut self) -> Snapshot {
        if self.status == EngineStatus::Destroyed {
            self.fail(AffectError::Destroyed);
            return Snapshot::empty();
        }

        let snapshot = self.current_snapshot();
        let answer_index = self.answers.len();
        self.answers.push(AnswerSnapshot {
            answer_index,
            captured_at: Utc::now(),
            snapshot: snapshot.clone(),
        });
        let cut = self.store.cut_answer();
        log_info!(
            "session {}: answer {answer_index} captured from {} frames ({} valid), dominant={}",
            self.session_id,
            cut.len(),
            snapshot.frame_count,
            snapshot.dominant_label()
        );
        snapshot
    }

    pub(crate) fn session_summary(&self) -> Snapshot {
        compute_snapshot(
            self.store.session_frames(),
            self.calibrator.baseline(),
            &self.config,
        )
    }

    pub(crate) fn session_average(&self) -> Snapshot {
        compute_snapshot_with(
            self.store.session_frames(),
            self.calibrator.baseline(),
            &self.config,
            AggregationMode::WholeSession,
        )
    }

    pub(crate) fn timeline(&self) -> Timeline {
        Timeline {
            session_id: self.session_id.clone(),
            frames: self.store.session_frames().to_vec(),
            answers: self.answers.clone(),
            summary: self.session_summary(),
            baseline: self.baseline(),
        }
    }

    pub(crate) fn answers(&self) -> &[AnswerSnapshot] {
        &self.answers
    }

    pub(crate) fn baseline(&self) -> Option<EmotionScores> {
        self.calibrator.baseline().copied()
    }

    pub(crate) fn is_calibrating(&self) -> bool {
        self.status == EngineStatus::Detecting && self.calibrator.is_calibrating()
    }

    pub(crate) fn calibration_progress(&self) -> usize {
        self.calibrator.progress()
    }

    pub(crate) fn frame_count(&self) -> usize {
        self.store.session_len()
    }

    pub(crate) fn answer_frame_count(&self) -> usize {
        self.store.answer_len()
    }

    /// Final teardown: history is gone and no run can ingest again.
    pub(crate) fn destroy(&mut self) {
        self.end_run(EngineStatus::Destroyed);
        self.store.clear();
        self.calibrator.reset();
        self.answers.clear();
    }
}
