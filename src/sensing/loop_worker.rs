use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    aggregation::AffectConfig,
    engine::session::SessionCore,
    error::AffectError,
    frames::RawFrame,
    metrics::{TickMetrics, TickOutcome, TickRecord},
    utils::lock,
};

use super::boundary::{CaptureDevice, ExpressionClassifier};
use super::device::DeviceHandle;
use super::observer::AffectObserver;

// Set to false to silence per-tick logging
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Everything one detection run needs, cloned out of the engine at start.
pub struct DetectionContext<C: ExpressionClassifier, D: CaptureDevice> {
    pub(crate) run_id: u64,
    pub(crate) config: AffectConfig,
    pub(crate) classifier: Arc<C>,
    pub(crate) device: Arc<Mutex<DeviceHandle<D>>>,
    pub(crate) session: Arc<Mutex<SessionCore>>,
    pub(crate) observer: Arc<dyn AffectObserver>,
    pub(crate) metrics: TickMetrics,
}

/// Fixed-cadence sampling loop. Each tick awaits its classifier call before the
/// next tick is taken, so calls never overlap; late ticks are delayed, not bunched.
pub async fn detection_loop<C, D>(ctx: DetectionContext<C, D>, cancel_token: CancellationToken)
where
    C: ExpressionClassifier,
    D: CaptureDevice,
{
    let mut ticker = tokio::time::interval(ctx.config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_info!(
        "detection loop started (run {}, every {}ms)",
        ctx.run_id,
        ctx.config.tick_interval_ms
    );

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("detection loop shutting down (run {})", ctx.run_id);
                break;
            }
            _ = ticker.tick() => {
                run_tick(&ctx, &cancel_token).await;
            }
        }
    }
}

async fn run_tick<C, D>(ctx: &DetectionContext<C, D>, cancel_token: &CancellationToken)
where
    C: ExpressionClassifier,
    D: CaptureDevice,
{
    let timestamp = Utc::now();
    let detect_start = Instant::now();

    let video_frame = lock(&ctx.device).grab();

    let (frame, outcome) = match video_frame {
        None => {
            log_debug!("no video frame available this tick");
            (RawFrame::no_face(timestamp), TickOutcome::NoFace)
        }
        Some(video_frame) => {
            let detection = tokio::time::timeout(
                ctx.config.detect_timeout(),
                ctx.classifier.detect(video_frame),
            );

            let result = tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    log_debug!("in-flight detection abandoned (run {})", ctx.run_id);
                    return;
                }
                result = detection => result,
            };

            match result {
                Ok(Ok(Some(detection))) => (
                    RawFrame::detected(timestamp, detection.expressions, detection.confidence),
                    TickOutcome::Detected,
                ),
                Ok(Ok(None)) => (RawFrame::no_face(timestamp), TickOutcome::NoFace),
                Ok(Err(err)) => {
                    log_warn!("{}", AffectError::detection(format!("{err:#}")));
                    (RawFrame::no_face(timestamp), TickOutcome::Failed)
                }
                Err(_) => {
                    log_warn!("{}", AffectError::DetectionTimeout(ctx.config.detect_timeout_ms));
                    (RawFrame::no_face(timestamp), TickOutcome::TimedOut)
                }
            }
        }
    };

    let detect_ms = detect_start.elapsed().as_millis() as u64;
    let face_detected = frame.face_detected;

    let snapshot = lock(&ctx.session).ingest(ctx.run_id, frame);

    ctx.metrics.record(TickRecord {
        timestamp,
        outcome: if snapshot.is_some() {
            outcome
        } else {
            TickOutcome::Discarded
        },
        detect_ms,
    });

    let Some(snapshot) = snapshot else {
        return;
    };

    if face_detected {
        log_debug!(
            "tick: dominant={} engagement={} stress={} positivity={} ({}ms)",
            snapshot.dominant_label(),
            snapshot.engagement,
            snapshot.stress,
            snapshot.positivity,
            detect_ms
        );
        ctx.observer.on_face_change(true);
        ctx.observer.on_update(&snapshot);
    } else {
        ctx.observer.on_face_change(false);
    }
}
