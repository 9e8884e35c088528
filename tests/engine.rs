mod common;

use std::{
    sync::{atomic::Ordering, Arc},
    time::Duration,
};

use affect_engine::{
    AffectConfig, AffectEngine, AffectError, AffectEvent, ChannelObserver, Emotion, EmotionScores,
    EngineStatus, NoopObserver,
};
use common::*;
use tokio::sync::{mpsc, Notify};

#[tokio::test(start_paused = true)]
async fn happy_frames_before_calibration() {
    let classifier = ScriptedClassifier::new(vec![happy_step(); 4]);
    let (engine, mut rx) = start_engine(classifier, TestCamera::default(), test_config()).await;

    let events = collect_ticks(&mut rx, 4).await;
    let updates = events
        .iter()
        .filter(|event| matches!(event, AffectEvent::Update(_)))
        .count();
    assert_eq!(updates, 4);
    assert!(engine.is_calibrating());

    let snapshot = engine.get_current_snapshot();
    assert_eq!(snapshot.dominant_emotion, Some(Emotion::Happy));
    assert_eq!(snapshot.engagement, 80);
    assert_eq!(snapshot.positivity, 80);
    assert_eq!(snapshot.stress, 0);
    assert_eq!(snapshot.frame_count, 4);

    engine.destroy();
}

#[tokio::test(start_paused = true)]
async fn baseline_shifts_dominant_emotion_to_happy() {
    let mut script = vec![neutral_step(); 10];
    script.push(Step::Face(
        EmotionScores {
            happy: 0.5,
            neutral: 0.5,
            ..Default::default()
        },
        0.9,
    ));
    let (engine, mut rx) =
        start_engine(ScriptedClassifier::new(script), TestCamera::default(), test_config()).await;

    collect_ticks(&mut rx, 10).await;
    assert!(!engine.is_calibrating());
    assert_eq!(engine.baseline().unwrap().neutral, 1.0);

    let calibration_answer = engine.capture_answer_snapshot();
    assert_eq!(calibration_answer.dominant_emotion, Some(Emotion::Neutral));

    collect_ticks(&mut rx, 1).await;
    let snapshot = engine.get_current_snapshot();
    let scores = snapshot.calibrated_scores;
    assert!((scores.neutral - 0.2 / 0.75).abs() < 1e-9);
    assert!((scores.happy - 0.55 / 0.75).abs() < 1e-9);
    assert_eq!(snapshot.dominant_emotion, Some(Emotion::Happy));

    // baseline is set once
    assert_eq!(engine.baseline().unwrap().neutral, 1.0);
    assert_eq!(engine.calibration_progress(), 10);
}

#[tokio::test(start_paused = true)]
async fn failures_and_missing_faces_become_no_face_frames() {
    let script = vec![Step::Fail, Step::NoFace, happy_step()];
    let (engine, mut rx) =
        start_engine(ScriptedClassifier::new(script), TestCamera::default(), test_config()).await;

    let events = collect_ticks(&mut rx, 3).await;
    assert_eq!(events[0], AffectEvent::FaceChange(false));
    assert_eq!(events[1], AffectEvent::FaceChange(false));
    assert_eq!(events[2], AffectEvent::FaceChange(true));
    assert!(matches!(events[3], AffectEvent::Update(ref s) if s.frame_count == 1));

    assert!(engine.is_active());
    let timeline = engine.get_timeline();
    assert_eq!(timeline.frames.len(), 3);
    assert!(!timeline.frames[0].face_detected);
    assert!(!timeline.frames[1].face_detected);
    assert!(timeline.frames[2].face_detected);

    let metrics = engine.metrics();
    assert_eq!(metrics.failure_count, 1);
    assert_eq!(metrics.no_face_count, 1);
    assert_eq!(metrics.detected_count, 1);
}

#[tokio::test(start_paused = true)]
async fn blind_camera_records_no_face_without_calling_classifier() {
    let classifier = ScriptedClassifier::new(vec![happy_step(); 3]);
    let calls = classifier.calls.clone();
    let camera = TestCamera {
        blind: true,
        ..Default::default()
    };
    let (engine, mut rx) = start_engine(classifier, camera, test_config()).await;

    collect_ticks(&mut rx, 2).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.get_frame_count(), 2);
    assert_eq!(engine.get_current_snapshot().frame_count, 0);
}

#[tokio::test(start_paused = true)]
async fn slow_classifier_times_out() {
    let classifier = ScriptedClassifier {
        delay: Some(Duration::from_secs(3)),
        ..ScriptedClassifier::new(vec![happy_step(); 2])
    };
    let (engine, mut rx) = start_engine(classifier, TestCamera::default(), test_config()).await;

    let events = collect_ticks(&mut rx, 1).await;
    assert_eq!(events, vec![AffectEvent::FaceChange(false)]);
    assert_eq!(engine.metrics().timeout_count, 1);
}

#[tokio::test(start_paused = true)]
async fn ticks_never_overlap() {
    let classifier = ScriptedClassifier {
        delay: Some(Duration::from_millis(1_200)),
        ..ScriptedClassifier::new(vec![happy_step(); 4])
    };
    let max_in_flight = classifier.max_in_flight.clone();
    let (engine, mut rx) = start_engine(classifier, TestCamera::default(), test_config()).await;

    collect_ticks(&mut rx, 4).await;
    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert!(engine.metrics().tick_count >= 4);

    let frames = engine.get_timeline().frames;
    assert!(frames.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}

#[tokio::test(start_paused = true)]
async fn in_flight_result_is_dropped_after_stop() {
    let (entered_tx, mut entered_rx) = mpsc::unbounded_channel();
    let gate = Arc::new(Notify::new());
    let classifier = GatedClassifier {
        entered: entered_tx,
        gate: gate.clone(),
    };
    let (engine, mut rx) = start_engine(classifier, TestCamera::default(), test_config()).await;

    entered_rx.recv().await.unwrap();
    engine.stop_detection();
    gate.notify_waiters();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(engine.status(), EngineStatus::Stopped);
    assert_eq!(engine.get_frame_count(), 0);
    assert!(rx.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn answer_capture_cuts_buffer_but_not_session_log() {
    let (engine, mut rx) = start_engine(
        ScriptedClassifier::new(vec![happy_step(); 6]),
        TestCamera::default(),
        test_config(),
    )
    .await;

    collect_ticks(&mut rx, 3).await;
    let first = engine.capture_answer_snapshot();
    assert_eq!(first.frame_count, 3);
    assert_eq!(engine.get_answer_frame_count(), 0);
    assert_eq!(engine.get_frame_count(), 3);
    assert_eq!(engine.get_current_snapshot().frame_count, 0);

    collect_ticks(&mut rx, 2).await;
    let payload = engine.capture_answer_payload().unwrap();
    assert_eq!(payload.frame_count, 2);
    assert_eq!(payload.dominant, "happy");
    assert_eq!(engine.get_frame_count(), 5);

    let answers = engine.answer_snapshots();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[1].answer_index, 1);

    // nothing new since the last boundary
    assert!(engine.capture_answer_payload().is_none());
    assert_eq!(engine.answer_snapshots().len(), 3);

    let averages = engine.timeline_averages().unwrap();
    assert_eq!(averages.answers, 3);
    assert!((averages.engagement - 160.0 / 3.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn session_summary_keeps_trailing_window() {
    let mut script = vec![sad_step(); 5];
    script.extend(vec![happy_step(); 5]);
    let config = AffectConfig {
        calibration_frames: 100,
        ..test_config()
    };
    let (engine, mut rx) =
        start_engine(ScriptedClassifier::new(script), TestCamera::default(), config).await;

    collect_ticks(&mut rx, 5).await;
    engine.capture_answer_snapshot();
    collect_ticks(&mut rx, 5).await;
    engine.stop_detection();

    let summary = engine.get_session_summary();
    assert_eq!(summary.stress, 0);
    assert_eq!(summary.frame_count, 10);

    let average = engine.get_session_average();
    assert_eq!(average.stress, 50);
    assert_eq!(engine.get_timeline().summary, summary);
}

#[tokio::test(start_paused = true)]
async fn restart_after_stop_keeps_history_and_baseline() {
    let config = AffectConfig {
        calibration_frames: 2,
        ..test_config()
    };
    let (engine, mut rx) = start_engine(
        ScriptedClassifier::new(vec![neutral_step(); 6]),
        TestCamera::default(),
        config,
    )
    .await;

    collect_ticks(&mut rx, 3).await;
    engine.shutdown().await;
    assert_eq!(engine.status(), EngineStatus::Stopped);
    assert!(!engine.is_active());
    let baseline = engine.baseline().unwrap();

    let (observer, mut rx) = ChannelObserver::channel();
    assert!(engine.start_detection(Arc::new(observer)));
    collect_ticks(&mut rx, 2).await;

    assert_eq!(engine.get_frame_count(), 5);
    assert_eq!(engine.baseline().unwrap(), baseline);
}

#[tokio::test]
async fn model_load_failure_is_reported_not_raised() {
    let classifier = ScriptedClassifier {
        fail_load: true,
        ..Default::default()
    };
    let engine = AffectEngine::new(classifier, TestCamera::default(), test_config());

    assert!(!engine.load_models().await);
    assert_eq!(engine.status(), EngineStatus::Uninitialized);
    assert!(matches!(
        engine.last_error(),
        Some(AffectError::ModelLoadFailure(_))
    ));

    assert!(!engine.start_webcam("cam0"));
    assert!(!engine.start_detection(Arc::new(NoopObserver)));
    assert!(!engine.is_active());
}

#[tokio::test]
async fn camera_failure_leaves_engine_ready() {
    let camera = TestCamera {
        refuse: true,
        ..Default::default()
    };
    let releases = camera.releases.clone();
    let engine = AffectEngine::new(ScriptedClassifier::default(), camera, test_config());

    assert!(engine.load_models().await);
    assert!(!engine.start_webcam("cam0"));
    assert_eq!(engine.status(), EngineStatus::Ready);
    assert!(matches!(
        engine.last_error(),
        Some(AffectError::CaptureAccessFailure(_))
    ));

    assert!(!engine.start_detection(Arc::new(NoopObserver)));
    assert_eq!(
        engine.last_error(),
        Some(AffectError::InvalidState {
            operation: "start detection",
            state: EngineStatus::Ready,
        })
    );

    drop(engine);
    assert_eq!(releases.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn start_detection_is_idempotent() {
    let (engine, mut rx) = start_engine(
        ScriptedClassifier::new(vec![happy_step(); 4]),
        TestCamera::default(),
        test_config(),
    )
    .await;

    assert!(engine.start_detection(Arc::new(NoopObserver)));
    collect_ticks(&mut rx, 2).await;
    assert_eq!(engine.get_frame_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn destroy_is_final_and_releases_camera_once() {
    let camera = TestCamera::default();
    let releases = camera.releases.clone();
    let (engine, mut rx) = start_engine(
        ScriptedClassifier::new(vec![happy_step(); 10]),
        camera,
        test_config(),
    )
    .await;

    collect_ticks(&mut rx, 2).await;
    engine.destroy();
    assert_eq!(engine.status(), EngineStatus::Destroyed);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert!(rx.recv().await.is_none());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(engine.get_frame_count(), 0);
    assert!(engine.get_timeline().frames.is_empty());
    assert!(engine.baseline().is_none());

    engine.destroy();
    engine.stop_detection();
    engine.stop_webcam();
    assert!(!engine.load_models().await);
    assert!(!engine.start_webcam("cam0"));
    assert!(!engine.start_detection(Arc::new(NoopObserver)));
    assert_eq!(engine.capture_answer_snapshot().frame_count, 0);
    assert!(engine.answer_snapshots().is_empty());
    assert_eq!(engine.get_session_summary().dominant_label(), "unknown");
    assert_eq!(engine.last_error(), Some(AffectError::Destroyed));

    drop(engine);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_webcam_releases_and_returns_to_ready() {
    let camera = TestCamera::default();
    let releases = camera.releases.clone();
    let acquires = camera.acquires.clone();
    let (engine, mut rx) = start_engine(
        ScriptedClassifier::new(vec![happy_step(); 4]),
        camera,
        test_config(),
    )
    .await;

    collect_ticks(&mut rx, 1).await;
    engine.stop_webcam();
    engine.stop_webcam();
    assert_eq!(engine.status(), EngineStatus::Ready);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
    assert_eq!(engine.get_frame_count(), 1);

    assert!(engine.start_webcam("cam1"));
    assert_eq!(acquires.load(Ordering::SeqCst), 2);
    assert_eq!(engine.status(), EngineStatus::Capturing);
}

#[test]
fn start_detection_outside_runtime_fails_softly() {
    let engine = AffectEngine::new(
        ScriptedClassifier::default(),
        TestCamera::default(),
        test_config(),
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    assert!(runtime.block_on(engine.load_models()));
    assert!(engine.start_webcam("cam0"));

    assert!(!engine.start_detection(Arc::new(NoopObserver)));
    assert_eq!(engine.status(), EngineStatus::Capturing);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn restart_racing_stop_is_never_refused() {
    let engine = Arc::new(AffectEngine::new(
        ScriptedClassifier::default(),
        TestCamera::default(),
        AffectConfig {
            tick_interval_ms: 1,
            ..test_config()
        },
    ));
    assert!(engine.load_models().await);
    assert!(engine.start_webcam("cam0"));
    assert!(engine.start_detection(Arc::new(NoopObserver)));

    let stopper = {
        let engine = Arc::clone(&engine);
        tokio::task::spawn_blocking(move || {
            for _ in 0..500 {
                engine.stop_detection();
            }
        })
    };
    let starter = {
        let engine = Arc::clone(&engine);
        tokio::task::spawn_blocking(move || {
            (0..500)
                .filter(|_| !engine.start_detection(Arc::new(NoopObserver)))
                .count()
        })
    };

    stopper.await.unwrap();
    assert_eq!(starter.await.unwrap(), 0);
    engine.destroy();
}
