#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use affect_engine::{
    AffectConfig, AffectEngine, AffectEvent, CaptureDevice, ChannelObserver, Detection,
    EmotionScores, ExpressionClassifier, VideoFrame,
};
use anyhow::{anyhow, bail, Result};
use tokio::sync::{mpsc, Notify};

#[derive(Debug, Clone)]
pub enum Step {
    Face(EmotionScores, f64),
    NoFace,
    Fail,
}

pub fn happy_step() -> Step {
    Step::Face(
        EmotionScores {
            happy: 0.8,
            neutral: 0.2,
            ..Default::default()
        },
        0.9,
    )
}

pub fn neutral_step() -> Step {
    Step::Face(
        EmotionScores {
            neutral: 1.0,
            ..Default::default()
        },
        0.9,
    )
}

pub fn sad_step() -> Step {
    Step::Face(
        EmotionScores {
            sad: 1.0,
            ..Default::default()
        },
        0.9,
    )
}

/// Plays back a fixed script, one step per call. Runs dry into "no face".
#[derive(Default)]
pub struct ScriptedClassifier {
    pub script: Mutex<VecDeque<Step>>,
    pub fail_load: bool,
    pub delay: Option<Duration>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedClassifier {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            ..Default::default()
        }
    }
}

impl ExpressionClassifier for ScriptedClassifier {
    async fn load(&self) -> Result<()> {
        if self.fail_load {
            bail!("weights not found");
        }
        Ok(())
    }

    async fn detect(&self, _frame: VideoFrame) -> Result<Option<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Face(expressions, confidence)) => Ok(Some(Detection {
                expressions,
                confidence,
            })),
            Some(Step::NoFace) | None => Ok(None),
            Some(Step::Fail) => Err(anyhow!("inference backend crashed")),
        }
    }
}

/// Blocks every detection until the test opens the gate.
pub struct GatedClassifier {
    pub entered: mpsc::UnboundedSender<()>,
    pub gate: Arc<Notify>,
}

impl ExpressionClassifier for GatedClassifier {
    async fn load(&self) -> Result<()> {
        Ok(())
    }

    async fn detect(&self, _frame: VideoFrame) -> Result<Option<Detection>> {
        let _ = self.entered.send(());
        self.gate.notified().await;
        Ok(Some(Detection {
            expressions: EmotionScores {
                happy: 1.0,
                ..Default::default()
            },
            confidence: 0.9,
        }))
    }
}

#[derive(Clone, Default)]
pub struct TestCamera {
    pub acquires: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
    pub refuse: bool,
    pub blind: bool,
}

impl CaptureDevice for TestCamera {
    fn acquire(&mut self, _surface: &str) -> Result<()> {
        if self.refuse {
            bail!("camera permission denied");
        }
        self.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn grab(&mut self) -> Option<VideoFrame> {
        if self.blind {
            return None;
        }
        Some(VideoFrame::new(4, 4, vec![0; 16]))
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn test_config() -> AffectConfig {
    AffectConfig {
        min_confidence: 0.5,
        calibration_frames: 10,
        ..Default::default()
    }
}

/// Loads, opens the camera and starts detection with a channel observer.
pub async fn start_engine<C: ExpressionClassifier>(
    classifier: C,
    camera: TestCamera,
    config: AffectConfig,
) -> (AffectEngine<C, TestCamera>, mpsc::UnboundedReceiver<AffectEvent>) {
    let engine = AffectEngine::new(classifier, camera, config);
    assert!(engine.load_models().await);
    assert!(engine.start_webcam("cam0"));

    let (observer, rx) = ChannelObserver::channel();
    assert!(engine.start_detection(Arc::new(observer)));
    (engine, rx)
}

/// Waits for `count` ticks, returning every event seen along the way.
pub async fn collect_ticks(
    rx: &mut mpsc::UnboundedReceiver<AffectEvent>,
    count: usize,
) -> Vec<AffectEvent> {
    let mut events = Vec::new();
    let mut ticks = 0;
    while ticks < count {
        let event = rx.recv().await.expect("detection loop ended early");
        let finished_tick = match &event {
            AffectEvent::Update(_) => true,
            AffectEvent::FaceChange(detected) => !detected,
        };
        events.push(event);
        if finished_tick {
            ticks += 1;
        }
    }
    events
}
