use std::{
    collections::VecDeque,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use affect_engine::{
    init_logging, AffectConfig, AffectEngine, AffectEvent, CaptureDevice, ChannelObserver,
    Detection, EmotionScores, ExpressionClassifier, SettingsStore, VideoFrame,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay recorded or synthetic expression output through the affect engine", long_about = None)]
struct Cli {
    /// JSON-lines file of classifier outputs; `null` lines mean no face
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Seed for the synthetic stream used when no input is given
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Ticks to run (defaults to the number of input lines, or 40)
    #[arg(long)]
    ticks: Option<usize>,

    /// Freeze an answer snapshot every N ticks
    #[arg(long, default_value_t = 10)]
    answer_every: usize,

    /// Override the scheduler cadence
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Engine settings file
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RecordedDetection {
    expressions: EmotionScores,
    confidence: f64,
}

enum Source {
    Recorded(Mutex<VecDeque<Option<Detection>>>),
    Synthetic(Mutex<StdRng>),
}

struct ReplayClassifier {
    source: Source,
}

impl ReplayClassifier {
    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;

        let mut detections = VecDeque::new();
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let recorded: Option<RecordedDetection> = serde_json::from_str(line)
                .with_context(|| format!("{}:{} is not a detection", path.display(), line_no + 1))?;
            detections.push_back(recorded.map(|r| Detection {
                expressions: r.expressions,
                confidence: r.confidence,
            }));
        }

        if detections.is_empty() {
            bail!("replay file {} has no detections", path.display());
        }

        Ok(Self {
            source: Source::Recorded(Mutex::new(detections)),
        })
    }

    fn synthetic(seed: u64) -> Self {
        Self {
            source: Source::Synthetic(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn len(&self) -> Option<usize> {
        match &self.source {
            Source::Recorded(queue) => Some(queue.lock().map(|q| q.len()).unwrap_or(0)),
            Source::Synthetic(_) => None,
        }
    }

    fn next_detection(&self) -> Option<Detection> {
        match &self.source {
            Source::Recorded(queue) => queue.lock().ok()?.pop_front().flatten(),
            Source::Synthetic(rng) => {
                let mut rng = rng.lock().ok()?;
                if rng.gen_bool(0.1) {
                    return None;
                }
                let raw = EmotionScores {
                    neutral: rng.gen_range(0.2..1.0),
                    happy: rng.gen_range(0.0..0.6),
                    sad: rng.gen_range(0.0..0.15),
                    angry: rng.gen_range(0.0..0.1),
                    fearful: rng.gen_range(0.0..0.2),
                    disgusted: rng.gen_range(0.0..0.05),
                    surprised: rng.gen_range(0.0..0.3),
                };
                Some(Detection {
                    expressions: raw.normalized(),
                    confidence: rng.gen_range(0.3..1.0),
                })
            }
        }
    }
}

impl ExpressionClassifier for ReplayClassifier {
    async fn load(&self) -> Result<()> {
        Ok(())
    }

    async fn detect(&self, _frame: VideoFrame) -> Result<Option<Detection>> {
        Ok(self.next_detection())
    }
}

/// Stands in for a camera: always has a blank frame ready.
struct BlankSurface;

impl CaptureDevice for BlankSurface {
    fn acquire(&mut self, _surface: &str) -> Result<()> {
        Ok(())
    }

    fn grab(&mut self) -> Option<VideoFrame> {
        Some(VideoFrame::new(1, 1, vec![0]))
    }

    fn release(&mut self) {}
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => SettingsStore::new(path.clone())?,
        None => SettingsStore::ephemeral(),
    };
    let mut config: AffectConfig = settings.affect_config();
    if let Some(interval_ms) = cli.interval_ms {
        config.tick_interval_ms = interval_ms;
    }

    let classifier = match &cli.input {
        Some(path) => ReplayClassifier::from_file(path)?,
        None => ReplayClassifier::synthetic(cli.seed),
    };
    let ticks = cli.ticks.or(classifier.len()).unwrap_or(40);
    let answer_every = cli.answer_every.max(1);

    let engine = AffectEngine::new(classifier, BlankSurface, config);
    log::info!("replaying {ticks} ticks into session {}", engine.session_id());

    if !engine.load_models().await {
        bail!("model load failed: {:?}", engine.last_error());
    }
    if !engine.start_webcam("replay") {
        bail!("capture failed: {:?}", engine.last_error());
    }

    let (observer, mut events) = ChannelObserver::channel();
    if !engine.start_detection(Arc::new(observer)) {
        bail!("detection did not start: {:?}", engine.last_error());
    }

    let mut seen = 0usize;
    while seen < ticks {
        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AffectEvent::FaceChange(_) => {
                seen += 1;
                if seen % answer_every == 0 {
                    emit_answer(&engine);
                }
            }
            AffectEvent::Update(snapshot) => {
                println!("{}", serde_json::to_string(&snapshot.to_payload())?);
            }
        }
    }

    engine.shutdown().await;
    if engine.get_answer_frame_count() > 0 {
        emit_answer(&engine);
    }

    let timeline = engine.get_timeline();
    println!("{}", serde_json::to_string_pretty(&timeline.summary.to_payload())?);
    if let Some(averages) = timeline.averages() {
        print!("{averages}");
    }
    let metrics = engine.metrics();
    log::info!(
        "{} ticks: {} detected, {} no face, {} failed",
        metrics.tick_count,
        metrics.detected_count,
        metrics.no_face_count,
        metrics.failure_count
    );

    engine.destroy();
    Ok(())
}

fn emit_answer<C: ExpressionClassifier, D: CaptureDevice>(engine: &AffectEngine<C, D>) {
    match engine.capture_answer_payload() {
        Some(payload) => match serde_json::to_string(&payload) {
            Ok(json) => println!("answer {json}"),
            Err(err) => log::error!("could not serialize answer payload: {err}"),
        },
        None => println!("answer (no affect data available)"),
    }
}
