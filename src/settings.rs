use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::aggregation::AffectConfig;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

const DEBUG_TICK_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EngineSettings {
    #[serde(default)]
    affect: AffectConfig,
}

/// Engine settings backed by an optional JSON file, with environment overrides on top.
pub struct SettingsStore {
    path: Option<PathBuf>,
    data: RwLock<EngineSettings>,
}

impl SettingsStore {
    /// In-memory defaults, never persisted.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            data: RwLock::new(EngineSettings::default()),
        }
    }

    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            load_settings(&path)?
        } else {
            EngineSettings::default()
        };

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// Stored configuration with environment overrides applied.
    pub fn affect_config(&self) -> AffectConfig {
        let stored = self.read().affect.clone();
        apply_env_overrides(stored, |key| std::env::var(key).ok()).sanitized()
    }

    pub fn update_affect_config(&self, config: AffectConfig) -> Result<()> {
        let mut guard = self.write();
        guard.affect = config;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = load_settings(path)?;
        *self.write() = data;
        Ok(())
    }

    fn persist(&self, data: &EngineSettings) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, EngineSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, EngineSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Unreadable files are errors; unparsable ones fall back to defaults.
fn load_settings(path: &Path) -> Result<EngineSettings> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
        log_warn!("ignoring unparsable settings at {}: {err}", path.display());
        EngineSettings::default()
    }))
}

fn apply_env_overrides(
    mut config: AffectConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AffectConfig {
    if let Some(value) = lookup("AFFECT_MIN_CONFIDENCE") {
        match value.trim().parse::<f64>() {
            Ok(parsed) => config.min_confidence = parsed,
            Err(_) => log_warn!("ignoring AFFECT_MIN_CONFIDENCE={value}"),
        }
    }

    if let Some(value) = lookup("AFFECT_CALIBRATION_FRAMES") {
        match value.trim().parse::<usize>() {
            Ok(parsed) => config.calibration_frames = parsed,
            Err(_) => log_warn!("ignoring AFFECT_CALIBRATION_FRAMES={value}"),
        }
    }

    if let Some(value) = lookup("AFFECT_TICK_INTERVAL_MS") {
        match value.trim().parse::<u64>() {
            Ok(parsed) => config.tick_interval_ms = parsed,
            Err(_) => log_warn!("ignoring AFFECT_TICK_INTERVAL_MS={value}"),
        }
    }

    let debug_mode = lookup("AFFECT_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if debug_mode {
        config.tick_interval_ms = DEBUG_TICK_INTERVAL_MS;
    }

    config
}
