use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use crate::agent::DEFAULT_CAPTURE_INTERVAL;

pub const DEFAULT_CONFIG_PATH: &str = "agent_sim.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    pub camera_source: String,
    pub capture_interval: Duration,
    pub frame_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".into(),
            camera_source: "0".into(),
            capture_interval: DEFAULT_CAPTURE_INTERVAL,
            frame_interval: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    camera_source: Option<String>,
    capture_interval_ms: Option<u64>,
    frame_interval_ms: Option<u64>,
}

/// Defaults, then `path` if it exists, then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.bind_addr {
        settings.bind_addr = v;
    }
    if let Some(v) = file.camera_source {
        settings.camera_source = v;
    }
    if let Some(v) = file.capture_interval_ms {
        settings.capture_interval = Duration::from_millis(v);
    }
    if let Some(v) = file.frame_interval_ms {
        settings.frame_interval = Duration::from_millis(v);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("SIM_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = var("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = var("CAMERA_SOURCE") {
        settings.camera_source = v;
    }
    if let Some(v) = var("APP__CAMERA_SOURCE") {
        settings.camera_source = v;
    }

    if let Some(ms) = var("APP__CAPTURE_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok()) {
        settings.capture_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = var("APP__FRAME_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok()) {
        settings.frame_interval = Duration::from_millis(ms);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
