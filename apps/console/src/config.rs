use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use console_core::{
    SessionOptions, DEFAULT_LINK_LOSS_THRESHOLD, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "console.toml";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub poll_interval: Duration,
    /// `None` leaves request duration to the transport default.
    pub request_timeout: Option<Duration>,
    pub link_loss_threshold: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
            link_loss_threshold: DEFAULT_LINK_LOSS_THRESHOLD,
        }
    }
}

impl Settings {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            poll_interval: self.poll_interval,
            link_loss_threshold: self.link_loss_threshold,
        }
    }

    fn set_poll_interval_ms(&mut self, ms: u64) {
        if ms > 0 {
            self.poll_interval = Duration::from_millis(ms);
        }
    }

    fn set_request_timeout_ms(&mut self, ms: u64) {
        self.request_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    link_loss_threshold: Option<u32>,
}

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
    if let Some(v) = file.api_url {
        settings.api_url = v;
    }
    if let Some(ms) = file.poll_interval_ms {
        settings.set_poll_interval_ms(ms);
    }
    if let Some(ms) = file.request_timeout_ms {
        settings.set_request_timeout_ms(ms);
    }
    if let Some(v) = file.link_loss_threshold {
        settings.link_loss_threshold = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("TRAILBACK_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(ms) = var("APP__POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
        settings.set_poll_interval_ms(ms);
    }
    if let Some(ms) = var("APP__REQUEST_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        settings.set_request_timeout_ms(ms);
    }
    if let Some(v) = var("APP__LINK_LOSS_THRESHOLD").and_then(|v| v.parse().ok()) {
        settings.link_loss_threshold = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
