use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use shared::{
    domain::{LandmarkId, Mode},
    protocol::{StatusSample, INITIAL_STATUS_LABEL, MAX_CONFIDENCE, NO_MATCH},
};
use tracing::{debug, info};

use crate::{
    led::{LedColor, StatusLed},
    scene::Frame,
};

pub const DEFAULT_CAPTURE_INTERVAL: Duration = Duration::from_millis(2500);
/// A frame needs more keypoints than this to be stored as a landmark.
pub const MIN_LANDMARK_KEYPOINTS: usize = 50;
/// Good-match count that maps to full confidence.
pub const FULL_CONFIDENCE_MATCHES: f64 = 50.0;
pub const MATCH_THRESHOLD: f64 = 70.0;
pub const POSSIBLE_MATCH_THRESHOLD: f64 = 30.0;

const PEAK_GOOD_MATCHES: f64 = 60.0;
const MATCH_FALLOFF: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    Device(u32),
    Stream(String),
}

impl CameraSource {
    /// Numeric sources are device indices, `http…` sources are streams, anything else is device 0.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http") {
            CameraSource::Stream(raw.to_string())
        } else {
            CameraSource::Device(raw.parse().unwrap_or(0))
        }
    }

    pub fn label(&self) -> String {
        match self {
            CameraSource::Device(_) => "Webcam".to_string(),
            CameraSource::Stream(url) => url.clone(),
        }
    }
}

impl fmt::Display for CameraSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraSource::Device(index) => write!(f, "device {index}"),
            CameraSource::Stream(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Landmark {
    pub id: LandmarkId,
    pub position: f64,
    pub captured_at: DateTime<Utc>,
}

pub struct SimulatedAgent {
    mode: Mode,
    landmarks: Vec<Landmark>,
    last_capture: Option<Instant>,
    capture_interval: Duration,
    confidence: f64,
    best_match: i64,
    status: String,
    camera_source: CameraSource,
    last_frame: Option<Frame>,
    led: Arc<dyn StatusLed>,
}

impl SimulatedAgent {
    pub fn new(
        camera_source: CameraSource,
        capture_interval: Duration,
        led: Arc<dyn StatusLed>,
    ) -> Self {
        info!(source = %camera_source, "agent: initialized");
        Self {
            mode: Mode::Explore,
            landmarks: Vec::new(),
            last_capture: None,
            capture_interval,
            confidence: 0.0,
            best_match: NO_MATCH,
            status: INITIAL_STATUS_LABEL.to_string(),
            camera_source,
            last_frame: None,
            led,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn camera_source(&self) -> &CameraSource {
        &self.camera_source
    }

    pub fn set_camera_source(&mut self, source: CameraSource) {
        info!(source = %source, "agent: camera source replaced");
        self.camera_source = source;
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        match mode {
            Mode::Explore => {
                self.status = "EXPLORATION MODE ACTIVE".to_string();
                self.led.set_led(LedColor::Green);
            }
            Mode::Return => {
                self.status = "RETURN NAVIGATION ACTIVE".to_string();
                self.led.set_led(LedColor::Amber);
            }
        }
        info!(%mode, "agent: mode set");
    }

    /// Darkens the status light before the process exits.
    pub fn power_down(&mut self) {
        self.led.set_led(LedColor::Off);
        info!("agent: powered down");
    }

    pub fn process_frame(&mut self, frame: &Frame, now: Instant) {
        match self.mode {
            Mode::Explore => self.explore(frame, now),
            Mode::Return => self.retrace(frame),
        }
        self.last_frame = Some(*frame);
    }

    fn explore(&mut self, frame: &Frame, now: Instant) {
        let due = self
            .last_capture
            .map_or(true, |last| now.saturating_duration_since(last) > self.capture_interval);
        if !due || frame.keypoints <= MIN_LANDMARK_KEYPOINTS {
            return;
        }

        let id = LandmarkId(self.landmarks.len() as u64);
        self.landmarks.push(Landmark {
            id,
            position: frame.position,
            captured_at: Utc::now(),
        });
        self.last_capture = Some(now);
        self.status = "LANDMARK CAPTURED".to_string();
        self.led.set_led(LedColor::Green);
        debug!(landmark = id.0, position = frame.position, "agent: landmark captured");
    }

    fn retrace(&mut self, frame: &Frame) {
        if frame.keypoints == 0 || self.landmarks.is_empty() {
            self.status = "NO LANDMARKS STORED".to_string();
            self.led.set_led(LedColor::Red);
            return;
        }

        let mut best_score = 0;
        let mut best_id = NO_MATCH;
        for landmark in &self.landmarks {
            let score = good_matches(landmark, frame);
            if score > best_score {
                best_score = score;
                best_id = landmark.id.0 as i64;
            }
        }

        let confidence = (best_score as f64 / FULL_CONFIDENCE_MATCHES * 100.0).min(MAX_CONFIDENCE);
        self.confidence = confidence;
        self.best_match = best_id;

        if confidence > MATCH_THRESHOLD {
            self.status = format!("MATCH FOUND (ID: {best_id})");
            self.led.set_led(LedColor::Green);
        } else if confidence > POSSIBLE_MATCH_THRESHOLD {
            self.status = "POSSIBLE MATCH...".to_string();
            self.led.set_led(LedColor::Amber);
        } else {
            self.status = "OFF TRACK".to_string();
            self.led.set_led(LedColor::Red);
        }
    }

    pub fn snapshot(&self) -> StatusSample {
        StatusSample {
            mode: self.mode,
            status: self.status.clone(),
            confidence: self.confidence,
            landmark_count: self.landmarks.len() as u64,
            best_match: self.best_match,
            camera_source: Some(self.camera_source.label()),
        }
    }
}

/// Good feature matches between a stored landmark and the current frame.
fn good_matches(landmark: &Landmark, frame: &Frame) -> usize {
    let distance = (landmark.position - frame.position).abs() + frame.drift.abs();
    let matches = (PEAK_GOOD_MATCHES - MATCH_FALLOFF * distance).max(0.0).round() as usize;
    matches.min(frame.keypoints)
}

#[cfg(test)]
#[path = "tests/agent_tests.rs"]
mod tests;
