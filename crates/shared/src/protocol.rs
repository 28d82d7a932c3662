use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{LandmarkId, Mode};

pub const STATUS_PATH: &str = "status";
pub const SET_MODE_PATH: &str = "set_mode";
pub const VIDEO_FEED_PATH: &str = "video_feed";
pub const UPDATE_SOURCE_PATH: &str = "update_source";
pub const HEALTHZ_PATH: &str = "healthz";

/// Wire value of `best_match` when nothing matched.
pub const NO_MATCH: i64 = -1;
pub const MAX_CONFIDENCE: f64 = 100.0;
pub const INITIAL_STATUS_LABEL: &str = "SYSTEM INITIALIZING";
/// Upper bound on a plausible `landmark_count`; anything above it is treated as a corrupt body.
pub const MAX_LANDMARK_COUNT: u64 = 1_000_000;

/// Relative path of the mode command for `mode`, e.g. `set_mode/RETURN`.
pub fn set_mode_path(mode: Mode) -> String {
    format!("{SET_MODE_PATH}/{mode}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSample {
    pub mode: Mode,
    pub status: String,
    pub confidence: f64,
    pub landmark_count: u64,
    pub best_match: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_source: Option<String>,
}

impl Default for StatusSample {
    fn default() -> Self {
        Self {
            mode: Mode::Explore,
            status: INITIAL_STATUS_LABEL.to_string(),
            confidence: 0.0,
            landmark_count: 0,
            best_match: NO_MATCH,
            camera_source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SampleError {
    #[error("confidence {0} is outside [0, 100]")]
    ConfidenceOutOfRange(f64),
    #[error("best_match {0} is neither a landmark id nor {NO_MATCH}")]
    InvalidBestMatch(i64),
    #[error("landmark_count {0} exceeds {MAX_LANDMARK_COUNT}")]
    LandmarkCountTooLarge(u64),
}

impl StatusSample {
    pub fn validate(&self) -> Result<(), SampleError> {
        if !self.confidence.is_finite() || !(0.0..=MAX_CONFIDENCE).contains(&self.confidence) {
            return Err(SampleError::ConfidenceOutOfRange(self.confidence));
        }
        if self.best_match < NO_MATCH {
            return Err(SampleError::InvalidBestMatch(self.best_match));
        }
        if self.landmark_count > MAX_LANDMARK_COUNT {
            return Err(SampleError::LandmarkCountTooLarge(self.landmark_count));
        }
        Ok(())
    }

    pub fn best_match_id(&self) -> Option<LandmarkId> {
        u64::try_from(self.best_match).ok().map(LandmarkId)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetModeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSourceQuery {
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSourceResponse {
    pub success: bool,
    pub source: String,
}
