use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 0-based index of a captured landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LandmarkId(pub u64);

impl fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LM_ID_{}", self.0)
    }
}

/// Operating state of the remote agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    #[default]
    Explore,
    Return,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Explore, Mode::Return];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Explore => "EXPLORE",
            Mode::Return => "RETURN",
        }
    }

    pub fn complement(self) -> Self {
        match self {
            Mode::Explore => Mode::Return,
            Mode::Return => Mode::Explore,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode '{0}', expected EXPLORE or RETURN")]
pub struct ParseModeError(pub String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == raw)
            .ok_or_else(|| ParseModeError(raw.to_string()))
    }
}
