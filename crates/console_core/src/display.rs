//! Threshold mapping from raw telemetry to display classes.

use shared::{domain::Mode, protocol::StatusSample};

/// Confidence strictly above this is a strong signal.
pub const STRONG_CONFIDENCE: f64 = 70.0;
/// Confidence strictly above this (and not strong) draws the gauge in the middle band.
pub const FAIR_CONFIDENCE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStrength {
    Strong,
    Weak,
}

impl SignalStrength {
    pub fn classify(confidence: f64) -> Self {
        if confidence > STRONG_CONFIDENCE {
            SignalStrength::Strong
        } else {
            SignalStrength::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalStrength::Strong => "STRONG",
            SignalStrength::Weak => "WEAK",
        }
    }
}

/// Semantic color of the status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Neutral,
    Positive,
    Alert,
}

impl StatusTone {
    pub fn classify(mode: Mode, confidence: f64) -> Self {
        match mode {
            Mode::Explore => StatusTone::Neutral,
            Mode::Return if confidence > STRONG_CONFIDENCE => StatusTone::Positive,
            Mode::Return => StatusTone::Alert,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeBand {
    Good,
    Fair,
    Poor,
}

impl GaugeBand {
    pub fn classify(confidence: f64) -> Self {
        if confidence > STRONG_CONFIDENCE {
            GaugeBand::Good
        } else if confidence > FAIR_CONFIDENCE {
            GaugeBand::Fair
        } else {
            GaugeBand::Poor
        }
    }
}

pub fn gauge_percent(confidence: f64) -> u8 {
    if !confidence.is_finite() {
        return 0;
    }
    confidence.clamp(0.0, 100.0).round() as u8
}

/// Label of the single operator action for the current mode.
pub fn toggle_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Explore => "INITIATE RETURN",
        Mode::Return => "RESUME EXPLORATION",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusDisplay {
    pub signal: SignalStrength,
    pub tone: StatusTone,
    pub gauge: GaugeBand,
    pub gauge_percent: u8,
    pub toggle_label: &'static str,
}

impl From<&StatusSample> for StatusDisplay {
    fn from(sample: &StatusSample) -> Self {
        Self {
            signal: SignalStrength::classify(sample.confidence),
            tone: StatusTone::classify(sample.mode, sample.confidence),
            gauge: GaugeBand::classify(sample.confidence),
            gauge_percent: gauge_percent(sample.confidence),
            toggle_label: toggle_label(sample.mode),
        }
    }
}

#[cfg(test)]
#[path = "tests/display_tests.rs"]
mod tests;
