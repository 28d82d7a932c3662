use std::fmt;

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColor {
    Red,
    Green,
    Amber,
    Off,
}

impl LedColor {
    pub fn as_str(self) -> &'static str {
        match self {
            LedColor::Red => "RED",
            LedColor::Green => "GREEN",
            LedColor::Amber => "AMBER",
            LedColor::Off => "OFF",
        }
    }
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status light on the agent's hardware bridge.
pub trait StatusLed: Send + Sync {
    fn set_led(&self, color: LedColor);
}

/// Used when no hardware is attached.
pub struct LoggingLed;

impl StatusLed for LoggingLed {
    fn set_led(&self, color: LedColor) {
        info!(%color, "hardware sim: LED set");
    }
}
