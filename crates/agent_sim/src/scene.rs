use std::{sync::Arc, time::Duration};

use shared::domain::Mode;
use tokio::{sync::Mutex, task::JoinHandle, time::MissedTickBehavior};

use crate::agent::SimulatedAgent;

/// Feature summary of one camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub index: u64,
    pub keypoints: usize,
    /// Distance along the trail, in landmark-spacing units.
    pub position: f64,
    /// Lateral offset from the recorded trail; widens match distance.
    pub drift: f64,
}

/// Deterministic stand-in for the camera: walks forward while exploring and
/// backwards while retracing, with periodic blurred frames.
#[derive(Debug, Clone)]
pub struct SyntheticScene {
    index: u64,
    position: f64,
    step: f64,
}

const BLUR_PERIOD: u64 = 7;
const SHARP_KEYPOINTS: usize = 180;
const BLURRED_KEYPOINTS: usize = 30;

impl SyntheticScene {
    pub fn new(step: f64) -> Self {
        Self {
            index: 0,
            position: 0.0,
            step,
        }
    }

    pub fn next_frame(&mut self, mode: Mode) -> Frame {
        self.index += 1;
        self.position = match mode {
            Mode::Explore => self.position + self.step,
            Mode::Return => (self.position - self.step).max(0.0),
        };
        let keypoints = if self.index % BLUR_PERIOD == 0 {
            BLURRED_KEYPOINTS
        } else {
            SHARP_KEYPOINTS
        };
        Frame {
            index: self.index,
            keypoints,
            position: self.position,
            drift: 1.6 * (self.index as f64 * 0.05).sin(),
        }
    }
}

impl Default for SyntheticScene {
    fn default() -> Self {
        Self::new(0.02)
    }
}

/// Feeds synthetic frames into the agent until the task is aborted.
pub fn spawn_frame_loop(
    agent: Arc<Mutex<SimulatedAgent>>,
    mut scene: SyntheticScene,
    frame_interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(frame_interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let mut agent = agent.lock().await;
            let frame = scene.next_frame(agent.mode());
            agent.process_frame(&frame, std::time::Instant::now());
        }
    })
}
