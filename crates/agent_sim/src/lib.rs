//! HTTP stand-in for the TrailBack navigation agent.
//!
//! Serves the same `/status`, `/set_mode/{mode}` and `/video_feed` contract as the real
//! agent, driven by a synthetic scene instead of a camera.

pub mod agent;
pub mod api;
pub mod config;
pub mod feed;
pub mod led;
pub mod scene;

pub use agent::{CameraSource, SimulatedAgent};
pub use api::{build_router, AppState};
pub use config::Settings;
pub use scene::spawn_frame_loop;
