use std::sync::Arc;

use shared::domain::Mode;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::transport::RemoteController;

/// Fire-and-forget mode commands. Local state is never touched; the next poll
/// is the only confirmation that the remote switched.
#[derive(Clone)]
pub struct ModeCommander {
    remote: Arc<dyn RemoteController>,
}

/// A mode command in flight. Dropping it detaches the request.
pub struct ModeRequest {
    target: Mode,
    task: JoinHandle<bool>,
}

impl ModeRequest {
    pub fn target(&self) -> Mode {
        self.target
    }

    /// Waits for the request to settle; `false` covers every failure.
    pub async fn outcome(self) -> bool {
        self.task.await.unwrap_or(false)
    }
}

impl ModeCommander {
    pub fn new(remote: Arc<dyn RemoteController>) -> Self {
        Self { remote }
    }

    /// Requests the complement of `current`. Two toggles before a status refresh
    /// request the same mode twice.
    pub fn toggle_mode(&self, current: Mode) -> ModeRequest {
        self.request_mode(current.complement())
    }

    pub fn request_mode(&self, target: Mode) -> ModeRequest {
        let remote = Arc::clone(&self.remote);
        info!(mode = %target, "mode: requesting switch");
        let task = tokio::spawn(async move { send_mode_command(remote.as_ref(), target).await });
        ModeRequest { target, task }
    }
}

async fn send_mode_command(remote: &dyn RemoteController, target: Mode) -> bool {
    match remote.set_mode(target).await {
        Ok(()) => {
            info!(mode = %target, "mode: switch request accepted");
            true
        }
        Err(err) => {
            error!(mode = %target, kind = ?err.kind(), error = %err, "mode: switch failed");
            false
        }
    }
}

#[cfg(test)]
#[path = "tests/commander_tests.rs"]
mod tests;
