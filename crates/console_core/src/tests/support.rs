use std::{
    collections::VecDeque,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{domain::Mode, protocol::StatusSample};
use tokio::sync::Mutex;

use crate::{error::ConsoleError, transport::RemoteController};

pub(crate) fn sample(mode: Mode, landmark_count: u64) -> StatusSample {
    StatusSample {
        mode,
        status: format!("{mode} ACTIVE"),
        landmark_count,
        ..StatusSample::default()
    }
}

pub(crate) enum Scripted {
    Sample(StatusSample),
    Failure(&'static str),
}

/// Replays a fixed list of poll results, then keeps returning the last sample.
pub(crate) struct ScriptedRemote {
    script: Mutex<VecDeque<Scripted>>,
    steady: Mutex<Option<StatusSample>>,
    mode_requests: Mutex<Vec<Mode>>,
    fetches: AtomicUsize,
    reject_mode_commands: bool,
}

impl ScriptedRemote {
    pub(crate) fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            steady: Mutex::new(None),
            mode_requests: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            reject_mode_commands: false,
        }
    }

    pub(crate) fn rejecting_mode_commands(mut self) -> Self {
        self.reject_mode_commands = true;
        self
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub(crate) async fn mode_requests(&self) -> Vec<Mode> {
        self.mode_requests.lock().await.clone()
    }
}

#[async_trait]
impl RemoteController for ScriptedRemote {
    async fn fetch_status(&self) -> Result<StatusSample, ConsoleError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().await.pop_front();
        match next {
            Some(Scripted::Sample(sample)) => {
                *self.steady.lock().await = Some(sample.clone());
                Ok(sample)
            }
            Some(Scripted::Failure(reason)) => Err(ConsoleError::Decode {
                url: "scripted://status".to_string(),
                reason: reason.to_string(),
            }),
            None => self
                .steady
                .lock()
                .await
                .clone()
                .ok_or_else(|| ConsoleError::Decode {
                    url: "scripted://status".to_string(),
                    reason: "script exhausted".to_string(),
                }),
        }
    }

    async fn set_mode(&self, mode: Mode) -> Result<(), ConsoleError> {
        self.mode_requests.lock().await.push(mode);
        if self.reject_mode_commands {
            return Err(ConsoleError::Status {
                url: format!("scripted://set_mode/{mode}"),
                status: StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        Ok(())
    }
}
