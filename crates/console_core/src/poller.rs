use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use shared::protocol::StatusSample;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{error::ConsoleError, transport::RemoteController};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Downstream consumer of poll results. Calls are never concurrent: the next
/// request is only issued after the previous result has been handed over.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn accept(&self, sample: StatusSample);
    async fn reject(&self, error: ConsoleError);
}

pub struct StatusPoller {
    remote: Arc<dyn RemoteController>,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(remote: Arc<dyn RemoteController>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        Self { remote, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn spawn(self, sink: Arc<dyn StatusSink>) -> PollerHandle {
        let task = tokio::spawn(async move { self.run(sink).await });
        PollerHandle { task: Some(task) }
    }

    async fn run(self, sink: Arc<dyn StatusSink>) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        // At most one request in flight; ticks missed during a slow round trip are dropped.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.poll_once(sink.as_ref()).await;
        }
    }

    /// Issues one status request and hands the result to `sink`. Returns whether a sample arrived.
    pub async fn poll_once(&self, sink: &dyn StatusSink) -> bool {
        let fetched = self.remote.fetch_status().await.and_then(|sample| {
            sample.validate()?;
            Ok(sample)
        });
        match fetched {
            Ok(sample) => {
                debug!(
                    mode = %sample.mode,
                    landmark_count = sample.landmark_count,
                    confidence = sample.confidence,
                    "status: sample received"
                );
                sink.accept(sample).await;
                true
            }
            Err(error) => {
                warn!(kind = ?error.kind(), %error, "status: poll failed; keeping last known status");
                sink.reject(error).await;
                false
            }
        }
    }
}

/// Owns the poll task. Dropping the handle cancels the timer.
pub struct PollerHandle {
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancels the poll task and waits until it is gone.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/poller_tests.rs"]
mod tests;
