use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use shared::{domain::Mode, protocol::StatusSample};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{
    commander::{ModeCommander, ModeRequest},
    error::{ConsoleError, FailureKind},
    poller::{PollerHandle, StatusPoller, StatusSink, DEFAULT_POLL_INTERVAL},
    state::{ConsoleState, LinkState, DEFAULT_LINK_LOSS_THRESHOLD},
    timeline::TimelineEntry,
    transport::RemoteController,
};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub poll_interval: Duration,
    pub link_loss_threshold: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            link_loss_threshold: DEFAULT_LINK_LOSS_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConsoleEvent {
    StatusUpdated(StatusSample),
    LandmarksAppended(Vec<TimelineEntry>),
    CounterRegressed { held: usize, reported: u64 },
    LinkStateChanged(LinkState),
    PollFailed { kind: FailureKind, message: String },
    ModeRequested(Mode),
}

struct SessionShared {
    state: ConsoleState,
    accepting: bool,
}

/// One active console view: poll loop, state store and command path.
pub struct ConsoleSession {
    remote: Arc<dyn RemoteController>,
    options: SessionOptions,
    shared: Arc<RwLock<SessionShared>>,
    poller: Mutex<Option<PollerHandle>>,
    commander: ModeCommander,
    events: broadcast::Sender<ConsoleEvent>,
}

impl ConsoleSession {
    pub fn new(remote: Arc<dyn RemoteController>, options: SessionOptions) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            commander: ModeCommander::new(Arc::clone(&remote)),
            shared: Arc::new(RwLock::new(SessionShared {
                state: ConsoleState::new(options.link_loss_threshold),
                accepting: false,
            })),
            remote,
            options,
            poller: Mutex::new(None),
            events,
        })
    }

    /// Starts polling. Returns `false` when the session is already running.
    pub async fn start(&self) -> bool {
        let mut poller = self.poller.lock().await;
        if poller.is_some() {
            return false;
        }

        self.shared.write().await.accepting = true;
        let sink = Arc::new(SessionSink {
            shared: Arc::clone(&self.shared),
            events: self.events.clone(),
        });
        let status_poller = StatusPoller::new(Arc::clone(&self.remote), self.options.poll_interval);
        info!(
            interval_ms = status_poller.interval().as_millis() as u64,
            "console: session started"
        );
        *poller = Some(status_poller.spawn(sink));
        true
    }

    /// Cancels the poll timer. Results that arrive afterwards are discarded.
    pub async fn stop(&self) {
        let mut poller = self.poller.lock().await;
        self.shared.write().await.accepting = false;
        if let Some(handle) = poller.take() {
            handle.shutdown().await;
            info!("console: session stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn snapshot(&self) -> ConsoleState {
        self.shared.read().await.state.clone()
    }

    pub async fn current_mode(&self) -> Mode {
        self.shared.read().await.state.status().mode
    }

    /// Asks the remote to switch to the complement of the mode currently displayed.
    pub async fn toggle_mode(&self) -> ModeRequest {
        let current = self.current_mode().await;
        let request = self.commander.toggle_mode(current);
        let _ = self.events.send(ConsoleEvent::ModeRequested(request.target()));
        request
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ConsoleEvent> {
        self.events.subscribe()
    }
}

struct SessionSink {
    shared: Arc<RwLock<SessionShared>>,
    events: broadcast::Sender<ConsoleEvent>,
}

#[async_trait]
impl StatusSink for SessionSink {
    async fn accept(&self, sample: StatusSample) {
        let now = Utc::now();
        let (held, applied) = {
            let mut guard = self.shared.write().await;
            if !guard.accepting {
                debug!("console: discarding status sample after teardown");
                return;
            }
            let held = guard.state.timeline().len();
            (held, guard.state.apply_sample(sample.clone(), now))
        };

        if applied.counter_regressed {
            warn!(
                held,
                reported = sample.landmark_count,
                "timeline: landmark counter went backwards; no entries until it passes the held count"
            );
            let _ = self.events.send(ConsoleEvent::CounterRegressed {
                held,
                reported: sample.landmark_count,
            });
        }
        if let Some(link) = applied.link_changed {
            info!(?link, "console: link state changed");
            let _ = self.events.send(ConsoleEvent::LinkStateChanged(link));
        }
        if let (Some(first), Some(last)) = (applied.appended.first(), applied.appended.last()) {
            info!(
                first = first.id.0,
                last = last.id.0,
                "timeline: landmarks reconciled"
            );
            let _ = self
                .events
                .send(ConsoleEvent::LandmarksAppended(applied.appended.clone()));
        }
        let _ = self.events.send(ConsoleEvent::StatusUpdated(sample));
    }

    async fn reject(&self, error: ConsoleError) {
        let link_changed = {
            let mut guard = self.shared.write().await;
            if !guard.accepting {
                return;
            }
            guard.state.record_failure()
        };

        if let Some(link) = link_changed {
            warn!(?link, "console: link state changed");
            let _ = self.events.send(ConsoleEvent::LinkStateChanged(link));
        }
        let _ = self.events.send(ConsoleEvent::PollFailed {
            kind: error.kind(),
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
