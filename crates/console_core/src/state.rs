use chrono::{DateTime, Utc};
use shared::protocol::StatusSample;

use crate::timeline::{reconcile, Timeline, TimelineEntry};

pub const DEFAULT_LINK_LOSS_THRESHOLD: u32 = 3;

/// Freshness of the displayed status as seen from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Connecting,
    Online,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleApplied {
    pub appended: Vec<TimelineEntry>,
    pub counter_regressed: bool,
    pub link_changed: Option<LinkState>,
}

/// The single authoritative store for a console session.
///
/// Status and timeline only change through [`ConsoleState::apply_sample`] and
/// [`ConsoleState::record_failure`].
#[derive(Debug, Clone)]
pub struct ConsoleState {
    status: StatusSample,
    timeline: Timeline,
    link: LinkState,
    consecutive_failures: u32,
    link_loss_threshold: u32,
    last_sample_at: Option<DateTime<Utc>>,
    counter_regressions: u64,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_LOSS_THRESHOLD)
    }
}

impl ConsoleState {
    pub fn new(link_loss_threshold: u32) -> Self {
        Self {
            status: StatusSample::default(),
            timeline: Timeline::default(),
            link: LinkState::Connecting,
            consecutive_failures: 0,
            link_loss_threshold: link_loss_threshold.max(1),
            last_sample_at: None,
            counter_regressions: 0,
        }
    }

    pub fn status(&self) -> &StatusSample {
        &self.status
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn last_sample_at(&self) -> Option<DateTime<Utc>> {
        self.last_sample_at
    }

    pub fn counter_regressions(&self) -> u64 {
        self.counter_regressions
    }

    /// Reconciles the timeline against `sample`, then makes it the displayed status.
    pub fn apply_sample(&mut self, sample: StatusSample, now: DateTime<Utc>) -> SampleApplied {
        let reconciliation = reconcile(&sample, self.timeline.len(), now);
        self.timeline.append(&reconciliation.entries);
        if reconciliation.counter_regressed {
            self.counter_regressions += 1;
        }

        self.status = sample;
        self.last_sample_at = Some(now);
        self.consecutive_failures = 0;

        SampleApplied {
            appended: reconciliation.entries,
            counter_regressed: reconciliation.counter_regressed,
            link_changed: self.set_link(LinkState::Online),
        }
    }

    /// Counts a poll cycle that produced no usable sample. The displayed status is kept.
    pub fn record_failure(&mut self) -> Option<LinkState> {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.consecutive_failures >= self.link_loss_threshold {
            self.set_link(LinkState::Lost)
        } else {
            None
        }
    }

    fn set_link(&mut self, link: LinkState) -> Option<LinkState> {
        if self.link == link {
            return None;
        }
        self.link = link;
        Some(link)
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
