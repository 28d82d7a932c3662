use chrono::{DateTime, Utc};
use shared::{
    domain::{LandmarkId, Mode},
    protocol::StatusSample,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub id: LandmarkId,
    /// Client clock at reconciliation; the remote does not report capture times.
    pub captured_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    pub entries: Vec<TimelineEntry>,
    /// The remote reported fewer landmarks than are held locally. Nothing is undone.
    pub counter_regressed: bool,
}

/// Derives the entries to append for `sample` when `held` entries already exist.
///
/// Only EXPLORE samples whose counter exceeds `held` produce entries, with ids
/// `held..landmark_count`, all stamped with `now`. Every other sample is a no-op,
/// including a counter that went backwards after a remote restart: the timeline
/// then stalls until the counter passes the held count again.
pub fn reconcile(sample: &StatusSample, held: usize, now: DateTime<Utc>) -> Reconciliation {
    let held = u64::try_from(held).unwrap_or(u64::MAX);
    let counter_regressed = sample.landmark_count < held;

    if sample.mode != Mode::Explore || sample.landmark_count <= held {
        return Reconciliation {
            entries: Vec::new(),
            counter_regressed,
        };
    }

    let entries = (held..sample.landmark_count)
        .map(|id| TimelineEntry {
            id: LandmarkId(id),
            captured_at: now,
        })
        .collect();
    Reconciliation {
        entries,
        counter_regressed,
    }
}

/// Append-only landmark log for one console session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }

    /// Display order of the landmark log.
    pub fn newest_first(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.entries.iter().rev()
    }

    pub(crate) fn append(&mut self, entries: &[TimelineEntry]) {
        debug_assert!(entries
            .iter()
            .enumerate()
            .all(|(offset, entry)| entry.id.0 == (self.entries.len() + offset) as u64));
        self.entries.extend_from_slice(entries);
    }
}

#[cfg(test)]
#[path = "tests/timeline_tests.rs"]
mod tests;
