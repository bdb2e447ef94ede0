//! High-water-mark deduplication of the event log.
//!
//! The event page always returns the device's most recent N entries, so
//! consecutive polls overlap. An entry is emitted only when its first-seen
//! time is not older than the newest entry already emitted.

use chrono::NaiveDateTime;

use crate::modem::event::{EventRecord, EventTime};

/// The newest event time emitted so far.
///
/// Variant order matters: `NoEmissionYet` sorts before every timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum HighWaterMark {
    #[default]
    NoEmissionYet,
    At(NaiveDateTime),
}

/// Outcome of offering one event to the dedup state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Emit,
    Suppress,
}

/// Per-endpoint dedup state. Lives as long as the collector.
#[derive(Debug, Default)]
pub struct DedupState {
    mark: HighWaterMark,
    /// Device indexes of the entries emitted at exactly `mark`.
    at_mark: Vec<String>,
}

impl DedupState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) -> HighWaterMark {
        self.mark
    }

    /// Starts evaluating one poll's worth of rows.
    pub fn begin_poll(&mut self) -> PollWindow<'_> {
        let carried = self.mark;
        let carried_indexes = self.at_mark.clone();
        PollWindow {
            state: self,
            carried,
            carried_indexes,
        }
    }
}

/// Evaluates the rows of a single poll, in device order.
///
/// `carried` is the mark as it stood before this poll. An entry stamped
/// exactly at that time was already emitted by an earlier poll if its device
/// index is one of `carried_indexes`, or if it has no index at all. Entries
/// sharing a timestamp inside this poll are distinct events.
pub struct PollWindow<'a> {
    state: &'a mut DedupState,
    carried: HighWaterMark,
    carried_indexes: Vec<String>,
}

impl PollWindow<'_> {
    pub fn admit(&mut self, event: &EventRecord) -> Admission {
        // Sentinel and unparseable times resolve to the current mark, which
        // can never be newer than itself.
        let EventTime::At(t) = &event.first_time else {
            return Admission::Suppress;
        };
        let effective = HighWaterMark::At(*t);

        if self.state.mark > effective || self.already_emitted(effective, &event.index) {
            return Admission::Suppress;
        }

        if effective > self.state.mark {
            self.state.mark = effective;
            self.state.at_mark.clear();
        }
        self.state.at_mark.push(event.index.clone());
        Admission::Emit
    }

    fn already_emitted(&self, effective: HighWaterMark, index: &str) -> bool {
        effective == self.carried
            && (index.is_empty() || self.carried_indexes.iter().any(|i| i == index))
    }

    /// Filters rows down to the ones not yet emitted, preserving order.
    pub fn retain_new(&mut self, events: Vec<EventRecord>) -> Vec<EventRecord> {
        events
            .into_iter()
            .filter(|event| self.admit(event) == Admission::Emit)
            .collect()
    }
}
