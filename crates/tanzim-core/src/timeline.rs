//! Compiled day timeline.
//!
//! A [`Timeline`] is an ordered, contiguous, non-overlapping sequence of
//! events covering `[wakeup, wakeup + 24h)` -- every second of the day
//! belongs to exactly one event. The only zero-length event is the leading
//! wake-up marker.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::recurrence::SubtaskNote;

/// Kind of compiled event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Immovable, absolute-time-boundary event ("thabbat")
    Fixed,
    /// Duration-only event whose placement depends on preceding events
    Flexible,
    Prayer,
    /// Zero-length marker opening the day
    Wakeup,
    /// Interruption absorbed by the shrinker
    Unplanned,
}

/// One placed event on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompiledEvent {
    pub name: String,
    pub kind: EventKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// True for the resume half of a split task. A split task counts as a
    /// single occurrence for recurrence purposes.
    #[serde(default)]
    pub continuation: bool,
    #[serde(default)]
    pub notes: Vec<SubtaskNote>,
}

impl CompiledEvent {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// A compiled, fully time-stamped day plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timeline {
    pub date: NaiveDate,
    pub events: Vec<CompiledEvent>,
}

impl Timeline {
    /// Start of the day: the wake-up marker's timestamp.
    pub fn wakeup(&self) -> Option<NaiveDateTime> {
        self.events.first().map(|e| e.start)
    }

    /// `events[i].end == events[i+1].start` for all i, and the day spans
    /// exactly 24 hours.
    pub fn is_contiguous(&self) -> bool {
        let Some(first) = self.events.first() else {
            return false;
        };
        let mut cursor = first.start;
        for event in &self.events {
            if event.start != cursor || event.end < event.start {
                return false;
            }
            cursor = event.end;
        }
        cursor - first.start == Duration::hours(24)
    }

    pub fn total_duration(&self) -> Duration {
        self.events
            .iter()
            .fold(Duration::zero(), |acc, e| acc + e.duration())
    }

    /// Index of the event owning `moment`, if any.
    pub fn occupant_index(&self, moment: NaiveDateTime) -> Option<usize> {
        self.events
            .iter()
            .position(|e| e.start <= moment && moment < e.end)
    }

    /// Sum of flexible time placed at or after `moment` (partial overlap
    /// counts only the part at or after `moment`).
    pub fn flexible_duration_after(&self, moment: NaiveDateTime) -> Duration {
        self.events
            .iter()
            .filter(|e| e.kind == EventKind::Flexible && e.end > moment)
            .fold(Duration::zero(), |acc, e| {
                let from = e.start.max(moment);
                acc + (e.end - from)
            })
    }
}
