//! Subtask notes and the day-to-day countdown engine.
//!
//! Notes persist across days keyed by the exact textual name of their owning
//! event. The name-based matching is the documented contract: renaming an
//! event detaches its notes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timeline::{EventKind, Timeline};

/// Countdown state of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum Countdown {
    /// `[]` -- persists forever
    Unbounded,
    /// `[n]` / `[n*m]` -- evaluated once at creation, then decremented by
    /// one per matching compiled occurrence
    Remaining(u32),
}

/// Free text attached to a task, with optional countdown state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskNote {
    pub text: String,
    /// `None` for a plain persistent note without brackets.
    #[serde(default)]
    pub countdown: Option<Countdown>,
}

impl SubtaskNote {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            countdown: None,
        }
    }

    pub fn unbounded(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            countdown: Some(Countdown::Unbounded),
        }
    }

    pub fn counted(text: impl Into<String>, sessions: u32) -> Self {
        Self {
            text: text.into(),
            countdown: Some(Countdown::Remaining(sessions)),
        }
    }

    /// Display form: `[14] Read chapter` / `[] Stretch` / `Stretch`.
    pub fn render(&self) -> String {
        match self.countdown {
            Some(Countdown::Remaining(n)) => format!("[{n}] {}", self.text),
            Some(Countdown::Unbounded) => format!("[] {}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Notes keyed by exact, case-sensitive event name.
pub type NoteBook = BTreeMap<String, Vec<SubtaskNote>>;

/// Roll the note book forward over a newly compiled day.
///
/// For every matching Fixed/Flexible occurrence in the timeline a
/// `Remaining` countdown loses exactly one session (never one per calendar
/// day); notes reaching zero are dropped. Split tasks count once -- the
/// resume half carries the `continuation` flag. Names with no occurrence
/// that day are carried forward untouched. Prayer and wake-up events never
/// carry notes.
pub fn advance_day(notes: &NoteBook, timeline: &Timeline) -> NoteBook {
    let mut updated = NoteBook::new();
    for (event_name, event_notes) in notes {
        let occurrences = timeline
            .events
            .iter()
            .filter(|e| {
                matches!(e.kind, EventKind::Fixed | EventKind::Flexible)
                    && !e.continuation
                    && e.name == *event_name
            })
            .count() as u32;

        let mut kept = Vec::with_capacity(event_notes.len());
        for note in event_notes {
            match note.countdown {
                Some(Countdown::Remaining(n)) if occurrences > 0 => {
                    let left = n.saturating_sub(occurrences);
                    if left > 0 {
                        kept.push(SubtaskNote::counted(note.text.clone(), left));
                    }
                    // Dropped entirely once the countdown reaches zero.
                }
                _ => kept.push(note.clone()),
            }
        }
        if !kept.is_empty() {
            updated.insert(event_name.clone(), kept);
        }
    }
    updated
}
