//! Canonical export for the calendar/task sync collaborator.
//!
//! The core only supplies the canonical ordered list; diffing against prior
//! exports, calendar API calls and task-list naming all live on the
//! collaborator's side. Every entry is marked weekly-recurring, keyed by
//! weekday and template identity downstream.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::recurrence::NoteBook;
use crate::timeline::{EventKind, Timeline};

/// One exported calendar entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportEntry {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub is_recurring_weekly: bool,
    /// Rendered note lines, live countdown included.
    pub attached_notes: Vec<String>,
}

/// Flatten a compiled day into the canonical export list.
///
/// The wake-up marker is excluded. Notes come from the persistent note book
/// when it holds an entry for the event's name (so countdowns reflect the
/// current state), otherwise from the notes parsed with the template; the
/// resume half of a split task carries none.
pub fn export_timeline(timeline: &Timeline, notes: &NoteBook) -> Vec<ExportEntry> {
    timeline
        .events
        .iter()
        .filter(|e| e.kind != EventKind::Wakeup)
        .map(|event| {
            let attached_notes = if event.continuation {
                Vec::new()
            } else {
                notes
                    .get(&event.name)
                    .map(|live| live.iter().map(|n| n.render()).collect())
                    .unwrap_or_else(|| event.notes.iter().map(|n| n.render()).collect())
            };
            ExportEntry {
                name: event.name.clone(),
                start: event.start,
                end: event.end,
                is_recurring_weekly: true,
                attached_notes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::SubtaskNote;
    use crate::timeline::CompiledEvent;
    use chrono::{Duration, NaiveDate};

    fn sample() -> Timeline {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let wake = day.and_hms_opt(5, 0, 0).unwrap();
        let mk = |name: &str, kind, start, minutes, continuation, notes| CompiledEvent {
            name: name.to_string(),
            kind,
            start: wake + Duration::minutes(start),
            end: wake + Duration::minutes(start + minutes),
            continuation,
            notes,
        };
        Timeline {
            date: day,
            events: vec![
                mk("Wake-up", EventKind::Wakeup, 0, 0, false, Vec::new()),
                mk(
                    "Study",
                    EventKind::Flexible,
                    0,
                    10,
                    false,
                    vec![SubtaskNote::counted("Read chapter", 14)],
                ),
                mk("Fajr", EventKind::Prayer, 10, 10, false, Vec::new()),
                mk("Study", EventKind::Flexible, 20, 110, true, Vec::new()),
            ],
        }
    }

    #[test]
    fn wakeup_is_excluded_and_everything_recurs_weekly() {
        let entries = export_timeline(&sample(), &NoteBook::new());
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.name != "Wake-up"));
        assert!(entries.iter().all(|e| e.is_recurring_weekly));
    }

    #[test]
    fn live_note_book_overrides_parsed_notes() {
        let mut book = NoteBook::new();
        book.insert(
            "Study".to_string(),
            vec![SubtaskNote::counted("Read chapter", 13)],
        );
        let entries = export_timeline(&sample(), &book);
        assert_eq!(entries[0].attached_notes, vec!["[13] Read chapter"]);
        // The resume half of the split never duplicates notes.
        assert!(entries[2].attached_notes.is_empty());
    }

    #[test]
    fn parsed_notes_are_the_fallback() {
        let entries = export_timeline(&sample(), &NoteBook::new());
        assert_eq!(entries[0].attached_notes, vec!["[14] Read chapter"]);
    }
}
