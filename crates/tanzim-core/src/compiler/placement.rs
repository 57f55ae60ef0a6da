//! Single-pass placement fold.
//!
//! The engine walks the day with a moving cursor, carrying two pending
//! queues: prayer slots and fixed placements, both sorted by start. Relative
//! tasks consume duration from the cursor and split around whichever
//! boundary comes first; fixed placements keep their absolute spans and pin
//! the flow; prayers defer past fixed spans and kerahat windows. No
//! backtracking -- each boundary is placed exactly once.

use chrono::{Duration, NaiveDateTime};
use std::collections::VecDeque;

use crate::error::{Diagnostic, DiagnosticKind};
use crate::prayer::Prayer;
use crate::recurrence::SubtaskNote;
use crate::timeline::{CompiledEvent, EventKind};
use crate::timeutil::format_hhmm;

/// Name given to gap-filling flexible events.
pub(crate) const FILLER_NAME: &str = "Free time";

/// A prayer waiting to be carved into the day.
#[derive(Debug, Clone)]
pub(crate) struct PrayerSlot {
    pub prayer: Prayer,
    pub start: NaiveDateTime,
    pub duration: Duration,
}

/// A pre-placed absolute-time event waiting for the cursor to reach it.
#[derive(Debug, Clone)]
pub(crate) struct FixedSlot {
    pub name: String,
    pub start: NaiveDateTime,
    pub duration: Duration,
    /// `Fixed` for thabbat tasks, `Prayer` for pre-committed aliases.
    pub kind: EventKind,
    pub notes: Vec<SubtaskNote>,
    pub line: Option<u32>,
    /// Emit a drift advisory when placed later than declared. Synthetic
    /// slots built by the shrinker opt out.
    pub drift_check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Fixed,
    Prayer,
}

pub(crate) struct PlacementEngine {
    cursor: NaiveDateTime,
    prayers: VecDeque<PrayerSlot>,
    fixed: VecDeque<FixedSlot>,
    /// Declared spans of every fixed slot, for prayer deferral.
    fixed_spans: Vec<(NaiveDateTime, NaiveDateTime)>,
    kerahat: Vec<(NaiveDateTime, NaiveDateTime)>,
    events: Vec<CompiledEvent>,
    diagnostics: Vec<Diagnostic>,
}

impl PlacementEngine {
    pub fn new(
        start: NaiveDateTime,
        mut prayers: Vec<PrayerSlot>,
        mut fixed: Vec<FixedSlot>,
        kerahat: Vec<(NaiveDateTime, NaiveDateTime)>,
    ) -> Self {
        prayers.sort_by_key(|slot| slot.start);
        fixed.sort_by_key(|slot| slot.start);
        let fixed_spans = fixed
            .iter()
            .map(|slot| (slot.start, slot.start + slot.duration))
            .collect();
        Self {
            cursor: start,
            prayers: prayers.into(),
            fixed: fixed.into(),
            fixed_spans,
            kerahat,
            events: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Consume a relative task's declared duration from the cursor,
    /// splitting around any boundary falling strictly inside it. The total
    /// consumed duration is preserved: before + resume equals the declared
    /// duration, so slipped time propagates to everything that follows.
    ///
    /// `resumed` marks a task whose opening segment was already placed
    /// earlier (shrink tail rebuild): every emitted segment is then a
    /// continuation and carries no notes of its own.
    pub fn place_relative(
        &mut self,
        name: &str,
        duration: Duration,
        notes: Vec<SubtaskNote>,
        resumed: bool,
    ) {
        let mut remaining = duration;
        let mut notes = Some(notes);
        let mut first = !resumed;
        while remaining > Duration::zero() {
            match self.next_boundary() {
                Some((time, which)) if time < self.cursor + remaining => {
                    if time > self.cursor {
                        let chunk = time - self.cursor;
                        self.push_flexible(name, chunk, notes.take().unwrap_or_default(), !first);
                        first = false;
                        remaining -= chunk;
                    }
                    self.place_boundary(which);
                }
                _ => {
                    self.push_flexible(name, remaining, notes.take().unwrap_or_default(), !first);
                    remaining = Duration::zero();
                }
            }
        }
    }

    /// Place everything still pending, then close the day.
    pub fn finish(
        mut self,
        day_end: NaiveDateTime,
    ) -> (Vec<CompiledEvent>, Vec<Diagnostic>, NaiveDateTime) {
        while let Some((_, which)) = self.next_boundary() {
            self.place_boundary(which);
        }
        if self.cursor < day_end {
            self.fill_gap_to(day_end);
        }
        (self.events, self.diagnostics, self.cursor)
    }

    fn next_boundary(&self) -> Option<(NaiveDateTime, Boundary)> {
        let fixed = self.fixed.front().map(|slot| (slot.start, Boundary::Fixed));
        let prayer = self
            .prayers
            .front()
            .map(|slot| (self.effective_prayer_start(slot), Boundary::Prayer));
        match (fixed, prayer) {
            (Some(f), Some(p)) => Some(if f.0 <= p.0 { f } else { p }),
            (fixed, prayer) => fixed.or(prayer),
        }
    }

    fn place_boundary(&mut self, which: Boundary) {
        match which {
            Boundary::Fixed => self.place_fixed(),
            Boundary::Prayer => self.place_prayer(),
        }
    }

    fn place_fixed(&mut self) {
        let Some(slot) = self.fixed.pop_front() else {
            return;
        };
        if slot.start > self.cursor {
            self.fill_gap_to(slot.start);
        }
        let placed = self.cursor.max(slot.start);
        if slot.drift_check && placed > slot.start {
            self.diagnostics.push(Diagnostic::advisory(
                slot.line,
                DiagnosticKind::Drift {
                    event: slot.name.clone(),
                    expected: format_hhmm(slot.start.time()),
                    found: format_hhmm(placed.time()),
                },
            ));
        }
        self.events.push(CompiledEvent {
            name: slot.name,
            kind: slot.kind,
            start: placed,
            end: placed + slot.duration,
            continuation: false,
            notes: slot.notes,
        });
        self.cursor = placed + slot.duration;
    }

    fn place_prayer(&mut self) {
        let Some(slot) = self.prayers.pop_front() else {
            return;
        };
        let effective = self.effective_prayer_start(&slot);
        if effective > self.cursor {
            self.fill_gap_to(effective);
        }
        let placed = self.cursor.max(effective);
        self.events.push(CompiledEvent {
            name: slot.prayer.name().to_string(),
            kind: EventKind::Prayer,
            start: placed,
            end: placed + slot.duration,
            continuation: false,
            notes: Vec::new(),
        });
        self.cursor = placed + slot.duration;
    }

    /// The natural insertion point is the provider-given start; a point
    /// inside a fixed span defers to immediately after that span (the fixed
    /// task is never split), and a point inside a kerahat window defers to
    /// the window's end.
    fn effective_prayer_start(&self, slot: &PrayerSlot) -> NaiveDateTime {
        let mut moment = slot.start;
        loop {
            let mut moved = false;
            for &(start, end) in &self.fixed_spans {
                if start <= moment && moment < end {
                    moment = end;
                    moved = true;
                }
            }
            for &(start, end) in &self.kerahat {
                if start <= moment && moment < end {
                    moment = end;
                    moved = true;
                }
            }
            if !moved {
                return moment;
            }
        }
    }

    fn push_flexible(
        &mut self,
        name: &str,
        duration: Duration,
        notes: Vec<SubtaskNote>,
        continuation: bool,
    ) {
        let start = self.cursor;
        self.cursor += duration;
        self.events.push(CompiledEvent {
            name: name.to_string(),
            kind: EventKind::Flexible,
            start,
            end: self.cursor,
            continuation,
            notes,
        });
    }

    fn fill_gap_to(&mut self, until: NaiveDateTime) {
        let start = self.cursor;
        self.cursor = until;
        self.events.push(CompiledEvent {
            name: FILLER_NAME.to_string(),
            kind: EventKind::Flexible,
            start,
            end: until,
            continuation: false,
            notes: Vec::new(),
        });
    }
}
