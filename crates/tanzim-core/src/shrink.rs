//! Live re-planning after an unplanned interruption.
//!
//! An interruption eats a span of the compiled day. The shrinker carves an
//! `Unplanned Surprise` event out of that span, then proportionally rescales
//! the flexible events scheduled after it so the day still ends exactly 24
//! hours after wake-up. Fixed and prayer events are never rescaled; the
//! rescaled tail is re-placed with the same single-pass engine the compiler
//! uses, so prayers land correctly even when shrinking shifted the task
//! they intersect.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::compiler::{FixedSlot, PlacementEngine, PrayerSlot};
use crate::error::ShrinkError;
use crate::prayer::{KerahatWindow, Prayer};
use crate::recurrence::SubtaskNote;
use crate::timeline::{CompiledEvent, EventKind, Timeline};

/// Name given to the event absorbing an interruption.
pub const UNPLANNED_NAME: &str = "Unplanned Surprise";

/// What produced the interruption measurement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterruptionCause {
    /// Open-ended stopwatch, stopped by the user.
    Chronometer,
    /// Countdown timer that ran out or was stopped early.
    Timer,
}

/// A measured interruption, ready to hand to [`shrink`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnplannedSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub cause: InterruptionCause,
}

impl UnplannedSpan {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// A flexible segment waiting to be re-placed after the interruption.
struct TailTask {
    name: String,
    minutes: i64,
    notes: Vec<SubtaskNote>,
    resumed: bool,
    /// Only events starting after the span are rescaled; the interrupted
    /// event's own resume keeps its remaining duration.
    rescale: bool,
}

/// Absorb `span` into `timeline`.
///
/// The event under the span is split before/after; everything after the
/// span is re-placed from the span's end, with flexible durations scaled by
/// `(plannable - deficit) / plannable` to the nearest minute. Any rounding
/// remainder lands on the last rescaled flexible event, so the output still
/// covers exactly 24 hours. On [`ShrinkError::Unabsorbable`] the input
/// timeline is returned untouched by virtue of never being mutated.
pub fn shrink(
    timeline: &Timeline,
    span: &UnplannedSpan,
    kerahat: &[KerahatWindow],
) -> Result<Timeline, ShrinkError> {
    let deficit = span.duration();
    if deficit <= Duration::zero() {
        return Ok(timeline.clone());
    }

    let plannable: Duration = timeline
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Flexible && e.start >= span.end)
        .fold(Duration::zero(), |acc, e| acc + e.duration());
    if plannable <= deficit {
        return Err(ShrinkError::Unabsorbable {
            deficit_minutes: deficit.num_minutes(),
            plannable_minutes: plannable.num_minutes(),
        });
    }

    // Everything ending at or before the span survives as-is; the event
    // under the span keeps its opening segment.
    let mut events: Vec<CompiledEvent> = Vec::new();
    for event in &timeline.events {
        if event.end <= span.start && (event.start < span.start || event.duration().is_zero()) {
            events.push(event.clone());
        } else if event.start < span.start {
            let mut head = event.clone();
            head.end = span.start;
            events.push(head);
        }
    }
    events.push(CompiledEvent {
        name: UNPLANNED_NAME.to_string(),
        kind: EventKind::Unplanned,
        start: span.start,
        end: span.end,
        continuation: false,
        notes: Vec::new(),
    });

    // Gather the tail. Each overlapped event resumes with its remaining
    // duration measured from the interruption's start, so the split
    // preserves its declared total; the deficit is paid by the rescale.
    let mut tasks: Vec<TailTask> = Vec::new();
    let mut prayers: Vec<PrayerSlot> = Vec::new();
    let mut fixed: Vec<FixedSlot> = Vec::new();
    for event in &timeline.events {
        if event.end <= span.start || event.duration().is_zero() {
            continue;
        }
        let carried = event.end - event.start.max(span.start);
        let cut = event.start < span.end;
        match event.kind {
            EventKind::Flexible => tasks.push(TailTask {
                name: event.name.clone(),
                minutes: carried.num_minutes(),
                notes: if cut { Vec::new() } else { event.notes.clone() },
                resumed: event.continuation || cut,
                rescale: !cut,
            }),
            EventKind::Prayer => match Prayer::from_keyword(&event.name) {
                Some(prayer) => prayers.push(PrayerSlot {
                    prayer,
                    start: event.start.max(span.end),
                    duration: carried,
                }),
                None => fixed.push(tail_fixed(event, span.end, carried)),
            },
            EventKind::Fixed | EventKind::Unplanned => {
                fixed.push(tail_fixed(event, span.end, carried));
            }
            EventKind::Wakeup => {}
        }
    }

    // Scale in whole minutes, round half up; the remainder goes to the
    // last rescaled task so the flexible tail sums to plannable - deficit.
    let p = plannable.num_minutes();
    let target = p - deficit.num_minutes();
    let mut scaled_total = 0i64;
    let mut last_rescaled: Option<usize> = None;
    for (idx, task) in tasks.iter_mut().enumerate() {
        if task.rescale {
            task.minutes = (task.minutes * target + p / 2) / p;
            scaled_total += task.minutes;
            last_rescaled = Some(idx);
        }
    }
    if let Some(idx) = last_rescaled {
        tasks[idx].minutes += target - scaled_total;
    }

    let wake = events.first().map_or(span.start, |e| e.start);
    let day_end = wake + Duration::hours(24);
    let normalize = |t: chrono::NaiveTime| -> NaiveDateTime {
        let dt = timeline.date.and_time(t);
        if dt < wake {
            dt + Duration::days(1)
        } else {
            dt
        }
    };
    let kerahat_spans: Vec<(NaiveDateTime, NaiveDateTime)> = kerahat
        .iter()
        .map(|w| (normalize(w.start), normalize(w.end)))
        .collect();

    let mut engine = PlacementEngine::new(span.end, prayers, fixed, kerahat_spans);
    for task in tasks {
        if task.minutes > 0 {
            engine.place_relative(
                &task.name,
                Duration::minutes(task.minutes),
                task.notes,
                task.resumed,
            );
        }
    }
    let (tail, _, _) = engine.finish(day_end);
    events.extend(tail);

    Ok(Timeline {
        date: timeline.date,
        events,
    })
}

fn tail_fixed(event: &CompiledEvent, resume_at: NaiveDateTime, carried: Duration) -> FixedSlot {
    FixedSlot {
        name: event.name.clone(),
        start: event.start.max(resume_at),
        duration: carried,
        kind: event.kind,
        notes: event.notes.clone(),
        line: None,
        drift_check: false,
    }
}
