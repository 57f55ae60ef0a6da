//! Schedule compiler: qalib entries + prayer timetable -> timeline.
//!
//! Compilation is pure and deterministic: for the same template, timetable,
//! kerahat windows and options it produces an identical [`Timeline`] value.
//! Fatal structural violations abort with no timeline; drift findings are
//! advisory and travel next to a still-valid timeline.

mod placement;

pub(crate) use placement::{FixedSlot, PlacementEngine, PrayerSlot};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Diagnostic};
use crate::prayer::{KerahatWindow, Prayer, PrayerTimetable};
use crate::qalib::{AliasSpec, EntryKind, ParsedTemplate};
use crate::timeline::{CompiledEvent, EventKind, Timeline};

/// Name of the zero-length marker opening every compiled day.
pub const WAKEUP_NAME: &str = "Wake-up";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Minimum gap between wake-up and Fajr's start.
    #[serde(default = "default_wake_margin_minutes")]
    pub wake_margin_minutes: i64,
}

fn default_wake_margin_minutes() -> i64 {
    20
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            wake_margin_minutes: default_wake_margin_minutes(),
        }
    }
}

/// A successful compile: the timeline, advisory diagnostics, and the
/// day's plannable duration (24h minus prayers minus sleep). `to_plan`
/// depends only on declared durations, never on placement.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    pub timeline: Timeline,
    pub diagnostics: Vec<Diagnostic>,
    pub to_plan: Duration,
}

pub fn compile(
    template: &ParsedTemplate,
    date: NaiveDate,
    timetable: &PrayerTimetable,
    kerahat: &[KerahatWindow],
    options: &CompileOptions,
) -> Result<CompileOutcome, CompileError> {
    let wake_dt = date.and_time(template.wakeup);
    let day_end = wake_dt + Duration::hours(24);

    // Step 1a: the wake-up must precede Fajr by the configured margin.
    let fajr = timetable.window(Prayer::Fajr);
    if wake_dt + Duration::minutes(options.wake_margin_minutes) > date.and_time(fajr.start) {
        return Err(CompileError::WakeupTooLateForFajr {
            wakeup: template.wakeup,
            fajr: fajr.start,
            margin_minutes: options.wake_margin_minutes,
        });
    }

    // Times earlier than the wake-up belong to the tail of the day.
    let normalize = |t: NaiveTime| -> NaiveDateTime {
        let dt = date.and_time(t);
        if dt < wake_dt {
            dt + Duration::days(1)
        } else {
            dt
        }
    };

    let kerahat_spans: Vec<(NaiveDateTime, NaiveDateTime)> = kerahat
        .iter()
        .map(|w| (normalize(w.start), normalize(w.end)))
        .collect();

    // Step 1b: gather fixed placements and pre-committed prayers.
    let mut fixed_slots: Vec<FixedSlot> = Vec::new();
    let mut overrides: Vec<(Prayer, Duration)> = Vec::new();
    let mut committed: Vec<Prayer> = Vec::new();

    for entry in &template.entries {
        match &entry.kind {
            EntryKind::FixedTask {
                start, end, name, notes,
            } => {
                fixed_slots.push(FixedSlot {
                    name: name.clone(),
                    start: normalize(*start),
                    duration: *end - *start,
                    kind: EventKind::Fixed,
                    notes: notes.clone(),
                    line: Some(entry.line),
                    drift_check: true,
                });
            }
            EntryKind::PrayerAlias { prayer, spec } => match spec {
                AliasSpec::Absolute { start, end } => {
                    validate_forced_placement(
                        *prayer,
                        normalize(*start),
                        normalize(*end),
                        timetable,
                        &kerahat_spans,
                        &normalize,
                    )?;
                    committed.push(*prayer);
                    fixed_slots.push(FixedSlot {
                        name: prayer.name().to_string(),
                        start: normalize(*start),
                        duration: *end - *start,
                        kind: EventKind::Prayer,
                        notes: Vec::new(),
                        line: Some(entry.line),
                        drift_check: true,
                    });
                }
                AliasSpec::Relative(duration) => {
                    let window = timetable.window(*prayer);
                    if *duration > window.end - window.start {
                        return Err(CompileError::PrayerWindowMismatch {
                            prayer: prayer.name().to_string(),
                            window_start: window.start,
                            window_end: window.end,
                            found_start: window.start,
                            found_end: window.start + *duration,
                        });
                    }
                    overrides.push((*prayer, *duration));
                }
            },
            EntryKind::RelativeTask { .. } => {}
        }
    }

    // Step 1c: no two fixed placements may overlap.
    let mut spans: Vec<(NaiveDateTime, NaiveDateTime, &str)> = fixed_slots
        .iter()
        .map(|s| (s.start, s.start + s.duration, s.name.as_str()))
        .collect();
    spans.sort_by_key(|(start, _, _)| *start);
    let mut last: Option<(NaiveDateTime, &str)> = None;
    for &(start, end, name) in &spans {
        if let Some((last_end, last_name)) = last {
            if start < last_end {
                return Err(CompileError::FixedOverlap {
                    first: last_name.to_string(),
                    second: name.to_string(),
                });
            }
        }
        last = Some((last.map_or(end, |(e, _)| e.max(end)), name));
    }

    // Step 2 preparation: one slot per prayer not already pre-committed.
    let prayer_slots: Vec<PrayerSlot> = timetable
        .windows
        .iter()
        .filter(|w| !committed.contains(&w.prayer))
        .map(|w| {
            let duration = overrides
                .iter()
                .find(|(p, _)| *p == w.prayer)
                .map(|(_, d)| *d)
                .unwrap_or(w.end - w.start);
            PrayerSlot {
                prayer: w.prayer,
                start: normalize(w.start),
                duration,
            }
        })
        .collect();

    // Steps 2-4: the single-pass fold.
    let mut engine = PlacementEngine::new(wake_dt, prayer_slots, fixed_slots, kerahat_spans);
    for entry in &template.entries {
        if let EntryKind::RelativeTask {
            duration,
            name,
            notes,
            ..
        } = &entry.kind
        {
            engine.place_relative(name, *duration, notes.clone(), false);
        }
    }
    let (mut events, drift, cursor) = engine.finish(day_end);

    // Step 5: the day must fit in 24 hours.
    if cursor > day_end {
        return Err(CompileError::Overcommitted {
            overrun_minutes: (cursor - day_end).num_minutes(),
        });
    }

    events.insert(
        0,
        CompiledEvent {
            name: WAKEUP_NAME.to_string(),
            kind: EventKind::Wakeup,
            start: wake_dt,
            end: wake_dt,
            continuation: false,
            notes: Vec::new(),
        },
    );

    let mut diagnostics = template.advisories.clone();
    diagnostics.extend(drift);

    Ok(CompileOutcome {
        timeline: Timeline { date, events },
        diagnostics,
        to_plan: to_plan_duration(template, timetable, &overrides),
    })
}

/// Step 6: `24h - sum of prayer durations - sleep duration (if present)`.
/// Changes only when prayer durations or the sleep event's declared length
/// change, never per-compile.
fn to_plan_duration(
    template: &ParsedTemplate,
    timetable: &PrayerTimetable,
    overrides: &[(Prayer, Duration)],
) -> Duration {
    let mut prayers = Duration::zero();
    for window in &timetable.windows {
        let declared = overrides
            .iter()
            .find(|(p, _)| *p == window.prayer)
            .map(|(_, d)| *d)
            .unwrap_or(window.end - window.start);
        prayers = prayers + declared;
    }
    let sleep = template
        .entries
        .iter()
        .find_map(|entry| match &entry.kind {
            EntryKind::RelativeTask { duration, name, .. }
                if name.eq_ignore_ascii_case("sleep") =>
            {
                Some(*duration)
            }
            EntryKind::FixedTask {
                start, end, name, ..
            } if name.eq_ignore_ascii_case("sleep") => Some(*end - *start),
            _ => None,
        })
        .unwrap_or_else(Duration::zero);
    Duration::hours(24) - prayers - sleep
}

/// A user-forced prayer placement must sit inside the canonical window and
/// outside every kerahat window; both violations are fatal.
fn validate_forced_placement(
    prayer: Prayer,
    start: NaiveDateTime,
    end: NaiveDateTime,
    timetable: &PrayerTimetable,
    kerahat: &[(NaiveDateTime, NaiveDateTime)],
    normalize: &impl Fn(NaiveTime) -> NaiveDateTime,
) -> Result<(), CompileError> {
    let window = timetable.window(prayer);
    let window_start = normalize(window.start);
    let window_end = normalize(window.end);
    if start < window_start || end > window_end {
        return Err(CompileError::PrayerWindowMismatch {
            prayer: prayer.name().to_string(),
            window_start: window.start,
            window_end: window.end,
            found_start: start.time(),
            found_end: end.time(),
        });
    }
    for &(k_start, k_end) in kerahat {
        if start < k_end && end > k_start {
            return Err(CompileError::KerahatViolation {
                prayer: prayer.name().to_string(),
                placed: start.time(),
                kerahat_start: k_start.time(),
                kerahat_end: k_end.time(),
            });
        }
    }
    Ok(())
}
