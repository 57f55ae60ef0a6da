//! End-to-end tests for the parse -> compile -> shrink pipeline.
//!
//! These drive the public API the way the CLI does: raw qalib text in,
//! compiled timelines out, with a hand-built timetable standing in for the
//! external prayer-time collaborator.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;

use tanzim_core::compiler::{compile, CompileOptions};
use tanzim_core::prayer::{KerahatWindow, Prayer, PrayerDurations, PrayerTimetable};
use tanzim_core::qalib::parse_qalib;
use tanzim_core::shrink::{shrink, InterruptionCause, UnplannedSpan};
use tanzim_core::timeline::{EventKind, Timeline};
use tanzim_core::{CompileError, DiagnosticKind, ShrinkError};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    day().and_time(t(h, m))
}

fn durations() -> PrayerDurations {
    PrayerDurations {
        fajr_minutes: 10,
        ..Default::default()
    }
}

/// Fajr 05:10-05:20; the other four prayers sit well clear of the morning.
fn timetable() -> PrayerTimetable {
    PrayerTimetable::from_starts(
        day(),
        [
            (Prayer::Fajr, t(5, 10)),
            (Prayer::Dhuhr, t(13, 0)),
            (Prayer::Asr, t(16, 30)),
            (Prayer::Maghrib, t(19, 45)),
            (Prayer::Isha, t(21, 30)),
        ],
        &durations(),
    )
}

fn options() -> CompileOptions {
    CompileOptions {
        wake_margin_minutes: 10,
    }
}

fn compile_text(text: &str) -> Result<(Timeline, Vec<tanzim_core::Diagnostic>), CompileError> {
    let template = parse_qalib(text).expect("template parses");
    let outcome = compile(&template, day(), &timetable(), &[], &options())?;
    Ok((outcome.timeline, outcome.diagnostics))
}

#[test]
fn study_splits_around_fajr_and_coffee_follows() {
    let (timeline, diagnostics) = compile_text("05:00\n2 Study\n.15 Coffee\n").unwrap();

    assert!(diagnostics.is_empty());
    assert!(timeline.is_contiguous());
    assert_eq!(timeline.total_duration(), Duration::hours(24));

    let spans: Vec<(&str, NaiveDateTime, NaiveDateTime)> = timeline
        .events
        .iter()
        .take(5)
        .map(|e| (e.name.as_str(), e.start, e.end))
        .collect();
    assert_eq!(
        spans,
        vec![
            ("Wake-up", at(5, 0), at(5, 0)),
            ("Study", at(5, 0), at(5, 10)),
            ("Fajr", at(5, 10), at(5, 20)),
            ("Study", at(5, 20), at(7, 10)),
            ("Coffee", at(7, 10), at(7, 25)),
        ]
    );
    // The split preserves the declared two hours.
    assert!(timeline.events[3].continuation);
    let study_total: Duration = timeline
        .events
        .iter()
        .filter(|e| e.name == "Study")
        .fold(Duration::zero(), |acc, e| acc + e.duration());
    assert_eq!(study_total, Duration::hours(2));
}

#[test]
fn all_five_prayers_land_on_the_timeline() {
    let (timeline, _) = compile_text("05:00\n2 Study\n").unwrap();
    let prayers: Vec<&str> = timeline
        .events
        .iter()
        .filter(|e| e.kind == EventKind::Prayer)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(prayers, vec!["Fajr", "Dhuhr", "Asr", "Maghrib", "Isha"]);
}

#[test]
fn a_day_longer_than_twenty_four_hours_is_rejected() {
    // 28h of declared tasks plus 80 minutes of prayers against a 24h day.
    let err = compile_text("05:00\n20 Work\n8 Sleep\n").unwrap_err();
    assert!(matches!(
        err,
        CompileError::Overcommitted {
            overrun_minutes: 320
        }
    ));
}

#[test]
fn alias_outside_the_canonical_window_is_fatal() {
    let err = compile_text("05:00\n05:30 05:50 Fajr\n").unwrap_err();
    assert!(matches!(err, CompileError::PrayerWindowMismatch { .. }));
}

#[test]
fn forced_alias_inside_kerahat_is_fatal() {
    let template = parse_qalib("05:00\n05:10 05:20 Fajr\n").unwrap();
    let kerahat = [KerahatWindow {
        start: t(5, 15),
        end: t(5, 25),
    }];
    let err = compile(&template, day(), &timetable(), &kerahat, &options()).unwrap_err();
    assert!(matches!(err, CompileError::KerahatViolation { .. }));
}

#[test]
fn late_wakeup_is_rejected() {
    let template = parse_qalib("05:05\n2 Study\n").unwrap();
    let err = compile(
        &template,
        day(),
        &timetable(),
        &[],
        &CompileOptions {
            wake_margin_minutes: 20,
        },
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::WakeupTooLateForFajr { .. }));
}

#[test]
fn overlapping_fixed_events_are_rejected() {
    let err = compile_text("05:00\n09:00 11:00 University\n10:30 12:00 Meeting\n").unwrap_err();
    assert!(matches!(err, CompileError::FixedOverlap { .. }));
}

#[test]
fn drifted_fixed_event_yields_an_advisory_and_a_valid_timeline() {
    // Dhuhr at 08:50 for 30 minutes runs into the 09:00 lecture.
    let template = parse_qalib("05:00\n09:00 11:30 University\n").unwrap();
    let timetable = PrayerTimetable::from_starts(
        day(),
        [
            (Prayer::Fajr, t(5, 10)),
            (Prayer::Dhuhr, t(8, 50)),
            (Prayer::Asr, t(16, 30)),
            (Prayer::Maghrib, t(19, 45)),
            (Prayer::Isha, t(21, 30)),
        ],
        &PrayerDurations {
            fajr_minutes: 10,
            dhuhr_minutes: 30,
            ..Default::default()
        },
    );
    let outcome = compile(&template, day(), &timetable, &[], &options()).unwrap();

    assert!(outcome.timeline.is_contiguous());
    let uni = outcome
        .timeline
        .events
        .iter()
        .find(|e| e.name == "University")
        .unwrap();
    assert_eq!(uni.start, at(9, 20));
    assert_eq!(uni.duration(), Duration::minutes(150));

    let drift = outcome
        .diagnostics
        .iter()
        .find_map(|d| match &d.kind {
            DiagnosticKind::Drift {
                event,
                expected,
                found,
            } => Some((event.as_str(), expected.as_str(), found.as_str())),
            _ => None,
        })
        .expect("drift advisory");
    assert_eq!(drift, ("University", "09:00", "09:20"));
}

#[test]
fn to_plan_subtracts_prayers_and_sleep() {
    let template = parse_qalib("05:00\n2 Study\n8 Sleep\n").unwrap();
    let outcome = compile(&template, day(), &timetable(), &[], &options()).unwrap();
    // 24h minus 80 minutes of prayers minus 8 hours of sleep.
    assert_eq!(
        outcome.to_plan,
        Duration::hours(24) - Duration::minutes(80) - Duration::hours(8)
    );
}

#[test]
fn compilation_is_deterministic() {
    let text = "05:00\n2 Study\n.15 Coffee\n09:00 11:30 University # lecture\n8 Sleep\n";
    let (a, _) = compile_text(text).unwrap();
    let (b, _) = compile_text(text).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn shrink_after_compile_keeps_the_day_whole() {
    let (timeline, _) = compile_text("05:00\n2 Study\n.15 Coffee\n").unwrap();
    let span = UnplannedSpan {
        start: at(6, 0),
        end: at(6, 30),
        cause: InterruptionCause::Chronometer,
    };
    let shrunk = shrink(&timeline, &span, &[]).unwrap();

    assert!(shrunk.is_contiguous());
    assert_eq!(shrunk.total_duration(), Duration::hours(24));

    // Prayer durations survive untouched.
    for prayer in shrunk.events.iter().filter(|e| e.kind == EventKind::Prayer) {
        let original = timeline
            .events
            .iter()
            .find(|e| e.name == prayer.name && e.kind == EventKind::Prayer)
            .unwrap();
        assert_eq!(prayer.duration(), original.duration());
    }
}

#[test]
fn unabsorbable_interruption_leaves_the_plan_alone() {
    let (timeline, _) = compile_text("05:00\n2 Study\n.15 Coffee\n").unwrap();
    // A day-long interruption cannot be absorbed.
    let span = UnplannedSpan {
        start: at(6, 0),
        end: at(6, 0) + Duration::hours(23),
        cause: InterruptionCause::Timer,
    };
    let err = shrink(&timeline, &span, &[]).unwrap_err();
    assert!(matches!(err, ShrinkError::Unabsorbable { .. }));
}

proptest! {
    /// Any mix of short relative tasks compiles to a contiguous 24-hour
    /// day, and compiling twice gives identical timelines.
    #[test]
    fn compiled_days_are_contiguous_and_deterministic(
        minutes in proptest::collection::vec(10i64..=59, 1..6)
    ) {
        let mut text = String::from("05:00\n");
        for (i, m) in minutes.iter().enumerate() {
            text.push_str(&format!(".{m:02} Task {i}\n"));
        }
        let template = parse_qalib(&text).unwrap();
        let first = compile(&template, day(), &timetable(), &[], &options()).unwrap();
        let second = compile(&template, day(), &timetable(), &[], &options()).unwrap();

        prop_assert!(first.timeline.is_contiguous());
        prop_assert_eq!(first.timeline.total_duration(), Duration::hours(24));
        prop_assert_eq!(first.timeline, second.timeline);
    }
}
