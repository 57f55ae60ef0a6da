//! Interruption absorption command.

use chrono::{Duration, NaiveDate, NaiveTime};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use tanzim_core::prayer::{KerahatWindow, PrayerDurations, PrayerProvider};
use tanzim_core::shrink::{shrink, InterruptionCause, UnplannedSpan};
use tanzim_core::storage::PlanDb;

use crate::provider::FileProvider;

use super::{print_timeline, today};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum CauseArg {
    #[default]
    Chronometer,
    Timer,
}

impl From<CauseArg> for InterruptionCause {
    fn from(arg: CauseArg) -> Self {
        match arg {
            CauseArg::Chronometer => InterruptionCause::Chronometer,
            CauseArg::Timer => InterruptionCause::Timer,
        }
    }
}

#[derive(Args)]
pub struct ShrinkArgs {
    /// Interruption start, HH:MM
    start: String,
    /// Interruption end, HH:MM
    end: String,
    /// Day whose plan absorbs the interruption (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// What measured the interruption (defaults to chronometer)
    #[arg(long, value_enum)]
    cause: Option<CauseArg>,
    /// JSON timetable file, for kerahat windows during re-placement
    #[arg(long)]
    prayer_times: Option<PathBuf>,
}

pub fn run(args: ShrinkArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;
    let date = args.date.unwrap_or_else(today);
    let start = parse_hhmm(&args.start)?;
    let end = parse_hhmm(&args.end)?;

    let kerahat = match args.prayer_times {
        Some(path) => {
            FileProvider::new(path, PrayerDurations::default()).kerahat(date)?
        }
        None => Vec::new(),
    };

    apply(
        &db,
        date,
        start,
        end,
        args.cause.unwrap_or_default().into(),
        &kerahat,
    )
}

/// Shared by the `shrink` and `clock stop` commands.
pub(crate) fn apply(
    db: &PlanDb,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    cause: InterruptionCause,
    kerahat: &[KerahatWindow],
) -> Result<(), Box<dyn std::error::Error>> {
    let (timeline, diagnostics) = db
        .load_plan(date)?
        .ok_or_else(|| format!("no plan compiled for {date}"))?;
    let wake = timeline
        .wakeup()
        .ok_or_else(|| format!("plan for {date} is empty"))?;

    // Clock times before the wake-up belong to the tail of the day.
    let normalize = |t: NaiveTime| {
        let dt = timeline.date.and_time(t);
        if dt < wake {
            dt + Duration::days(1)
        } else {
            dt
        }
    };
    let span = UnplannedSpan {
        start: normalize(start),
        end: normalize(end),
        cause,
    };

    let shrunk = shrink(&timeline, &span, kerahat)?;
    db.save_plan(date, &shrunk, &diagnostics)?;
    print_timeline(&shrunk);
    Ok(())
}

fn parse_hhmm(raw: &str) -> Result<NaiveTime, Box<dyn std::error::Error>> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| format!("bad time '{raw}'").into())
}
