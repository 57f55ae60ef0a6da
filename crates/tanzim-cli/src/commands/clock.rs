//! Chronometer/timer commands.
//!
//! The clock persists between invocations as a small JSON file in the data
//! directory; only stopping it touches the day plan.

use chrono::{Duration, NaiveDateTime};
use clap::Subcommand;
use std::path::PathBuf;

use tanzim_core::clock::InterruptionClock;
use tanzim_core::prayer::{PrayerDurations, PrayerProvider};
use tanzim_core::storage::{data_dir, PlanDb};

use crate::provider::FileProvider;

use super::today;

#[derive(Subcommand)]
pub enum ClockAction {
    /// Start measuring an interruption
    Start {
        /// Run as a countdown timer of this many minutes
        #[arg(long)]
        minutes: Option<i64>,
    },
    /// Show the running clock
    Status,
    /// Discard the measurement
    Cancel,
    /// Stop the clock and shrink today's plan by the measured span
    Stop {
        /// JSON timetable file, for kerahat windows during re-placement
        #[arg(long)]
        prayer_times: Option<PathBuf>,
    },
}

fn clock_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    Ok(data_dir()?.join("clock.json"))
}

fn load_clock() -> Result<Option<InterruptionClock>, Box<dyn std::error::Error>> {
    let path = clock_path()?;
    match std::fs::read_to_string(&path) {
        Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        Err(_) => Ok(None),
    }
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub fn run(action: ClockAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ClockAction::Start { minutes } => {
            if load_clock()?.is_some() {
                return Err("a clock is already running; stop or cancel it first".into());
            }
            let clock = match minutes {
                Some(m) => InterruptionClock::timer(now(), Duration::minutes(m)),
                None => InterruptionClock::chronometer(now()),
            };
            std::fs::write(clock_path()?, serde_json::to_string(&clock)?)?;
            println!("Clock started at {}.", clock.started_at().format("%H:%M"));
        }
        ClockAction::Status => match load_clock()? {
            Some(clock) => {
                let elapsed = clock.elapsed(now());
                println!(
                    "Running since {} ({} minutes elapsed{}).",
                    clock.started_at().format("%H:%M"),
                    elapsed.num_minutes(),
                    if clock.expired(now()) { ", expired" } else { "" }
                );
            }
            None => println!("No clock running."),
        },
        ClockAction::Cancel => match load_clock()? {
            Some(clock) => {
                std::fs::remove_file(clock_path()?)?;
                clock.cancel();
                println!("Clock cancelled; measurement discarded.");
            }
            None => println!("No clock running."),
        },
        ClockAction::Stop { prayer_times } => {
            let clock = load_clock()?.ok_or("no clock running")?;
            std::fs::remove_file(clock_path()?)?;

            let span = clock.stop(now());
            let date = today();
            let kerahat = match prayer_times {
                Some(path) => {
                    FileProvider::new(path, PrayerDurations::default()).kerahat(date)?
                }
                None => Vec::new(),
            };
            super::shrink::apply(
                &PlanDb::open()?,
                date,
                span.start.time(),
                span.end.time(),
                span.cause,
                &kerahat,
            )?;
        }
    }
    Ok(())
}
