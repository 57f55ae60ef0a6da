//! Day plan compilation commands.

use chrono::NaiveDate;
use clap::Subcommand;
use std::path::PathBuf;

use tanzim_core::compiler::compile;
use tanzim_core::prayer::PrayerProvider;
use tanzim_core::qalib::parse_qalib;
use tanzim_core::storage::{Config, PlanDb};

use crate::provider::FileProvider;

use super::{print_diagnostics, print_timeline, today};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Compile a stored qalib into a day plan
    Compile {
        /// Template name (defaults to `default_template` from the config)
        template: Option<String>,
        /// Day to compile for (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// JSON timetable file with the five prayer start times
        #[arg(long)]
        prayer_times: PathBuf,
        /// Print the compiled plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a previously compiled plan
    Show {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        PlanAction::Compile {
            template,
            date,
            prayer_times,
            json,
        } => {
            let config = Config::load()?;
            let date = date.unwrap_or_else(today);
            let name = template
                .or(config.default_template.clone())
                .ok_or("no template given and no default_template configured")?;
            let body = db
                .load_template(&name)?
                .ok_or_else(|| format!("template '{name}' not found"))?;
            let parsed = parse_qalib(&body)?;

            let provider = FileProvider::new(prayer_times, config.prayers.clone());
            let timetable = provider.timetable(date)?;
            let kerahat = provider.kerahat(date)?;

            let outcome = compile(&parsed, date, &timetable, &kerahat, &config.compile)?;
            db.save_plan(date, &outcome.timeline, &outcome.diagnostics)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.timeline)?);
            } else {
                print_timeline(&outcome.timeline);
                let to_plan = outcome.to_plan;
                println!(
                    "to plan: {}h{:02}m",
                    to_plan.num_hours(),
                    to_plan.num_minutes() % 60
                );
            }
            print_diagnostics(&outcome.diagnostics);
        }
        PlanAction::Show { date, json } => {
            let date = date.unwrap_or_else(today);
            match db.load_plan(date)? {
                Some((timeline, diagnostics)) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&timeline)?);
                    } else {
                        print_timeline(&timeline);
                    }
                    print_diagnostics(&diagnostics);
                }
                None => println!("No plan compiled for {date}."),
            }
        }
    }
    Ok(())
}
