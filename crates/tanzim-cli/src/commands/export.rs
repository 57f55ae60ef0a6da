//! Canonical export command for the calendar/task sync collaborator.

use chrono::NaiveDate;
use clap::Args;

use tanzim_core::export::export_timeline;
use tanzim_core::storage::PlanDb;

use super::today;

#[derive(Args)]
pub struct ExportArgs {
    /// Day to export (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,
}

pub fn run(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;
    let date = args.date.unwrap_or_else(today);
    let (timeline, _) = db
        .load_plan(date)?
        .ok_or_else(|| format!("no plan compiled for {date}"))?;
    let entries = export_timeline(&timeline, &db.load_notes()?);
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
