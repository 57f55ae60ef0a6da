//! Note book management commands.

use chrono::NaiveDate;
use clap::Subcommand;

use tanzim_core::qalib::eval_occurrences;
use tanzim_core::recurrence::{advance_day, SubtaskNote};
use tanzim_core::storage::PlanDb;

use super::today;

#[derive(Subcommand)]
pub enum NotesAction {
    /// List the stored note book
    List,
    /// Attach a note to an event name
    Set {
        /// Exact event name (matching is case-sensitive)
        event: String,
        text: String,
        /// Countdown expression, e.g. "14" or "7*2"
        #[arg(long, conflicts_with = "unbounded")]
        sessions: Option<String>,
        /// Keep the note forever
        #[arg(long)]
        unbounded: bool,
    },
    /// Remove all notes for an event name
    Remove { event: String },
    /// Roll countdowns over a compiled day
    Advance {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(action: NotesAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        NotesAction::List => {
            let book = db.load_notes()?;
            if book.is_empty() {
                println!("Note book is empty.");
            }
            for (event, notes) in &book {
                println!("{event}:");
                for note in notes {
                    println!("  - {}", note.render());
                }
            }
        }
        NotesAction::Set {
            event,
            text,
            sessions,
            unbounded,
        } => {
            let note = match sessions {
                Some(expression) => SubtaskNote::counted(text, eval_occurrences(&expression)?),
                None if unbounded => SubtaskNote::unbounded(text),
                None => SubtaskNote::plain(text),
            };
            let mut book = db.load_notes()?;
            book.entry(event.clone()).or_default().push(note);
            db.save_notes(&book)?;
            println!("Note attached to '{event}'.");
        }
        NotesAction::Remove { event } => {
            let mut book = db.load_notes()?;
            if book.remove(&event).is_some() {
                db.save_notes(&book)?;
                println!("Notes for '{event}' removed.");
            } else {
                println!("No notes stored for '{event}'.");
            }
        }
        NotesAction::Advance { date } => {
            let date = date.unwrap_or_else(today);
            let (timeline, _) = db
                .load_plan(date)?
                .ok_or_else(|| format!("no plan compiled for {date}"))?;
            let book = advance_day(&db.load_notes()?, &timeline);
            db.save_notes(&book)?;
            println!("Note book advanced over {date}.");
        }
    }
    Ok(())
}
