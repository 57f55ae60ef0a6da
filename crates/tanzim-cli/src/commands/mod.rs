//! CLI command implementations.

pub mod clock;
pub mod config;
pub mod export;
pub mod notes;
pub mod plan;
pub mod shrink;
pub mod template;

use chrono::NaiveDate;
use tanzim_core::error::Diagnostic;
use tanzim_core::timeline::{EventKind, Timeline};

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn kind_label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Fixed => "fixed",
        EventKind::Flexible => "",
        EventKind::Prayer => "prayer",
        EventKind::Wakeup => "wake",
        EventKind::Unplanned => "unplanned",
    }
}

pub(crate) fn print_timeline(timeline: &Timeline) {
    println!("Plan for {}:", timeline.date);
    for event in &timeline.events {
        let name = if event.continuation {
            format!("{} (cont.)", event.name)
        } else {
            event.name.clone()
        };
        println!(
            "  {}-{}  {:<28} {}",
            event.start.format("%H:%M"),
            event.end.format("%H:%M"),
            name,
            kind_label(event.kind)
        );
        for note in &event.notes {
            println!("             - {}", note.render());
        }
    }
}

pub(crate) fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.line {
            Some(line) => println!("advisory (line {line}): {}", diagnostic.message()),
            None => println!("advisory: {}", diagnostic.message()),
        }
    }
}
