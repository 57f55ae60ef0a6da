use clap::{Parser, Subcommand};

mod commands;
mod provider;

#[derive(Parser)]
#[command(name = "tanzim", version, about = "Prayer-aware daily schedule compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and inspect day plans
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Qalib template management
    Template {
        #[command(subcommand)]
        action: commands::template::TemplateAction,
    },
    /// Subtask note book management
    Notes {
        #[command(subcommand)]
        action: commands::notes::NotesAction,
    },
    /// Absorb an unplanned interruption into today's plan
    Shrink(commands::shrink::ShrinkArgs),
    /// Chronometer/timer for measuring interruptions
    Clock {
        #[command(subcommand)]
        action: commands::clock::ClockAction,
    },
    /// Canonical export for the calendar sync collaborator
    Export(commands::export::ExportArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Template { action } => commands::template::run(action),
        Commands::Notes { action } => commands::notes::run(action),
        Commands::Shrink(args) => commands::shrink::run(args),
        Commands::Clock { action } => commands::clock::run(action),
        Commands::Export(args) => commands::export::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
