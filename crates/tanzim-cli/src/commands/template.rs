//! Qalib template management commands.

use clap::Subcommand;
use std::path::PathBuf;
use std::process::Command;

use tanzim_core::qalib::{annotate, parse_qalib, STARTER_QALIB};
use tanzim_core::storage::{Config, PlanDb};

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List stored templates
    List,
    /// Store a starter template to edit from
    Init {
        #[arg(default_value = "weekday")]
        name: String,
    },
    /// Print a stored template
    Show { name: String },
    /// Store a template from a file
    Set { name: String, file: PathBuf },
    /// Open a template in the configured editor, validating on save
    Edit { name: String },
    /// Delete a stored template
    Delete { name: String },
}

pub fn run(action: TemplateAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlanDb::open()?;

    match action {
        TemplateAction::List => {
            let names = db.list_templates()?;
            if names.is_empty() {
                println!("No templates stored. Use 'template set' to add one.");
            }
            for name in names {
                println!("{name}");
            }
        }
        TemplateAction::Init { name } => {
            if db.load_template(&name)?.is_some() {
                return Err(format!("template '{name}' already exists").into());
            }
            db.save_template(&name, STARTER_QALIB)?;
            println!("Template '{name}' created:");
            print!("{STARTER_QALIB}");
        }
        TemplateAction::Show { name } => match db.load_template(&name)? {
            Some(body) => print!("{body}"),
            None => println!("Template '{name}' not found."),
        },
        TemplateAction::Set { name, file } => {
            let body = std::fs::read_to_string(&file)?;
            let parsed = parse_qalib(&body)?;
            db.save_template(&name, &annotate(&body, &parsed.advisories))?;
            println!("Template '{name}' stored.");
        }
        TemplateAction::Edit { name } => {
            let body = db
                .load_template(&name)?
                .ok_or_else(|| format!("template '{name}' not found"))?;

            let path = std::env::temp_dir().join(format!("tanzim-{name}.qalib"));
            std::fs::write(&path, &body)?;

            // The editor is an opaque external process; we only care about
            // the file's final byte content after it exits.
            let command = Config::load()?.editor_command();
            let mut parts = command.split_whitespace();
            let program = parts.next().ok_or("empty editor command")?;
            let status = Command::new(program).args(parts).arg(&path).status()?;
            if !status.success() {
                return Err(format!("editor exited with {status}").into());
            }

            let edited = std::fs::read_to_string(&path)?;
            let parsed = parse_qalib(&edited)?;
            db.save_template(&name, &annotate(&edited, &parsed.advisories))?;
            println!("Template '{name}' updated.");
        }
        TemplateAction::Delete { name } => {
            if db.delete_template(&name)? {
                println!("Template '{name}' deleted.");
            } else {
                println!("Template '{name}' not found.");
            }
        }
    }
    Ok(())
}
