use chrono::Local;
use clap::Subcommand;
use std::path::PathBuf;
use timerdeck_core::{format_duration, Command};

use super::{describe, ensure_not_ticking, App, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List completed timers, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all history entries
    Clear,
    /// Export timers and history as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub async fn run(action: HistoryAction) -> CliResult {
    if matches!(action, HistoryAction::Clear) {
        ensure_not_ticking()?;
    }
    let mut app = App::open()?;

    match action {
        HistoryAction::List { json } => {
            let history = app.session.history();
            if json {
                println!("{}", serde_json::to_string_pretty(history)?);
            } else if history.is_empty() {
                println!("no history");
            } else {
                for entry in history {
                    println!(
                        "{}  {:<24} {:<12} {}",
                        entry
                            .completed_at
                            .with_timezone(&Local)
                            .format("%Y-%m-%d %H:%M:%S"),
                        entry.name,
                        entry.category,
                        format_duration(entry.duration)
                    );
                }
            }
        }
        HistoryAction::Clear => {
            if let Some(event) = app.session.dispatch(Command::ClearHistory)? {
                println!("{}", describe(&event));
            }
        }
        HistoryAction::Export { output } => {
            let json = app.session.export().to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    app.close().await;
    Ok(())
}
