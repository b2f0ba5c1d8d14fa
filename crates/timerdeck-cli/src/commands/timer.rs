//! Timer commands for CLI.

use clap::Subcommand;
use timerdeck_core::view::{group_by_category, TimerFilter};
use timerdeck_core::{format_duration, Command, Config, NewTimer, Timer};

use super::{describe, ensure_not_ticking, short_id, App, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Create a new timer
    Add {
        /// Timer name
        name: String,
        /// Duration: seconds, MM:SS or HH:MM:SS
        #[arg(long, short)]
        duration: String,
        /// Category (e.g. Workout, Study, Break)
        #[arg(long, short)]
        category: String,
        /// Notify once half the time has elapsed
        #[arg(long)]
        halfway: bool,
    },
    /// Start (or resume) a timer
    Start {
        /// Timer ID or unique prefix
        id: String,
    },
    /// Pause a timer
    Pause {
        /// Timer ID or unique prefix
        id: String,
    },
    /// Reset a timer to its full duration
    Reset {
        /// Timer ID or unique prefix
        id: String,
    },
    /// Delete a timer
    Delete {
        /// Timer ID or unique prefix
        id: String,
    },
    /// List timers grouped by category
    List {
        /// Case-insensitive text to match against name or category
        #[arg(long, short)]
        search: Option<String>,
        /// Only this category ("All" for every category)
        #[arg(long, short)]
        category: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one timer as JSON
    Show {
        /// Timer ID or unique prefix
        id: String,
    },
}

fn row(timer: &Timer) -> String {
    let alert = match (timer.halfway_alert, timer.halfway_alert_triggered) {
        (true, true) => " halfway✓",
        (true, false) => " halfway",
        (false, _) => "",
    };
    format!(
        "  {}  {:<24} {:>9} / {:<9} {:>5.1}%  {}{}",
        short_id(&timer.id),
        timer.name,
        format_duration(timer.remaining_time),
        format_duration(timer.duration),
        timer.progress_pct(),
        timer.status,
        alert
    )
}

pub async fn run(action: TimerAction, config: &Config) -> CliResult {
    if !matches!(action, TimerAction::List { .. } | TimerAction::Show { .. }) {
        ensure_not_ticking()?;
    }
    let mut app = App::open()?;

    let command = match action {
        TimerAction::Add {
            name,
            duration,
            category,
            halfway,
        } => Command::Create(NewTimer::new(name, duration, category).with_halfway_alert(halfway)),
        TimerAction::Start { id } => Command::Start(app.resolve(&id)),
        TimerAction::Pause { id } => Command::Pause(app.resolve(&id)),
        TimerAction::Reset { id } => Command::Reset(app.resolve(&id)),
        TimerAction::Delete { id } => Command::Delete(app.resolve(&id)),
        TimerAction::List {
            search,
            category,
            json,
        } => {
            let filter = TimerFilter {
                search,
                category,
                include_completed: config.display.show_completed,
            };
            let groups = group_by_category(app.session.timers(), &filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&groups)?);
            } else if groups.is_empty() {
                println!("no timers");
            } else {
                for group in &groups {
                    println!(
                        "{} ({}, {} running) {}",
                        group.category,
                        group.timers.len(),
                        group.running,
                        group.color
                    );
                    for timer in &group.timers {
                        println!("{}", row(timer));
                    }
                }
            }
            app.close().await;
            return Ok(());
        }
        TimerAction::Show { id } => {
            let timer = app
                .session
                .repository()
                .find_by_prefix(&id)
                .ok_or_else(|| format!("no timer matches '{id}'"))?;
            println!("{}", serde_json::to_string_pretty(timer)?);
            app.close().await;
            return Ok(());
        }
    };

    let result = app.session.dispatch(command);
    app.close().await;
    match result? {
        Some(event) => println!("{}", describe(&event)),
        None => println!("no change"),
    }
    Ok(())
}
