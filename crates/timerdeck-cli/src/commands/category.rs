use clap::Subcommand;
use timerdeck_core::timer::palette;
use timerdeck_core::view::{group_by_category, TimerFilter};
use timerdeck_core::Command;

use super::{describe, ensure_not_ticking, App, CliResult};

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Start every non-completed timer in the category
    Start { name: String },
    /// Pause every running timer in the category
    Pause { name: String },
    /// Reset every timer in the category
    Reset { name: String },
    /// List categories in use with timer counts
    List,
    /// Show the predefined categories and their colors
    Palette,
}

pub async fn run(action: CategoryAction) -> CliResult {
    if let CategoryAction::Palette = action {
        for (name, color) in palette::palette() {
            println!("{name:<12} {color}");
        }
        return Ok(());
    }
    if !matches!(action, CategoryAction::List) {
        ensure_not_ticking()?;
    }

    let mut app = App::open()?;
    let command = match action {
        CategoryAction::Start { name } => Command::StartCategory(name),
        CategoryAction::Pause { name } => Command::PauseCategory(name),
        CategoryAction::Reset { name } => Command::ResetCategory(name),
        CategoryAction::List | CategoryAction::Palette => {
            for group in group_by_category(app.session.timers(), &TimerFilter::all()) {
                println!(
                    "{:<16} {} timer(s), {} running  {}",
                    group.category,
                    group.timers.len(),
                    group.running,
                    group.color
                );
            }
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
