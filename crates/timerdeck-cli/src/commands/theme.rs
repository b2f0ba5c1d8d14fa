use clap::Subcommand;
use timerdeck_core::Theme;

use super::{App, CliResult};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
    /// Set the theme explicitly
    Set {
        /// "light" or "dark"
        theme: Theme,
    },
}

pub async fn run(action: ThemeAction) -> CliResult {
    let app = App::open()?;

    let theme = match action {
        ThemeAction::Show => {
            println!("{}", app.theme);
            app.close().await;
            return Ok(());
        }
        ThemeAction::Toggle => app.theme.toggle(),
        ThemeAction::Set { theme } => theme,
    };

    app.session.writer().save_theme(theme);
    app.close().await;
    println!("{theme}");
    Ok(())
}
