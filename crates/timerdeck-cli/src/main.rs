use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use timerdeck_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "timerdeck", version, about = "Named countdown timers, grouped by category")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer management
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Bulk commands over a category
    Category {
        #[command(subcommand)]
        action: commands::category::CategoryAction,
    },
    /// Completion history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Light/dark theme preference
    Theme {
        #[command(subcommand)]
        action: commands::theme::ThemeAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Tick running timers in the foreground until interrupted
    Run(commands::run::RunArgs),
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_env("TIMERDECK_LOG")
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config).await,
        Commands::Category { action } => commands::category::run(action).await,
        Commands::History { action } => commands::history::run(action).await,
        Commands::Theme { action } => commands::theme::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Run(args) => commands::run::run(args, &config).await,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "timerdeck", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
