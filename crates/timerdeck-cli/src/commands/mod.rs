pub mod category;
pub mod config;
pub mod history;
pub mod run;
pub mod theme;
pub mod timer;

use timerdeck_core::storage::{data_dir, Database, Persistence, RunLock, WriterTask};
use timerdeck_core::{Event, Theme, TimerId, TimerSession};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// A loaded session plus the writer task that persists its changes.
pub struct App {
    pub session: TimerSession,
    pub theme: Theme,
    writer_task: WriterTask,
}

impl App {
    /// Open the on-disk store and load timers, history and theme.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let persistence = Persistence::new(Database::open()?);
        let theme = persistence.load_theme();
        let (session, writer_task) = TimerSession::load(persistence);
        Ok(Self {
            session,
            theme,
            writer_task,
        })
    }

    /// Split into the session and the writer task, e.g. to hand the
    /// session to a ticker.
    pub fn into_parts(self) -> (TimerSession, WriterTask) {
        (self.session, self.writer_task)
    }

    /// Flush pending writes.
    pub async fn close(self) {
        drop(self.session);
        self.writer_task.finish().await;
    }

    /// Full id for an id prefix; unknown prefixes pass through unchanged so
    /// the command becomes a no-op.
    pub fn resolve(&self, id: &str) -> TimerId {
        self.session
            .resolve_id(id)
            .unwrap_or_else(|| TimerId::from(id))
    }
}

/// Refuse to change timers while `timerdeck run` ticks them in another
/// process; its next save would overwrite the change.
pub fn ensure_not_ticking() -> Result<(), Box<dyn std::error::Error>> {
    RunLock::ensure_free(&data_dir()?)?;
    Ok(())
}

/// One-line, human readable description of an event.
pub fn describe(event: &Event) -> String {
    match event {
        Event::TimerCreated { id, name, category, duration_secs, .. } => format!(
            "created {name} [{category}] {} ({})",
            timerdeck_core::format_duration(*duration_secs),
            short_id(id)
        ),
        Event::TimerStarted { id, remaining_secs, .. } => format!(
            "started {} with {} left",
            short_id(id),
            timerdeck_core::format_duration(*remaining_secs)
        ),
        Event::TimerPaused { id, remaining_secs, .. } => format!(
            "paused {} at {}",
            short_id(id),
            timerdeck_core::format_duration(*remaining_secs)
        ),
        Event::TimerReset { id, duration_secs, .. } => format!(
            "reset {} to {}",
            short_id(id),
            timerdeck_core::format_duration(*duration_secs)
        ),
        Event::TimerDeleted { id, .. } => format!("deleted {}", short_id(id)),
        Event::HalfwayReached { name, remaining_secs, .. } => format!(
            "halfway: {name} has {} left",
            timerdeck_core::format_duration(*remaining_secs)
        ),
        Event::TimerCompleted { name, category, duration_secs, .. } => format!(
            "completed: {name} [{category}] {}",
            timerdeck_core::format_duration(*duration_secs)
        ),
        Event::CategoryChanged { category, status, affected, .. } => {
            format!("{category}: {} timer(s) now {status}", affected.len())
        }
        Event::HistoryCleared { removed, .. } => format!("cleared {removed} history entries"),
    }
}

/// First 8 characters of an id, enough to address it from the CLI.
pub fn short_id(id: &TimerId) -> &str {
    let s = id.as_str();
    s.get(..8).unwrap_or(s)
}
