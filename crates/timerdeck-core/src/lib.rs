//! # timerdeck Core Library
//!
//! Business logic for timerdeck, a tracker for many named countdown timers
//! grouped into categories. The CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Repository**: the timer collection, changed only through named
//!   transitions (start, pause, reset, delete, bulk category commands)
//! - **Tick Engine**: advances running timers one second per tick and fires
//!   the halfway and completion notifications exactly once per lifecycle
//! - **Ticker**: tokio task that drives the tick engine on a fixed cadence
//! - **History**: append-only log of completions, plus JSON export
//! - **Storage**: best-effort key-value persistence (SQLite) and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`TimerSession`]: explicitly constructed application instance
//! - [`TimerRepository`]: timer state machine
//! - [`TickEngine`]: per-tick rules
//! - [`Ticker`]: periodic driver with deterministic shutdown
//! - [`Persistence`]: load/save gateway

pub mod error;
pub mod events;
pub mod history;
pub mod session;
pub mod storage;
pub mod theme;
pub mod ticker;
pub mod timer;
pub mod view;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use history::{ExportBundle, HistoryRecorder, TimerHistoryEntry};
pub use session::{Command, TimerSession};
pub use storage::{
    Config, Database, KeyValueStore, MemoryStore, Persistence, PersistenceWriter, RunLock,
};
pub use theme::Theme;
pub use ticker::{Ticker, TickerConfig, TickerHandle};
pub use timer::{
    format_duration, parse_duration, NewTimer, TickEngine, TickReport, Timer, TimerId,
    TimerRepository, TimerStatus,
};
pub use view::{group_by_category, CategoryGroup, TimerFilter};
