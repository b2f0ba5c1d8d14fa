//! Completion history.
//!
//! The log is append-only (newest first) and independent of the live
//! timer collection: deleting or resetting a timer never touches it.
//! Every change is handed to the persistence writer as a full snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::events::Event;
use crate::storage::PersistenceWriter;
use crate::timer::{Timer, TimerId};

/// Immutable record of one completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerHistoryEntry {
    pub id: TimerId,
    pub name: String,
    pub category: String,
    /// Duration of the timer in seconds.
    pub duration: u64,
    pub completed_at: DateTime<Utc>,
}

impl TimerHistoryEntry {
    pub fn from_timer(timer: &Timer, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: timer.id.clone(),
            name: timer.name.clone(),
            category: timer.category.clone(),
            duration: timer.duration,
            completed_at,
        }
    }
}

/// Read-only projection of the live timers and the full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub timers: Vec<Timer>,
    pub history: Vec<TimerHistoryEntry>,
    pub exported_at: DateTime<Utc>,
}

impl ExportBundle {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub struct HistoryRecorder {
    entries: Vec<TimerHistoryEntry>,
    writer: PersistenceWriter,
}

impl HistoryRecorder {
    pub fn new(entries: Vec<TimerHistoryEntry>, writer: PersistenceWriter) -> Self {
        Self { entries, writer }
    }

    pub fn entries(&self) -> &[TimerHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepend an entry for `timer` and persist the whole log.
    pub fn record(&mut self, timer: &Timer) -> &TimerHistoryEntry {
        let entry = TimerHistoryEntry::from_timer(timer, Utc::now());
        info!(id = %entry.id, name = %entry.name, "timer completed, recorded to history");
        self.entries.insert(0, entry);
        self.writer.save_history(self.entries.clone());
        &self.entries[0]
    }

    /// Drop every entry and persist the empty log.
    pub fn clear(&mut self) -> Event {
        let removed = self.entries.len();
        self.entries.clear();
        self.writer.save_history(Vec::new());
        info!(removed, "history cleared");
        Event::HistoryCleared {
            removed,
            at: Utc::now(),
        }
    }

    pub fn export(&self, timers: &[Timer]) -> ExportBundle {
        ExportBundle {
            timers: timers.to_vec(),
            history: self.entries.clone(),
            exported_at: Utc::now(),
        }
    }
}
