use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerId, TimerStatus};

/// Every state change in the system produces an Event.
/// The CLI prints them; the ticker broadcasts the ones raised by ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerCreated {
        id: TimerId,
        name: String,
        category: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStarted {
        id: TimerId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        id: TimerId,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        id: TimerId,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerDeleted {
        id: TimerId,
        at: DateTime<Utc>,
    },
    /// Remaining time first dropped to half of the duration or below.
    HalfwayReached {
        id: TimerId,
        name: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        id: TimerId,
        name: String,
        category: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A bulk command touched at least one timer in `category`.
    CategoryChanged {
        category: String,
        status: TimerStatus,
        affected: Vec<TimerId>,
        at: DateTime<Utc>,
    },
    HistoryCleared {
        removed: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Timer the event refers to, if it is about a single timer.
    pub fn timer_id(&self) -> Option<&TimerId> {
        match self {
            Event::TimerCreated { id, .. }
            | Event::TimerStarted { id, .. }
            | Event::TimerPaused { id, .. }
            | Event::TimerReset { id, .. }
            | Event::TimerDeleted { id, .. }
            | Event::HalfwayReached { id, .. }
            | Event::TimerCompleted { id, .. } => Some(id),
            Event::CategoryChanged { .. } | Event::HistoryCleared { .. } => None,
        }
    }

    /// Whether this is a user-facing notification (halfway or completion).
    pub fn is_notification(&self) -> bool {
        matches!(
            self,
            Event::HalfwayReached { .. } | Event::TimerCompleted { .. }
        )
    }
}
