use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::format::parse_duration;
use crate::error::ValidationError;

/// Opaque timer identifier, assigned once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TimerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl TimerStatus {
    /// Display order used when listing timers: running first, completed last.
    pub fn sort_rank(self) -> u8 {
        match self {
            TimerStatus::Running => 0,
            TimerStatus::Paused => 1,
            TimerStatus::Idle => 2,
            TimerStatus::Completed => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named countdown.
///
/// Instances handed out by the repository are read-only views; every
/// mutation goes through a named transition on `TimerRepository`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    pub category: String,
    /// Total length in seconds.
    pub duration: u64,
    /// Seconds left, `0..=duration`.
    pub remaining_time: u64,
    pub status: TimerStatus,
    #[serde(default)]
    pub halfway_alert: bool,
    #[serde(default)]
    pub halfway_alert_triggered: bool,
    pub created_at: DateTime<Utc>,
}

impl Timer {
    /// Remaining time at or below which the halfway alert fires.
    pub fn halfway_point(&self) -> u64 {
        self.duration / 2
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == TimerStatus::Completed
    }

    /// 0.0 .. 100.0 elapsed share.
    pub fn progress_pct(&self) -> f64 {
        super::format::progress_percentage(self.remaining_time, self.duration)
    }

    /// Restore the status/remaining-time invariants on a record that came
    /// from outside the repository (storage, imports).
    pub(crate) fn sanitize(&mut self) {
        self.remaining_time = self.remaining_time.min(self.duration);
        if self.status == TimerStatus::Completed {
            self.remaining_time = 0;
        } else if self.remaining_time == 0 {
            self.status = TimerStatus::Completed;
        }
    }
}

/// Unvalidated input for a new timer, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimer {
    pub name: String,
    /// Duration text: `SS`, `MM:SS` or `HH:MM:SS`.
    pub duration: String,
    pub category: String,
    #[serde(default)]
    pub halfway_alert: bool,
}

impl NewTimer {
    pub fn new(
        name: impl Into<String>,
        duration: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            duration: duration.into(),
            category: category.into(),
            halfway_alert: false,
        }
    }

    pub fn with_halfway_alert(mut self, enabled: bool) -> Self {
        self.halfway_alert = enabled;
        self
    }

    /// Check the input and build an idle timer from it.
    ///
    /// Name and category are trimmed. The duration must parse to at least
    /// one second.
    pub fn validate(&self) -> Result<Timer, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let duration = parse_duration(&self.duration);
        if duration == 0 {
            return Err(ValidationError::InvalidDuration {
                input: self.duration.clone(),
            });
        }

        let category = self.category.trim();
        if category.is_empty() {
            return Err(ValidationError::MissingCategory);
        }

        Ok(Timer {
            id: TimerId::new(),
            name: name.to_string(),
            category: category.to_string(),
            duration,
            remaining_time: duration,
            status: TimerStatus::Idle,
            halfway_alert: self.halfway_alert,
            halfway_alert_triggered: false,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_builds_idle_timer() {
        let timer = NewTimer::new("  Plank ", "1:30", " Workout ")
            .with_halfway_alert(true)
            .validate()
            .unwrap();
        assert_eq!(timer.name, "Plank");
        assert_eq!(timer.category, "Workout");
        assert_eq!(timer.duration, 90);
        assert_eq!(timer.remaining_time, 90);
        assert_eq!(timer.status, TimerStatus::Idle);
        assert!(timer.halfway_alert);
        assert!(!timer.halfway_alert_triggered);
    }

    #[test]
    fn validate_rejects_bad_input() {
        assert_eq!(
            NewTimer::new("   ", "60", "Work").validate(),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            NewTimer::new("Tea", "abc", "Break").validate(),
            Err(ValidationError::InvalidDuration { input: "abc".into() })
        );
        assert_eq!(
            NewTimer::new("Tea", "0:00", "Break").validate(),
            Err(ValidationError::InvalidDuration { input: "0:00".into() })
        );
        assert_eq!(
            NewTimer::new("Tea", "60", "  ").validate(),
            Err(ValidationError::MissingCategory)
        );
    }

    #[test]
    fn ids_are_unique() {
        let a = NewTimer::new("a", "1", "x").validate().unwrap();
        let b = NewTimer::new("a", "1", "x").validate().unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_camel_case_with_lowercase_status() {
        let timer = NewTimer::new("Tea", "3:00", "Break").validate().unwrap();
        let json = serde_json::to_value(&timer).unwrap();
        assert_eq!(json["remainingTime"], 180);
        assert_eq!(json["status"], "idle");
        assert_eq!(json["halfwayAlertTriggered"], false);
        assert!(json["createdAt"].is_string());

        let back: Timer = serde_json::from_value(json).unwrap();
        assert_eq!(back, timer);
    }

    #[test]
    fn sanitize_restores_invariants() {
        let mut timer = NewTimer::new("Tea", "10", "Break").validate().unwrap();
        timer.remaining_time = 50;
        timer.sanitize();
        assert_eq!(timer.remaining_time, 10);

        timer.remaining_time = 0;
        timer.status = TimerStatus::Running;
        timer.sanitize();
        assert_eq!(timer.status, TimerStatus::Completed);

        timer.status = TimerStatus::Completed;
        timer.remaining_time = 4;
        timer.sanitize();
        assert_eq!(timer.remaining_time, 0);
    }

    #[test]
    fn status_rank_orders_running_first() {
        let mut statuses = vec![
            TimerStatus::Completed,
            TimerStatus::Idle,
            TimerStatus::Running,
            TimerStatus::Paused,
        ];
        statuses.sort_by_key(|s| s.sort_rank());
        assert_eq!(
            statuses,
            vec![
                TimerStatus::Running,
                TimerStatus::Paused,
                TimerStatus::Idle,
                TimerStatus::Completed
            ]
        );
    }
}
