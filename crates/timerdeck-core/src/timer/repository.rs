//! In-memory timer collection.
//!
//! The collection is only changed through the named transitions below.
//! Every transition is total: an unknown id or category is a silent no-op
//! that returns `None`, so stale callbacks from the presentation layer are
//! harmless.
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v (tick reaches 0)
//!        Completed -> (reset) -> Idle
//! ```

use chrono::Utc;
use tracing::debug;

use super::model::{NewTimer, Timer, TimerId, TimerStatus};
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Default)]
pub struct TimerRepository {
    timers: Vec<Timer>,
}

impl TimerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from records loaded from storage.
    ///
    /// Records are sanitized so `remaining_time == 0` iff completed.
    pub fn from_timers(timers: Vec<Timer>) -> Self {
        let mut repo = Self::new();
        repo.replace_all(timers);
        repo
    }

    /// Replace the whole collection, e.g. after loading persisted state.
    pub fn replace_all(&mut self, mut timers: Vec<Timer>) {
        for timer in &mut timers {
            timer.sanitize();
        }
        // Later duplicates of an id would be unreachable by id-keyed commands.
        let mut seen = std::collections::HashSet::new();
        timers.retain(|t| seen.insert(t.id.clone()));
        self.timers = timers;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timers(&self) -> &[Timer] {
        &self.timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn get(&self, id: &TimerId) -> Option<&Timer> {
        self.timers.iter().find(|t| &t.id == id)
    }

    /// Look a timer up by full id or by an unambiguous id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Option<&Timer> {
        if prefix.is_empty() {
            return None;
        }
        if let Some(exact) = self.timers.iter().find(|t| t.id.as_str() == prefix) {
            return Some(exact);
        }
        let mut matches = self.timers.iter().filter(|t| t.id.as_str().starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for timer in &self.timers {
            if !out.contains(&timer.category.as_str()) {
                out.push(&timer.category);
            }
        }
        out
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Timer> + 'a {
        self.timers.iter().filter(move |t| t.category == category)
    }

    pub fn running_count(&self) -> usize {
        self.timers.iter().filter(|t| t.is_running()).count()
    }

    pub fn has_running(&self) -> bool {
        self.timers.iter().any(Timer::is_running)
    }

    /// Ids of every running timer, in collection order.
    pub fn running_ids(&self) -> Vec<TimerId> {
        self.timers
            .iter()
            .filter(|t| t.is_running())
            .map(|t| t.id.clone())
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Validate the input and append a new idle timer.
    pub fn create(&mut self, input: &NewTimer) -> Result<Event, ValidationError> {
        let timer = input.validate()?;
        debug!(id = %timer.id, name = %timer.name, duration = timer.duration, "timer created");
        let event = Event::TimerCreated {
            id: timer.id.clone(),
            name: timer.name.clone(),
            category: timer.category.clone(),
            duration_secs: timer.duration,
            at: timer.created_at,
        };
        self.timers.push(timer);
        Ok(event)
    }

    /// Idle or paused -> running. Completed timers must be reset first.
    pub fn start(&mut self, id: &TimerId) -> Option<Event> {
        let timer = self.find_mut(id)?;
        if !Self::apply_start(timer) {
            return None;
        }
        debug!(id = %timer.id, remaining = timer.remaining_time, "timer started");
        Some(Event::TimerStarted {
            id: timer.id.clone(),
            remaining_secs: timer.remaining_time,
            at: Utc::now(),
        })
    }

    /// Any non-completed status -> paused.
    pub fn pause(&mut self, id: &TimerId) -> Option<Event> {
        let timer = self.find_mut(id)?;
        if !Self::apply_pause(timer) {
            return None;
        }
        debug!(id = %timer.id, remaining = timer.remaining_time, "timer paused");
        Some(Event::TimerPaused {
            id: timer.id.clone(),
            remaining_secs: timer.remaining_time,
            at: Utc::now(),
        })
    }

    /// Any status -> idle with the full duration and the halfway alert re-armed.
    pub fn reset(&mut self, id: &TimerId) -> Option<Event> {
        let timer = self.find_mut(id)?;
        Self::apply_reset(timer);
        debug!(id = %timer.id, "timer reset");
        Some(Event::TimerReset {
            id: timer.id.clone(),
            duration_secs: timer.duration,
            at: Utc::now(),
        })
    }

    pub fn delete(&mut self, id: &TimerId) -> Option<Event> {
        let pos = self.timers.iter().position(|t| &t.id == id)?;
        let removed = self.timers.remove(pos);
        debug!(id = %removed.id, "timer deleted");
        Some(Event::TimerDeleted {
            id: removed.id,
            at: Utc::now(),
        })
    }

    /// Start every non-completed timer in the category.
    pub fn start_category(&mut self, category: &str) -> Option<Event> {
        self.apply_to_category(category, TimerStatus::Running, Self::apply_start)
    }

    /// Pause every running timer in the category.
    pub fn pause_category(&mut self, category: &str) -> Option<Event> {
        self.apply_to_category(category, TimerStatus::Paused, |timer| {
            timer.is_running() && Self::apply_pause(timer)
        })
    }

    /// Reset every timer in the category.
    pub fn reset_category(&mut self, category: &str) -> Option<Event> {
        self.apply_to_category(category, TimerStatus::Idle, |timer| {
            Self::apply_reset(timer);
            true
        })
    }

    // ── Tick-only transitions ────────────────────────────────────────

    /// Take one second off a running timer that has more than one left.
    pub(crate) fn tick_decrement(&mut self, id: &TimerId) -> Option<u64> {
        let timer = self.find_mut(id)?;
        if !timer.is_running() || timer.remaining_time <= 1 {
            return None;
        }
        timer.remaining_time -= 1;
        Some(timer.remaining_time)
    }

    /// Arm-once flag for the halfway alert. Returns false if already set.
    pub(crate) fn mark_halfway_triggered(&mut self, id: &TimerId) -> bool {
        match self.find_mut(id) {
            Some(timer) if timer.halfway_alert && !timer.halfway_alert_triggered => {
                timer.halfway_alert_triggered = true;
                true
            }
            _ => false,
        }
    }

    /// Running -> completed. Returns the terminal snapshot.
    pub(crate) fn complete(&mut self, id: &TimerId) -> Option<Timer> {
        let timer = self.find_mut(id)?;
        if !timer.is_running() {
            return None;
        }
        timer.status = TimerStatus::Completed;
        timer.remaining_time = 0;
        Some(timer.clone())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn find_mut(&mut self, id: &TimerId) -> Option<&mut Timer> {
        self.timers.iter_mut().find(|t| &t.id == id)
    }

    fn apply_to_category(
        &mut self,
        category: &str,
        status: TimerStatus,
        mut apply: impl FnMut(&mut Timer) -> bool,
    ) -> Option<Event> {
        let affected: Vec<TimerId> = self
            .timers
            .iter_mut()
            .filter(|t| t.category == category)
            .filter_map(|t| apply(t).then(|| t.id.clone()))
            .collect();

        if affected.is_empty() {
            return None;
        }
        debug!(category, %status, count = affected.len(), "category updated");
        Some(Event::CategoryChanged {
            category: category.to_string(),
            status,
            affected,
            at: Utc::now(),
        })
    }

    fn apply_start(timer: &mut Timer) -> bool {
        match timer.status {
            TimerStatus::Idle | TimerStatus::Paused => {
                timer.status = TimerStatus::Running;
                true
            }
            TimerStatus::Running | TimerStatus::Completed => false,
        }
    }

    /// Idle or running -> paused. A completed timer stays completed so that
    /// remaining 0 and completed always go together.
    fn apply_pause(timer: &mut Timer) -> bool {
        match timer.status {
            TimerStatus::Idle | TimerStatus::Running => {
                timer.status = TimerStatus::Paused;
                true
            }
            TimerStatus::Paused | TimerStatus::Completed => false,
        }
    }

    fn apply_reset(timer: &mut Timer) {
        timer.remaining_time = timer.duration;
        timer.status = TimerStatus::Idle;
        timer.halfway_alert_triggered = false;
    }
}
