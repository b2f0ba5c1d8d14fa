//! Tick engine.
//!
//! One call to [`TickEngine::tick`] advances every running timer by one
//! second. The engine has no clock of its own: the caller (usually
//! [`crate::ticker::Ticker`]) decides when a tick happens.
//!
//! ## Per-timer steps
//!
//! ```text
//! remaining' = max(0, remaining - 1)
//! halfway    : alert armed, not yet fired, remaining' <= duration / 2
//! completion : remaining' == 0 -> completed + history entry + hook
//! otherwise  : remaining <- remaining'
//! ```
//!
//! The set of running timers is read from the repository at the moment the
//! tick fires, never from an earlier snapshot.

use std::fmt;

use chrono::Utc;
use tracing::{debug, trace};

use super::model::Timer;
use super::repository::TimerRepository;
use crate::events::Event;
use crate::history::HistoryRecorder;

/// Called once with the terminal snapshot of each timer that completes.
pub type CompletionHook = Box<dyn FnMut(&Timer) + Send>;

/// Outcome of a single tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Number of timers that were running when the tick fired.
    pub advanced: usize,
    /// Halfway and completion notifications, in processing order.
    pub events: Vec<Event>,
}

impl TickReport {
    pub fn completed(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::TimerCompleted { .. }))
    }

    pub fn halfway(&self) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::HalfwayReached { .. }))
    }
}

#[derive(Default)]
pub struct TickEngine {
    on_complete: Option<CompletionHook>,
}

impl fmt::Debug for TickEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickEngine")
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl TickEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the completion hook. Replaces any earlier registration.
    pub fn set_on_complete(&mut self, hook: impl FnMut(&Timer) + Send + 'static) {
        self.on_complete = Some(Box::new(hook));
    }

    pub fn clear_on_complete(&mut self) {
        self.on_complete = None;
    }

    pub fn has_on_complete(&self) -> bool {
        self.on_complete.is_some()
    }

    /// Advance every running timer by one second.
    pub fn tick(
        &mut self,
        timers: &mut TimerRepository,
        history: &mut HistoryRecorder,
    ) -> TickReport {
        let running = timers.running_ids();
        let mut report = TickReport {
            advanced: running.len(),
            events: Vec::new(),
        };

        for id in running {
            let Some(timer) = timers.get(&id) else {
                continue;
            };
            let before = timer.remaining_time;
            let after = before.saturating_sub(1);
            let crossed_half = timer.halfway_alert
                && !timer.halfway_alert_triggered
                && after <= timer.halfway_point();
            let name = timer.name.clone();
            trace!(%id, before, after, "tick");

            if crossed_half && timers.mark_halfway_triggered(&id) {
                debug!(%id, remaining = after, "halfway reached");
                report.events.push(Event::HalfwayReached {
                    id: id.clone(),
                    name,
                    remaining_secs: after,
                    at: Utc::now(),
                });
            }

            if after == 0 {
                if let Some(done) = timers.complete(&id) {
                    let entry = history.record(&done);
                    report.events.push(Event::TimerCompleted {
                        id: done.id.clone(),
                        name: done.name.clone(),
                        category: done.category.clone(),
                        duration_secs: done.duration,
                        at: entry.completed_at,
                    });
                    if let Some(hook) = self.on_complete.as_mut() {
                        hook(&done);
                    }
                }
            } else {
                timers.tick_decrement(&id);
            }
        }

        report
    }
}
