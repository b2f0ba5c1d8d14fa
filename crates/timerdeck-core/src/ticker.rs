//! Periodic driver for the tick engine.
//!
//! The ticker owns the session behind a mutex and runs one tokio task that
//! fires [`TimerSession::tick`] on a fixed cadence while at least one timer
//! is running. With nothing running the task parks until a command wakes
//! it. Commands and ticks both take the same lock, so they never
//! interleave, and the lock is never held across an `.await`.
//!
//! ```ignore
//! let handle = Ticker::spawn(session, TickerConfig::default());
//! handle.dispatch(Command::Start(id))?;
//! // ...
//! let session = handle.shutdown().await; // no tick fires after this
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::Result;
use crate::events::Event;
use crate::session::{Command, TimerSession};

const EVENT_CAPACITY: usize = 64;

/// Wall-clock period between ticks. Each tick takes one second off every
/// running timer, so anything other than the default one second only
/// makes sense under a paused test clock.
#[derive(Debug, Clone)]
pub struct TickerConfig {
    pub interval: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

pub struct Ticker;

impl Ticker {
    /// Take ownership of the session and start ticking.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(session: TimerSession, config: TickerConfig) -> TickerHandle {
        let session = Arc::new(Mutex::new(session));
        let wake = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let task = tokio::spawn(run(
            session.clone(),
            wake.clone(),
            shutdown_rx,
            events.clone(),
            config.interval,
        ));

        TickerHandle {
            session,
            wake,
            shutdown: shutdown_tx,
            events,
            task,
        }
    }
}

async fn run(
    session: Arc<Mutex<TimerSession>>,
    wake: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
    events: broadcast::Sender<Event>,
    period: Duration,
) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = 0u64;

    loop {
        if !lock(&session).has_running() {
            debug!("ticker idle");
            tokio::select! {
                biased;
                _ = shutdown.changed() => break,
                _ = wake.notified() => {
                    interval.reset();
                    continue;
                }
            }
        }

        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = interval.tick() => {}
        }

        let report = lock(&session).tick();
        ticks += 1;
        for event in report.events {
            // No subscribers is fine.
            let _ = events.send(event);
        }
    }

    debug!(ticks, "ticker stopped");
}

fn lock(session: &Mutex<TimerSession>) -> MutexGuard<'_, TimerSession> {
    session.lock().unwrap_or_else(|poisoned| {
        warn!("session lock was poisoned, continuing with inner state");
        poisoned.into_inner()
    })
}

/// Owner-side handle on a running ticker.
///
/// Dropping the handle also stops the task, but only
/// [`TickerHandle::shutdown`] waits for it.
pub struct TickerHandle {
    session: Arc<Mutex<TimerSession>>,
    wake: Arc<Notify>,
    shutdown: watch::Sender<bool>,
    events: broadcast::Sender<Event>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Apply a command and wake the ticker if anything is now running.
    pub fn dispatch(&self, command: Command) -> Result<Option<Event>> {
        let mut session = lock(&self.session);
        let event = session.dispatch(command)?;
        if session.has_running() {
            self.wake.notify_one();
        }
        drop(session);

        if let Some(event) = &event {
            let _ = self.events.send(event.clone());
        }
        Ok(event)
    }

    /// Read the session under the lock.
    pub fn with_session<R>(&self, f: impl FnOnce(&TimerSession) -> R) -> R {
        f(&lock(&self.session))
    }

    /// Mutate the session under the lock, e.g. to register a completion hook.
    pub fn with_session_mut<R>(&self, f: impl FnOnce(&mut TimerSession) -> R) -> R {
        let mut session = lock(&self.session);
        let out = f(&mut session);
        if session.has_running() {
            self.wake.notify_one();
        }
        out
    }

    /// Stream of events: command results plus halfway and completion
    /// notifications raised by ticks.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop ticking and hand the session back.
    ///
    /// Once this returns no further tick can fire.
    pub async fn shutdown(self) -> Option<TimerSession> {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "ticker task panicked");
        }
        drop(self.events);
        Arc::try_unwrap(self.session)
            .ok()
            .map(|m| m.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }
}
