//! The application instance.
//!
//! A `TimerSession` owns the timer collection, the history log, the tick
//! engine and the persistence writer. Nothing here is global: callers
//! construct a session and pass it (or a [`crate::ticker::TickerHandle`])
//! to whatever needs it. All mutations funnel through [`TimerSession::dispatch`]
//! and [`TimerSession::tick`], so applying them under one lock serializes
//! them completely.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::events::Event;
use crate::history::{ExportBundle, HistoryRecorder, TimerHistoryEntry};
use crate::storage::{KeyValueStore, Persistence, PersistenceWriter, WriterTask};
use crate::timer::{NewTimer, TickEngine, TickReport, Timer, TimerId, TimerRepository};

/// User-issued commands. Unknown ids and categories are silent no-ops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "snake_case")]
pub enum Command {
    Create(NewTimer),
    Start(TimerId),
    Pause(TimerId),
    Reset(TimerId),
    Delete(TimerId),
    StartCategory(String),
    PauseCategory(String),
    ResetCategory(String),
    ClearHistory,
}

pub struct TimerSession {
    timers: TimerRepository,
    history: HistoryRecorder,
    engine: TickEngine,
    writer: PersistenceWriter,
}

impl TimerSession {
    /// Start with the given state. Loaded timers are sanitized.
    pub fn with_state(
        timers: Vec<Timer>,
        history: Vec<TimerHistoryEntry>,
        writer: PersistenceWriter,
    ) -> Self {
        Self {
            timers: TimerRepository::from_timers(timers),
            history: HistoryRecorder::new(history, writer.clone()),
            engine: TickEngine::new(),
            writer,
        }
    }

    /// Load timers and history through the gateway; failures yield empty state.
    pub fn open<S: KeyValueStore>(persistence: &Persistence<S>, writer: PersistenceWriter) -> Self {
        let timers = persistence.load_timers();
        let history = persistence.load_history();
        debug!(timers = timers.len(), history = history.len(), "session opened");
        Self::with_state(timers, history, writer)
    }

    /// Load state, then hand the gateway to a background writer.
    ///
    /// Must be called from within a tokio runtime. Await the returned task
    /// after dropping the session to flush pending writes.
    pub fn load<S: KeyValueStore + 'static>(persistence: Persistence<S>) -> (Self, WriterTask) {
        let timers = persistence.load_timers();
        let history = persistence.load_history();
        let (writer, task) = PersistenceWriter::spawn(persistence);
        (Self::with_state(timers, history, writer), task)
    }

    /// Writer shared with the history recorder, for saving other keys in order.
    pub fn writer(&self) -> &PersistenceWriter {
        &self.writer
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timers(&self) -> &[Timer] {
        self.timers.timers()
    }

    pub fn repository(&self) -> &TimerRepository {
        &self.timers
    }

    pub fn get(&self, id: &TimerId) -> Option<&Timer> {
        self.timers.get(id)
    }

    /// Full id for an id or unambiguous id prefix.
    pub fn resolve_id(&self, prefix: &str) -> Option<TimerId> {
        self.timers.find_by_prefix(prefix).map(|t| t.id.clone())
    }

    pub fn history(&self) -> &[TimerHistoryEntry] {
        self.history.entries()
    }

    pub fn has_running(&self) -> bool {
        self.timers.has_running()
    }

    pub fn export(&self) -> ExportBundle {
        self.history.export(self.timers.timers())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply one command. Only `Create` can fail, and it fails before any
    /// state changes.
    pub fn dispatch(&mut self, command: Command) -> Result<Option<Event>> {
        let event = match command {
            Command::Create(input) => Some(self.timers.create(&input)?),
            Command::Start(id) => self.timers.start(&id),
            Command::Pause(id) => self.timers.pause(&id),
            Command::Reset(id) => self.timers.reset(&id),
            Command::Delete(id) => self.timers.delete(&id),
            Command::StartCategory(category) => self.timers.start_category(&category),
            Command::PauseCategory(category) => self.timers.pause_category(&category),
            Command::ResetCategory(category) => self.timers.reset_category(&category),
            Command::ClearHistory => return Ok(Some(self.history.clear())),
        };

        if event.is_some() {
            self.persist_timers();
        }
        Ok(event)
    }

    /// One tick of the engine over the current collection.
    pub fn tick(&mut self) -> TickReport {
        let report = self.engine.tick(&mut self.timers, &mut self.history);
        if report.advanced > 0 {
            self.persist_timers();
        }
        report
    }

    /// Register the single completion hook; the last registration wins.
    pub fn set_on_complete(&mut self, hook: impl FnMut(&Timer) + Send + 'static) {
        self.engine.set_on_complete(hook);
    }

    pub fn clear_on_complete(&mut self) {
        self.engine.clear_on_complete();
    }

    fn persist_timers(&self) {
        self.writer.save_timers(self.timers.timers().to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::storage::{MemoryStore, WriteOp};
    use crate::timer::TimerStatus;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn session() -> (TimerSession, UnboundedReceiver<WriteOp>) {
        let (writer, rx) = PersistenceWriter::channel();
        (TimerSession::with_state(Vec::new(), Vec::new(), writer), rx)
    }

    fn create(session: &mut TimerSession, name: &str, duration: &str, category: &str) -> TimerId {
        match session
            .dispatch(Command::Create(NewTimer::new(name, duration, category)))
            .unwrap()
        {
            Some(Event::TimerCreated { id, .. }) => id,
            other => panic!("Expected TimerCreated, got {other:?}"),
        }
    }

    fn drain(rx: &mut UnboundedReceiver<WriteOp>) -> Vec<WriteOp> {
        let mut ops = Vec::new();
        while let Ok(op) = rx.try_recv() {
            ops.push(op);
        }
        ops
    }

    #[test]
    fn every_mutation_persists_timers() {
        let (mut session, mut rx) = session();
        let id = create(&mut session, "Tea", "3", "Break");
        session.dispatch(Command::Start(id.clone())).unwrap();
        session.dispatch(Command::Delete(id)).unwrap();

        let ops = drain(&mut rx);
        assert_eq!(ops.len(), 3);
        assert_eq!(ops.last(), Some(&WriteOp::Timers(Vec::new())));
    }

    #[test]
    fn noop_commands_do_not_persist() {
        let (mut session, mut rx) = session();
        let id = create(&mut session, "Tea", "3", "Break");
        drain(&mut rx);

        assert!(session.dispatch(Command::Pause(TimerId::from("nope"))).unwrap().is_none());
        assert!(session.dispatch(Command::StartCategory("Nope".into())).unwrap().is_none());
        session.dispatch(Command::Start(id.clone())).unwrap();
        assert!(session.dispatch(Command::Start(id)).unwrap().is_none());
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn invalid_create_is_rejected_without_writes() {
        let (mut session, mut rx) = session();
        let err = session
            .dispatch(Command::Create(NewTimer::new("Tea", "soon", "Break")))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidDuration { .. })
        ));
        assert!(session.timers().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn ticks_complete_into_history_and_hook() {
        let (mut session, mut rx) = session();
        let id = create(&mut session, "Egg", "2", "Cooking");
        let (tx, done) = std::sync::mpsc::channel();
        session.set_on_complete(move |t: &Timer| {
            let _ = tx.send(t.id.clone());
        });
        session.dispatch(Command::Start(id.clone())).unwrap();
        drain(&mut rx);

        session.tick();
        let report = session.tick();
        assert_eq!(report.completed().count(), 1);
        assert_eq!(done.try_recv().unwrap(), id);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.get(&id).unwrap().status, TimerStatus::Completed);

        let ops = drain(&mut rx);
        assert!(ops.iter().any(|op| matches!(op, WriteOp::History(h) if h.len() == 1)));
        assert!(matches!(ops.last(), Some(WriteOp::Timers(_))));
    }

    #[test]
    fn idle_tick_does_not_persist() {
        let (mut session, mut rx) = session();
        create(&mut session, "Tea", "3", "Break");
        drain(&mut rx);
        assert_eq!(session.tick().advanced, 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn clear_history_and_export() {
        let (mut session, _rx) = session();
        let id = create(&mut session, "Egg", "1", "Cooking");
        session.dispatch(Command::Start(id)).unwrap();
        session.tick();
        assert_eq!(session.export().history.len(), 1);

        let event = session.dispatch(Command::ClearHistory).unwrap();
        assert!(matches!(event, Some(Event::HistoryCleared { removed: 1, .. })));
        let bundle = session.export();
        assert!(bundle.history.is_empty());
        assert_eq!(bundle.timers.len(), 1);
    }

    #[test]
    fn open_loads_persisted_state() {
        let persistence = Persistence::new(MemoryStore::new());
        let mut timer = NewTimer::new("Run", "60", "Workout").validate().unwrap();
        timer.status = TimerStatus::Running;
        timer.remaining_time = 30;
        persistence.save_timers(&[timer.clone()]);

        let (writer, _rx) = PersistenceWriter::channel();
        let session = TimerSession::open(&persistence, writer);
        assert_eq!(session.timers(), &[timer]);
        assert!(session.has_running());
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn load_then_flush_on_drop() {
        let store = MemoryStore::new();
        let (mut session, task) = TimerSession::load(Persistence::new(store.clone()));
        create(&mut session, "Run", "60", "Workout");
        drop(session);
        task.finish().await;

        let reloaded = Persistence::new(store).load_timers();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].name, "Run");
    }

    #[test]
    fn commands_serialize_as_tagged_json() {
        let json = serde_json::to_value(Command::Start(TimerId::from("abc"))).unwrap();
        assert_eq!(json["command"], "start");
        assert_eq!(json["arg"], "abc");
        let back: Command = serde_json::from_value(json).unwrap();
        assert_eq!(back, Command::Start(TimerId::from("abc")));
    }
}
