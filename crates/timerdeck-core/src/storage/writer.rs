//! Fire-and-forget persistence.
//!
//! Callers hand full snapshots to a [`PersistenceWriter`]; sending never
//! blocks. A single consumer applies them in send order, so for any key the
//! last snapshot sent is the one that ends up stored.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::gateway::Persistence;
use super::KeyValueStore;
use crate::history::TimerHistoryEntry;
use crate::theme::Theme;
use crate::timer::Timer;

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Timers(Vec<Timer>),
    History(Vec<TimerHistoryEntry>),
    Theme(Theme),
}

impl WriteOp {
    /// Write the snapshot through the gateway.
    pub fn apply<S: KeyValueStore>(&self, persistence: &Persistence<S>) {
        match self {
            WriteOp::Timers(timers) => persistence.save_timers(timers),
            WriteOp::History(history) => persistence.save_history(history),
            WriteOp::Theme(theme) => persistence.save_theme(*theme),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PersistenceWriter {
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl PersistenceWriter {
    /// A writer plus the receiving end, for callers that apply ops themselves.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WriteOp>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Start the consumer on tokio's blocking pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(persistence: Persistence<S>) -> (Self, WriterTask)
    where
        S: KeyValueStore + 'static,
    {
        let (writer, mut rx) = Self::channel();
        let handle = tokio::task::spawn_blocking(move || {
            let mut applied = 0usize;
            while let Some(op) = rx.blocking_recv() {
                op.apply(&persistence);
                applied += 1;
            }
            debug!(applied, "persistence writer stopped");
        });
        (writer, WriterTask { handle })
    }

    pub fn save_timers(&self, timers: Vec<Timer>) {
        self.send(WriteOp::Timers(timers));
    }

    pub fn save_history(&self, history: Vec<TimerHistoryEntry>) {
        self.send(WriteOp::History(history));
    }

    pub fn save_theme(&self, theme: Theme) {
        self.send(WriteOp::Theme(theme));
    }

    fn send(&self, op: WriteOp) {
        if self.tx.send(op).is_err() {
            warn!("persistence writer is gone, dropping write");
        }
    }
}

/// Handle on the consumer started by [`PersistenceWriter::spawn`].
pub struct WriterTask {
    handle: JoinHandle<()>,
}

impl WriterTask {
    /// Wait until every queued write has been applied.
    ///
    /// Completes once all `PersistenceWriter` clones have been dropped.
    pub async fn finish(self) {
        if let Err(e) = self.handle.await {
            warn!(error = %e, "persistence writer panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, TIMERS_KEY};
    use crate::timer::NewTimer;

    #[tokio::test]
    async fn writes_land_in_send_order() {
        let store = MemoryStore::new();
        let (writer, task) = PersistenceWriter::spawn(Persistence::new(store.clone()));

        let a = NewTimer::new("A", "10", "Work").validate().unwrap();
        let b = NewTimer::new("B", "10", "Work").validate().unwrap();
        writer.save_timers(vec![a.clone()]);
        writer.save_timers(vec![a, b]);
        writer.save_theme(Theme::Dark);
        drop(writer);
        task.finish().await;

        let persistence = Persistence::new(store);
        assert_eq!(persistence.load_timers().len(), 2);
        assert_eq!(persistence.load_theme(), Theme::Dark);
        assert!(persistence.store().get(TIMERS_KEY).unwrap().is_some());
    }

    #[test]
    fn channel_exposes_ops() {
        let (writer, mut rx) = PersistenceWriter::channel();
        writer.save_theme(Theme::Dark);
        assert_eq!(rx.try_recv().unwrap(), WriteOp::Theme(Theme::Dark));
    }
}
