//! Best-effort persistence of timers, history and theme.
//!
//! Nothing here returns an error: a failed save is logged and dropped, a
//! failed or corrupt load is logged and replaced by the default. The
//! in-memory state stays authoritative for the session.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::StorageError;
use crate::history::TimerHistoryEntry;
use crate::theme::Theme;
use crate::timer::Timer;

pub const TIMERS_KEY: &str = "timers";
pub const HISTORY_KEY: &str = "timer_history";
pub const THEME_KEY: &str = "app_theme";

pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn save_timers(&self, timers: &[Timer]) {
        self.save_json(TIMERS_KEY, &timers);
    }

    pub fn load_timers(&self) -> Vec<Timer> {
        self.load_json(TIMERS_KEY).unwrap_or_default()
    }

    pub fn save_history(&self, history: &[TimerHistoryEntry]) {
        self.save_json(HISTORY_KEY, &history);
    }

    pub fn load_history(&self) -> Vec<TimerHistoryEntry> {
        self.load_json(HISTORY_KEY).unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) {
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            warn!(key = THEME_KEY, error = %e, "failed to save theme");
        }
    }

    /// Stored theme, or [`Theme::Light`] when missing or unrecognised.
    pub fn load_theme(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: String| {
                warn!(key = THEME_KEY, error = %e, "ignoring stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(key = THEME_KEY, error = %e, "failed to load theme");
                Theme::default()
            }
        }
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(|source| StorageError::Serialization {
                key: key.to_string(),
                source,
            })
            .and_then(|json| self.store.set(key, &json));

        match result {
            Ok(()) => debug!(key, "saved"),
            Err(e) => warn!(key, error = %e, "failed to save"),
        }
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "failed to load, using defaults");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(source) => {
                let e = StorageError::Serialization {
                    key: key.to_string(),
                    source,
                };
                warn!(key, error = %e, "stored value is corrupt, using defaults");
                None
            }
        }
    }
}
