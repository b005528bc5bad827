//! Persistence seams
//!
//! `SessionStore` is the remote backend keyed by user; `LocalCache` keeps the whole
//! tracker state on the device. Both are best-effort from the controller's point of
//! view: failures are reported as `FastingError::Sync` and never roll back local
//! state.

use crate::error::FastingError;
use crate::progress::ProgressHistory;
use crate::session::FastingSession;
use crate::state::TrackerState;
use crate::types::DailyMetrics;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Remote session/history backend
pub trait SessionStore {
    fn load_session(&self, user_id: &str) -> Result<Option<FastingSession>, FastingError>;

    /// Persist the session. Returns the id assigned to the active fast, if any.
    fn save_session(
        &self,
        user_id: &str,
        session: &FastingSession,
    ) -> Result<Option<String>, FastingError>;

    fn load_history(&self, user_id: &str) -> Result<Option<ProgressHistory>, FastingError>;

    fn save_history(&self, user_id: &str, history: &ProgressHistory) -> Result<(), FastingError>;

    fn append_daily_metric(
        &self,
        user_id: &str,
        day: u32,
        metrics: &DailyMetrics,
    ) -> Result<(), FastingError>;
}

/// Device-local snapshot of the tracker state
pub trait LocalCache {
    fn load(&self) -> Result<Option<TrackerState>, FastingError>;

    fn save(&self, state: &TrackerState) -> Result<(), FastingError>;
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    offline: bool,
    sessions: HashMap<String, FastingSession>,
    histories: HashMap<String, ProgressHistory>,
    metrics: HashMap<String, BTreeMap<u32, DailyMetrics>>,
}

/// In-memory `SessionStore`. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend: every call fails with `Sync`
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.offline = offline;
        }
    }

    /// Metrics appended for a user, keyed by day
    pub fn metrics(&self, user_id: &str) -> BTreeMap<u32, DailyMetrics> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.metrics.get(user_id).cloned())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStoreInner>, FastingError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| FastingError::Sync("store lock poisoned".to_string()))?;
        if inner.offline {
            return Err(FastingError::Sync("store is offline".to_string()));
        }
        Ok(inner)
    }
}

impl SessionStore for MemoryStore {
    fn load_session(&self, user_id: &str) -> Result<Option<FastingSession>, FastingError> {
        Ok(self.lock()?.sessions.get(user_id).cloned())
    }

    fn save_session(
        &self,
        user_id: &str,
        session: &FastingSession,
    ) -> Result<Option<String>, FastingError> {
        let mut stored = session.clone();
        let id = match session.active() {
            Some(active) => Some(
                active
                    .session_id()
                    .map(str::to_string)
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            ),
            None => None,
        };
        if let Some(id) = &id {
            stored.set_session_id(id.clone());
        }

        self.lock()?.sessions.insert(user_id.to_string(), stored);
        Ok(id)
    }

    fn load_history(&self, user_id: &str) -> Result<Option<ProgressHistory>, FastingError> {
        let inner = self.lock()?;
        let Some(mut history) = inner.histories.get(user_id).cloned() else {
            return Ok(None);
        };
        // Appended metrics are newer than the last full history save.
        // Their days were bounded when they were recorded.
        if let Some(metrics) = inner.metrics.get(user_id) {
            history.merge_daily_metrics(metrics.iter().map(|(day, m)| (*day, *m)), u32::MAX);
        }
        Ok(Some(history))
    }

    fn save_history(&self, user_id: &str, history: &ProgressHistory) -> Result<(), FastingError> {
        self.lock()?
            .histories
            .insert(user_id.to_string(), history.clone());
        Ok(())
    }

    fn append_daily_metric(
        &self,
        user_id: &str,
        day: u32,
        metrics: &DailyMetrics,
    ) -> Result<(), FastingError> {
        self.lock()?
            .metrics
            .entry(user_id.to_string())
            .or_default()
            .insert(day, *metrics);
        Ok(())
    }
}

/// `LocalCache` backed by a pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalCache for JsonFileCache {
    fn load(&self) -> Result<Option<TrackerState>, FastingError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn save(&self, state: &TrackerState) -> Result<(), FastingError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory `LocalCache`. Clones share the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    state: Arc<Mutex<Option<TrackerState>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-seeded with a snapshot
    pub fn with_state(state: TrackerState) -> Self {
        Self {
            state: Arc::new(Mutex::new(Some(state))),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<TrackerState>>, FastingError> {
        self.state
            .lock()
            .map_err(|_| FastingError::Sync("cache lock poisoned".to_string()))
    }
}

impl LocalCache for MemoryCache {
    fn load(&self) -> Result<Option<TrackerState>, FastingError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, state: &TrackerState) -> Result<(), FastingError> {
        *self.lock()? = Some(state.clone());
        Ok(())
    }
}
