//! Notification planning and delivery seam
//!
//! The core decides *what* to notify and *when*; delivery (permissions, OS
//! scheduling) belongs to the `Notifier` implementation supplied by the host.

use crate::error::FastingError;
use crate::session::ActiveFast;
use crate::stages::FASTING_STAGES;
use crate::types::FastingRatio;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Opaque id of a scheduled notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(pub u64);

pub trait Notifier {
    /// Schedule a notification for `at`
    fn schedule_at(
        &self,
        at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<NotificationHandle, FastingError>;

    /// Cancel a scheduled notification. Unknown handles are ignored.
    fn cancel(&self, handle: NotificationHandle) -> Result<(), FastingError>;

    /// Show a notification immediately
    fn show_now(&self, title: &str, body: &str) -> Result<(), FastingError>;
}

/// A notification the core wants delivered at a given time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedNotification {
    pub at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// Notifications for a fast: one per stage boundary reached within the fasting
/// window (hour 0 excluded), then one at the end time.
pub fn plan_fast_notifications(
    fast: &ActiveFast,
    ratio: &FastingRatio,
) -> Vec<PlannedNotification> {
    let start = fast.start_time();
    let window = f64::from(ratio.fasting_hours);

    let mut planned: Vec<PlannedNotification> = FASTING_STAGES
        .iter()
        .filter(|stage| stage.start_hour > 0.0 && stage.start_hour <= window)
        .map(|stage| PlannedNotification {
            at: start + Duration::minutes((stage.start_hour * 60.0) as i64),
            title: stage.name.to_string(),
            body: format!("{} ({})", stage.description, stage.time_range()),
        })
        .collect();

    planned.push(PlannedNotification {
        at: fast.end_time(),
        title: "Fast complete".to_string(),
        body: "You can break your fast and enjoy your meal".to_string(),
    });

    planned
}

/// Event recorded by `MemoryNotifier`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    Scheduled {
        handle: NotificationHandle,
        at: DateTime<Utc>,
        title: String,
        body: String,
    },
    Cancelled {
        handle: NotificationHandle,
    },
    Shown {
        title: String,
        body: String,
    },
}

#[derive(Debug, Default)]
struct MemoryNotifierInner {
    next_handle: u64,
    pending: Vec<(NotificationHandle, PlannedNotification)>,
    events: Vec<NotificationEvent>,
}

/// Notifier that records everything in memory. Hosts without a native notifier
/// drain the event log and deliver the notifications themselves.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotifier {
    inner: Arc<Mutex<MemoryNotifierInner>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryNotifierInner>, FastingError> {
        self.inner
            .lock()
            .map_err(|_| FastingError::Sync("notifier lock poisoned".to_string()))
    }

    /// Notifications scheduled and not yet cancelled
    pub fn pending(&self) -> Vec<(NotificationHandle, PlannedNotification)> {
        self.lock().map(|inner| inner.pending.clone()).unwrap_or_default()
    }

    /// Every event recorded so far
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.lock().map(|inner| inner.events.clone()).unwrap_or_default()
    }

    /// Take and clear the event log
    pub fn drain_events(&self) -> Vec<NotificationEvent> {
        self.lock()
            .map(|mut inner| std::mem::take(&mut inner.events))
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn schedule_at(
        &self,
        at: DateTime<Utc>,
        title: &str,
        body: &str,
    ) -> Result<NotificationHandle, FastingError> {
        let mut inner = self.lock()?;
        inner.next_handle += 1;
        let handle = NotificationHandle(inner.next_handle);

        inner.pending.push((
            handle,
            PlannedNotification {
                at,
                title: title.to_string(),
                body: body.to_string(),
            },
        ));
        inner.events.push(NotificationEvent::Scheduled {
            handle,
            at,
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(handle)
    }

    fn cancel(&self, handle: NotificationHandle) -> Result<(), FastingError> {
        let mut inner = self.lock()?;
        let before = inner.pending.len();
        inner.pending.retain(|(h, _)| *h != handle);
        if inner.pending.len() != before {
            inner.events.push(NotificationEvent::Cancelled { handle });
        }
        Ok(())
    }

    fn show_now(&self, title: &str, body: &str) -> Result<(), FastingError> {
        self.lock()?.events.push(NotificationEvent::Shown {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
