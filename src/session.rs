//! Fasting session state machine
//!
//! A session is either idle or running a single fast. Time never advances inside the
//! session itself: every operation takes `now` explicitly, which keeps `tick` a pure
//! derivation and lets the controller (or a test) decide what time it is.
//!
//! ```text
//! Idle --start--> Active --end--> Idle
//!                   |  ^
//!                   +--+ tick (derived values only)
//! ```

use crate::config::TrackerConfig;
use crate::error::FastingError;
use crate::stages::{next_stage_for_elapsed_hours, stage_for_elapsed_hours, StageDefinition};
use crate::types::{FastingRatio, MS_PER_HOUR};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A fast that is currently running
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawActiveFast")]
pub struct ActiveFast {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    /// External reference, set once the session is persisted
    session_id: Option<String>,
}

#[derive(Deserialize)]
struct RawActiveFast {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    session_id: Option<String>,
}

impl TryFrom<RawActiveFast> for ActiveFast {
    type Error = FastingError;

    fn try_from(raw: RawActiveFast) -> Result<Self, Self::Error> {
        let mut fast = ActiveFast::new(raw.start_time, raw.end_time)?;
        fast.session_id = raw.session_id;
        Ok(fast)
    }
}

impl ActiveFast {
    /// Create an active fast; `end_time` must be after `start_time`
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Result<Self, FastingError> {
        if end_time <= start_time {
            return Err(FastingError::Validation(format!(
                "fast end {end_time} is not after start {start_time}"
            )));
        }
        Ok(Self {
            start_time,
            end_time,
            session_id: None,
        })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Planned length in milliseconds
    pub fn planned_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds()
    }
}

/// Values derived on each timer tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReading {
    pub elapsed_ms: i64,
    pub remaining_ms: i64,
    /// Progress through the fasting window (0-100)
    pub progress_pct: f64,
    pub current_stage: &'static StageDefinition,
    pub next_stage: Option<&'static StageDefinition>,
    /// True once the end time has been reached
    pub is_complete: bool,
}

/// How a fast ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FastOutcome {
    /// End time reached
    Completed,
    /// Stopped by the user before the end time
    EndedEarly,
}

/// Summary of a fast that was just ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndedFast {
    pub start_time: DateTime<Utc>,
    pub planned_end_time: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub session_id: Option<String>,
    pub outcome: FastOutcome,
    /// Hours actually fasted, capped at the planned window
    pub fasted_hours: f64,
}

/// Session state: the configured ratio plus the running fast, if any
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FastingSession {
    pub ratio: FastingRatio,
    #[serde(default)]
    active: Option<ActiveFast>,
}

impl FastingSession {
    pub fn new(ratio: FastingRatio) -> Self {
        Self { ratio, active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveFast> {
        self.active.as_ref()
    }

    /// Start a fast at `now` using the configured ratio
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<&ActiveFast, FastingError> {
        if self.is_active() {
            return Err(FastingError::InvalidState(
                "a fast is already active".to_string(),
            ));
        }

        let end_time = now
            .checked_add_signed(Duration::milliseconds(self.ratio.fasting_ms()))
            .ok_or_else(|| {
                FastingError::Validation(format!(
                    "a {} fast starting at {now} ends out of range",
                    self.ratio
                ))
            })?;
        log::debug!("starting {} fast at {now}, ends {end_time}", self.ratio);

        let fast = ActiveFast::new(now, end_time)?;
        Ok(&*self.active.insert(fast))
    }

    /// Start a fast with an explicit fasting/eating split
    pub fn start_with(
        &mut self,
        fasting_hours: u32,
        eating_hours: u32,
        now: DateTime<Utc>,
    ) -> Result<&ActiveFast, FastingError> {
        if self.is_active() {
            return Err(FastingError::InvalidState(
                "a fast is already active".to_string(),
            ));
        }
        self.ratio = FastingRatio::new(fasting_hours, eating_hours)?;
        self.start(now)
    }

    /// Restore a fast loaded from persistence without re-deriving its times
    pub fn resume(&mut self, fast: ActiveFast) -> Result<(), FastingError> {
        if self.is_active() {
            return Err(FastingError::InvalidState(
                "cannot resume over an active fast".to_string(),
            ));
        }
        self.active = Some(fast);
        Ok(())
    }

    /// Attach the external id assigned when the session was persisted
    pub fn set_session_id(&mut self, id: String) {
        if let Some(active) = self.active.as_mut() {
            active.session_id = Some(id);
        }
    }

    /// Derive elapsed/remaining time and stages at `now`. Never mutates.
    pub fn tick(&self, now: DateTime<Utc>) -> Result<TickReading, FastingError> {
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| FastingError::InvalidState("no active fast".to_string()))?;

        // Clock skew can put `now` before the start; elapsed never goes negative
        let elapsed_ms = (now - active.start_time).num_milliseconds().max(0);
        let remaining_ms = (active.end_time - now).num_milliseconds().max(0);

        let window_ms = active.planned_ms() as f64;
        let progress_pct = if window_ms > 0.0 {
            (elapsed_ms as f64 / window_ms * 100.0).clamp(0.0, 100.0)
        } else {
            100.0
        };

        let elapsed_hours = elapsed_ms as f64 / MS_PER_HOUR as f64;

        Ok(TickReading {
            elapsed_ms,
            remaining_ms,
            progress_pct,
            current_stage: stage_for_elapsed_hours(elapsed_hours),
            next_stage: next_stage_for_elapsed_hours(elapsed_hours),
            is_complete: remaining_ms == 0,
        })
    }

    /// End the running fast at `now`, returning what happened
    pub fn end(&mut self, now: DateTime<Utc>) -> Result<EndedFast, FastingError> {
        let active = self
            .active
            .take()
            .ok_or_else(|| FastingError::InvalidState("no active fast to end".to_string()))?;

        let outcome = if now >= active.end_time {
            FastOutcome::Completed
        } else {
            FastOutcome::EndedEarly
        };

        let fasted_ms = (now.min(active.end_time) - active.start_time)
            .num_milliseconds()
            .max(0);

        log::debug!("fast ended at {now} ({outcome:?})");

        Ok(EndedFast {
            start_time: active.start_time,
            planned_end_time: active.end_time,
            ended_at: now,
            session_id: active.session_id,
            outcome,
            fasted_hours: fasted_ms as f64 / MS_PER_HOUR as f64,
        })
    }

    /// Change the fasting ratio. Rejected while a fast is running.
    pub fn set_ratio(&mut self, ratio: &str, config: &TrackerConfig) -> Result<(), FastingError> {
        if self.is_active() {
            return Err(FastingError::InvalidState(
                "cannot change the fasting ratio during an active fast".to_string(),
            ));
        }
        let parsed: FastingRatio = ratio.parse()?;
        config.check_ratio(&parsed)?;
        self.ratio = parsed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap()
    }

    fn hours(h: i64) -> Duration {
        Duration::hours(h)
    }

    #[test]
    fn test_start_sets_window() {
        let mut session = FastingSession::default();
        let fast = session.start(t0()).unwrap();

        assert_eq!(fast.start_time(), t0());
        assert_eq!(fast.end_time(), t0() + hours(16));
        assert!(fast.session_id().is_none());
        assert!(session.is_active());
    }

    #[test]
    fn test_start_out_of_range_is_validation_error() {
        let mut session = FastingSession::default();
        let result = session.start(DateTime::<Utc>::MAX_UTC - hours(1));

        assert!(matches!(result, Err(FastingError::Validation(_))));
        assert!(!session.is_active());
    }

    #[test]
    fn test_start_with_oversized_hours_is_rejected() {
        let mut session = FastingSession::default();
        let result = session.start_with(4_000_000_000, 1, t0());

        assert!(matches!(result, Err(FastingError::Validation(_))));
        assert!(!session.is_active());
        assert_eq!(session.ratio, FastingRatio::default());
    }

    #[test]
    fn test_start_twice_is_invalid_state() {
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();

        let second = session.start(t0() + hours(1));
        assert!(matches!(second, Err(FastingError::InvalidState(_))));
    }

    #[test]
    fn test_start_with_explicit_hours() {
        let mut session = FastingSession::default();
        let fast = session.start_with(20, 4, t0()).unwrap();
        assert_eq!(fast.end_time(), t0() + hours(20));
        assert_eq!(session.ratio.to_string(), "20:4");
    }

    #[test]
    fn test_tick_at_start() {
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();

        let reading = session.tick(t0()).unwrap();
        assert_eq!(reading.elapsed_ms, 0);
        assert_eq!(reading.remaining_ms, 16 * MS_PER_HOUR);
        assert_eq!(reading.progress_pct, 0.0);
        assert_eq!(reading.current_stage.id, 1);
        assert_eq!(reading.next_stage.map(|s| s.id), Some(2));
        assert!(!reading.is_complete);
    }

    #[test]
    fn test_tick_midway() {
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();

        let reading = session.tick(t0() + hours(12)).unwrap();
        assert_eq!(reading.elapsed_ms, 12 * MS_PER_HOUR);
        assert_eq!(reading.remaining_ms, 4 * MS_PER_HOUR);
        assert!((reading.progress_pct - 75.0).abs() < 1e-9);
        assert_eq!(reading.current_stage.id, 4);
    }

    #[test]
    fn test_tick_clamps_remaining() {
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();

        let at_end = session.tick(t0() + hours(16)).unwrap();
        assert_eq!(at_end.remaining_ms, 0);
        assert!(at_end.is_complete);
        assert_eq!(at_end.progress_pct, 100.0);

        let past_end = session.tick(t0() + hours(30)).unwrap();
        assert_eq!(past_end.remaining_ms, 0);
        assert_eq!(past_end.progress_pct, 100.0);
        assert_eq!(past_end.current_stage.id, 6);
    }

    #[test]
    fn test_tick_before_start_is_zero_elapsed() {
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();

        let reading = session.tick(t0() - Duration::seconds(5)).unwrap();
        assert_eq!(reading.elapsed_ms, 0);
    }

    #[test]
    fn test_tick_idle_is_invalid_state() {
        let session = FastingSession::default();
        assert!(matches!(
            session.tick(t0()),
            Err(FastingError::InvalidState(_))
        ));
    }

    #[test]
    fn test_end_outcomes() {
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();
        let early = session.end(t0() + hours(10)).unwrap();
        assert_eq!(early.outcome, FastOutcome::EndedEarly);
        assert!((early.fasted_hours - 10.0).abs() < 1e-9);
        assert!(!session.is_active());

        session.start(t0() + hours(24)).unwrap();
        let done = session.end(t0() + hours(24 + 17)).unwrap();
        assert_eq!(done.outcome, FastOutcome::Completed);
        // Capped at the planned window
        assert!((done.fasted_hours - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_idle_is_invalid_state() {
        let mut session = FastingSession::default();
        assert!(matches!(
            session.end(t0()),
            Err(FastingError::InvalidState(_))
        ));
    }

    #[test]
    fn test_end_clears_session_id() {
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();
        session.set_session_id("sess-1".to_string());
        assert_eq!(session.active().and_then(|a| a.session_id()), Some("sess-1"));

        let ended = session.end(t0() + hours(16)).unwrap();
        assert_eq!(ended.session_id.as_deref(), Some("sess-1"));
        assert!(session.active().is_none());
    }

    #[test]
    fn test_set_ratio() {
        let config = TrackerConfig::default();
        let mut session = FastingSession::default();

        session.set_ratio("18:6", &config).unwrap();
        assert_eq!(session.ratio.fasting_hours, 18);
        assert_eq!(session.ratio.eating_hours, 6);

        assert!(matches!(
            session.set_ratio("16-8", &config),
            Err(FastingError::Validation(_))
        ));
        assert!(matches!(
            session.set_ratio("16:10", &config),
            Err(FastingError::Validation(_))
        ));
    }

    #[test]
    fn test_set_ratio_rejected_while_active() {
        let config = TrackerConfig::default();
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();

        assert!(matches!(
            session.set_ratio("20:4", &config),
            Err(FastingError::InvalidState(_))
        ));
        assert_eq!(session.ratio.to_string(), "16:8");
    }

    #[test]
    fn test_active_fast_rejects_inverted_window() {
        assert!(ActiveFast::new(t0(), t0()).is_err());

        let json = format!(
            r#"{{"ratio":"16:8","active":{{"start_time":"{}","end_time":"{}","session_id":null}}}}"#,
            t0().to_rfc3339(),
            (t0() - hours(1)).to_rfc3339()
        );
        assert!(serde_json::from_str::<FastingSession>(&json).is_err());
    }

    #[test]
    fn test_session_serialization() {
        let mut session = FastingSession::default();
        session.start(t0()).unwrap();
        session.set_session_id("abc".to_string());

        let json = serde_json::to_string(&session).unwrap();
        let loaded: FastingSession = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, session);
    }
}
