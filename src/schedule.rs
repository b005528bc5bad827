//! Recurring fasting schedules
//!
//! A schedule names a weekly plan: a start time of day, the weekdays it applies to
//! (empty means every day) and the ratio to fast with. Times are interpreted in UTC.

use crate::error::FastingError;
use crate::types::FastingRatio;
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// `HH:MM` time-of-day encoding
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Parse a `HH:MM` time of day
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, FastingError> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| FastingError::Validation(format!("'{raw}' is not a HH:MM time")))
}

/// Fields supplied when creating a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDraft {
    pub name: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(default)]
    pub days: Vec<Weekday>,
    #[serde(default)]
    pub ratio: FastingRatio,
    #[serde(default = "enabled")]
    pub active: bool,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastingSchedule {
    pub id: String,
    pub name: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    /// Weekdays the schedule applies to; empty means daily
    pub days: Vec<Weekday>,
    pub ratio: FastingRatio,
    pub active: bool,
}

impl FastingSchedule {
    /// Validate a draft and assign it a fresh id
    pub fn from_draft(draft: ScheduleDraft) -> Result<Self, FastingError> {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            start_time: draft.start_time,
            days: draft.days,
            ratio: draft.ratio,
            active: draft.active,
        }
        .normalized()
    }

    /// Trim the name, dedupe and order the weekdays
    pub fn normalized(mut self) -> Result<Self, FastingError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(FastingError::Validation(
                "schedule name must not be empty".to_string(),
            ));
        }
        self.days.sort_by_key(|day| day.num_days_from_sunday());
        self.days.dedup();
        Ok(self)
    }

    /// Time of day the eating window opens
    pub fn eating_window_start(&self) -> NaiveTime {
        self.start_time + Duration::hours(i64::from(self.ratio.fasting_hours))
    }

    fn applies_on(&self, weekday: Weekday) -> bool {
        self.days.is_empty() || self.days.contains(&weekday)
    }

    /// First start at or after the day of `now` on `weekday`, strictly after `now`
    fn next_on(&self, now: DateTime<Utc>, weekday: Option<Weekday>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        (0..=7).find_map(|offset| {
            let date = today + Duration::days(offset);
            let wanted = weekday.map_or(self.applies_on(date.weekday()), |w| date.weekday() == w);
            if !wanted {
                return None;
            }
            let start = Utc.from_utc_datetime(&date.and_time(self.start_time));
            (start > now).then_some(start)
        })
    }

    /// Next start strictly after `now`; `None` for inactive schedules
    pub fn next_start_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.active {
            return None;
        }
        self.next_on(now, None)
    }

    /// Next start for each selected weekday (a single entry for daily schedules),
    /// in chronological order
    pub fn upcoming_starts(&self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if !self.active {
            return Vec::new();
        }
        if self.days.is_empty() {
            return self.next_on(now, None).into_iter().collect();
        }
        let mut starts: Vec<_> = self
            .days
            .iter()
            .filter_map(|day| self.next_on(now, Some(*day)))
            .collect();
        starts.sort();
        starts
    }
}
