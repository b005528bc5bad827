//! Progress aggregation
//!
//! Tracks which program days were completed, the current and longest streaks, and
//! the metrics recorded for each day. Metrics are keyed by day and overwritten on
//! re-record; there is no append-only log.

use crate::error::FastingError;
use crate::types::{DailyMetrics, WeeklySuccess};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Days per program week
pub const DAYS_PER_WEEK: u32 = 7;

/// Completed days, streaks and per-day metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProgressHistory")]
pub struct ProgressHistory {
    completed_days: BTreeSet<u32>,
    current_streak: u32,
    longest_streak: u32,
    current_day: u32,
    daily_metrics: BTreeMap<u32, DailyMetrics>,
    /// Hours fasted per day
    fast_log: BTreeMap<u32, f64>,
}

#[derive(Deserialize)]
struct RawProgressHistory {
    #[serde(default)]
    completed_days: BTreeSet<u32>,
    #[serde(default)]
    current_streak: u32,
    #[serde(default)]
    longest_streak: u32,
    #[serde(default = "first_day")]
    current_day: u32,
    #[serde(default)]
    daily_metrics: BTreeMap<u32, DailyMetrics>,
    #[serde(default)]
    fast_log: BTreeMap<u32, f64>,
}

fn first_day() -> u32 {
    1
}

impl From<RawProgressHistory> for ProgressHistory {
    fn from(raw: RawProgressHistory) -> Self {
        // Persisted data may be partial; restore the streak and day invariants
        Self {
            longest_streak: raw.longest_streak.max(raw.current_streak),
            current_day: raw.current_day.max(1),
            completed_days: raw.completed_days,
            current_streak: raw.current_streak,
            daily_metrics: raw.daily_metrics,
            fast_log: raw.fast_log,
        }
    }
}

impl Default for ProgressHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressHistory {
    pub fn new() -> Self {
        Self {
            completed_days: BTreeSet::new(),
            current_streak: 0,
            longest_streak: 0,
            current_day: 1,
            daily_metrics: BTreeMap::new(),
            fast_log: BTreeMap::new(),
        }
    }

    pub fn completed_days(&self) -> &BTreeSet<u32> {
        &self.completed_days
    }

    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    pub fn metrics_for(&self, day: u32) -> Option<&DailyMetrics> {
        self.daily_metrics.get(&day)
    }

    pub fn daily_metrics(&self) -> &BTreeMap<u32, DailyMetrics> {
        &self.daily_metrics
    }

    pub fn fasted_hours(&self, day: u32) -> Option<f64> {
        self.fast_log.get(&day).copied()
    }

    /// Mark the current day as completed and extend the streak.
    ///
    /// Returns false when the day was already completed; the streak only grows once
    /// per day.
    pub fn record_completion(&mut self, fasted_hours: f64) -> bool {
        let day = self.current_day;
        self.log_fast(day, fasted_hours);

        if !self.completed_days.insert(day) {
            return false;
        }

        self.current_streak += 1;
        self.longest_streak = self.longest_streak.max(self.current_streak);
        true
    }

    /// Remember how long the user fasted on `day` (longest fast wins)
    pub fn log_fast(&mut self, day: u32, fasted_hours: f64) {
        if !fasted_hours.is_finite() || fasted_hours < 0.0 {
            return;
        }
        let entry = self.fast_log.entry(day).or_insert(0.0);
        *entry = entry.max(fasted_hours);
    }

    /// Upsert the metrics for `day`, replacing any existing entry
    pub fn record_daily_metrics(
        &mut self,
        day: u32,
        metrics: DailyMetrics,
        program_days: u32,
    ) -> Result<(), FastingError> {
        check_program_day(day, program_days)?;
        metrics.validate()?;
        self.daily_metrics.insert(day, metrics);
        Ok(())
    }

    /// Change individual fields of a day's metrics, keeping the rest
    pub fn update_daily_metrics(
        &mut self,
        day: u32,
        program_days: u32,
        update: impl FnOnce(&mut DailyMetrics),
    ) -> Result<DailyMetrics, FastingError> {
        let mut metrics = self.daily_metrics.get(&day).copied().unwrap_or_default();
        update(&mut metrics);
        self.record_daily_metrics(day, metrics, program_days)?;
        Ok(metrics)
    }

    /// Fold metrics kept outside the history (e.g. appended to a store) back in.
    /// Entries for days outside the program are dropped.
    pub fn merge_daily_metrics(
        &mut self,
        metrics: impl IntoIterator<Item = (u32, DailyMetrics)>,
        program_days: u32,
    ) {
        for (day, entry) in metrics {
            if let Err(e) = self.record_daily_metrics(day, entry, program_days) {
                log::warn!("dropping stored metrics for day {day}: {e}");
            }
        }
    }

    /// Move to another program day. Moving forward past a day that was not
    /// completed breaks the current streak.
    pub fn advance_day(&mut self, day: u32, program_days: u32) -> Result<(), FastingError> {
        check_program_day(day, program_days)?;

        if day > self.current_day && !self.completed_days.contains(&(day - 1)) {
            log::debug!("day {} missed, resetting streak of {}", day - 1, self.current_streak);
            self.current_streak = 0;
        }
        self.current_day = day;
        Ok(())
    }

    /// Number of program days tracked so far
    pub fn days_tracked(&self, program_days: u32) -> u32 {
        self.current_day.min(program_days)
    }

    /// Completed days as a percentage of days elapsed
    pub fn completion_rate(&self) -> f64 {
        if self.current_day == 0 {
            return 0.0;
        }
        self.completed_days.len() as f64 / self.current_day as f64 * 100.0
    }
}

fn check_program_day(day: u32, program_days: u32) -> Result<(), FastingError> {
    if day == 0 || day > program_days {
        return Err(FastingError::Validation(format!(
            "day {day} is outside the {program_days}-day program"
        )));
    }
    Ok(())
}

/// Success rate for program week `week` (1-based)
pub fn weekly_success_rate(
    history: &ProgressHistory,
    week: u32,
    program_days: u32,
) -> WeeklySuccess {
    let days_so_far = history.days_tracked(program_days);
    let week_start = week
        .saturating_sub(1)
        .saturating_mul(DAYS_PER_WEEK)
        .saturating_add(1);
    let week_end = week.saturating_mul(DAYS_PER_WEEK).min(days_so_far);

    if week == 0 || week_end < week_start {
        return WeeklySuccess {
            week,
            success_rate: 0.0,
            completed: 0,
            total: 0,
        };
    }

    let total = week_end - week_start + 1;
    let completed = history.completed_days.range(week_start..=week_end).count() as u32;

    WeeklySuccess {
        week,
        success_rate: (completed as f64 / total as f64 * 100.0).clamp(0.0, 100.0),
        completed,
        total,
    }
}
