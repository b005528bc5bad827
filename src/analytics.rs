//! Analytics series generation
//!
//! Derives chart-ready series from recorded history. Only days with real
//! measurements produce weight, water and mood points, so a sparse history yields
//! shorter series rather than invented values. The fasting and weekly series cover
//! every tracked day.

use crate::config::TrackerConfig;
use crate::progress::{weekly_success_rate, ProgressHistory, DAYS_PER_WEEK};
use crate::types::{
    AnalyticsSeries, FastingPoint, FastingRatio, MoodPoint, UserProfile, WaterPoint,
    WeeklySuccess, WeightPoint,
};

/// Target weight assumed below the start weight when the profile has none (kg)
pub const DEFAULT_TARGET_DROP_KG: f64 = 5.0;

/// Series generator
pub struct AnalyticsGenerator;

impl AnalyticsGenerator {
    /// Build all series for the tracked days
    pub fn generate(
        history: &ProgressHistory,
        profile: &UserProfile,
        ratio: &FastingRatio,
        config: &TrackerConfig,
    ) -> AnalyticsSeries {
        let days = history.days_tracked(config.program_days);

        AnalyticsSeries {
            weight: weight_series(history, profile, config, days),
            fasting: fasting_series(history, ratio, days),
            water: water_series(history, config, days),
            mood: mood_series(history, days),
            weekly_success: weekly_series(history, config, days),
        }
    }
}

/// Starting weight: first recorded measurement, then the profile, then the default
fn start_weight(history: &ProgressHistory, profile: &UserProfile, config: &TrackerConfig) -> f64 {
    history
        .daily_metrics()
        .values()
        .find_map(|m| m.weight)
        .or(profile.weight_kg)
        .unwrap_or(config.default_weight_kg)
}

fn weight_series(
    history: &ProgressHistory,
    profile: &UserProfile,
    config: &TrackerConfig,
    days: u32,
) -> Vec<WeightPoint> {
    let start = start_weight(history, profile, config);
    let target = profile
        .target_weight_kg
        .unwrap_or(start - DEFAULT_TARGET_DROP_KG);
    let per_day = (start - target) / config.program_days as f64;

    (1..=days)
        .filter_map(|day| {
            let weight = history.metrics_for(day)?.weight?;
            Some(WeightPoint {
                day,
                weight,
                target: start - per_day * day as f64,
            })
        })
        .collect()
}

fn fasting_series(history: &ProgressHistory, ratio: &FastingRatio, days: u32) -> Vec<FastingPoint> {
    (1..=days)
        .map(|day| FastingPoint {
            day,
            duration: history.fasted_hours(day),
            planned: ratio.fasting_hours,
            completed: history.completed_days().contains(&day),
        })
        .collect()
}

fn water_series(history: &ProgressHistory, config: &TrackerConfig, days: u32) -> Vec<WaterPoint> {
    (1..=days)
        .filter_map(|day| {
            let intake = history.metrics_for(day)?.water_intake?;
            Some(WaterPoint {
                day,
                intake,
                goal: config.daily_water_goal,
            })
        })
        .collect()
}

fn mood_series(history: &ProgressHistory, days: u32) -> Vec<MoodPoint> {
    (1..=days)
        .filter_map(|day| {
            let mood = history.metrics_for(day)?.mood?;
            Some(MoodPoint {
                day,
                mood: mood.clamp(1.0, 5.0),
            })
        })
        .collect()
}

fn weekly_series(
    history: &ProgressHistory,
    config: &TrackerConfig,
    days: u32,
) -> Vec<WeeklySuccess> {
    let weeks = days.div_ceil(DAYS_PER_WEEK);
    (1..=weeks)
        .map(|week| weekly_success_rate(history, week, config.program_days))
        .collect()
}
