//! Tracker configuration
//!
//! Program length, goals and fallbacks used by the controller and the derived
//! computations. Every field has a default, so a partial JSON document is enough.

use crate::error::FastingError;
use crate::types::FastingRatio;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Length of the fixed fasting program in days
pub const DEFAULT_PROGRAM_DAYS: u32 = 20;

/// Daily water goal in glasses
pub const DEFAULT_WATER_GOAL: u32 = 8;

/// Weight assumed when the user has not recorded one (kg)
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// Calorie target returned when the profile is incomplete
pub const DEFAULT_CALORIE_TARGET: u32 = 2000;

/// How an early, user-triggered end of a fast is counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyEndPolicy {
    /// Early ends count as a completed day, like natural completion
    #[default]
    CountAsCompleted,
    /// Only fasts that reach their end time count
    Discard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub program_days: u32,
    pub daily_water_goal: u32,
    pub default_weight_kg: f64,
    pub default_calorie_target: u32,
    /// Reject ratios whose windows do not add up to 24 hours
    pub require_full_day_ratio: bool,
    pub early_end_policy: EarlyEndPolicy,
    pub default_ratio: FastingRatio,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            program_days: DEFAULT_PROGRAM_DAYS,
            daily_water_goal: DEFAULT_WATER_GOAL,
            default_weight_kg: DEFAULT_WEIGHT_KG,
            default_calorie_target: DEFAULT_CALORIE_TARGET,
            require_full_day_ratio: true,
            early_end_policy: EarlyEndPolicy::default(),
            default_ratio: FastingRatio::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, FastingError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, FastingError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), FastingError> {
        if self.program_days == 0 {
            return Err(FastingError::Validation(
                "program_days must be at least 1".to_string(),
            ));
        }
        if self.daily_water_goal == 0 {
            return Err(FastingError::Validation(
                "daily_water_goal must be at least 1".to_string(),
            ));
        }
        if !(self.default_weight_kg.is_finite() && self.default_weight_kg > 0.0) {
            return Err(FastingError::Validation(
                "default_weight_kg must be positive".to_string(),
            ));
        }
        self.check_ratio(&self.default_ratio)
    }

    /// Apply the full-day rule to a ratio
    pub fn check_ratio(&self, ratio: &FastingRatio) -> Result<(), FastingError> {
        if self.require_full_day_ratio && !ratio.covers_full_day() {
            return Err(FastingError::Validation(format!(
                "ratio {ratio} does not add up to 24 hours"
            )));
        }
        Ok(())
    }
}
