//! Core types for Fastwise
//!
//! This module defines the value objects shared across the tracker: the fasting
//! ratio, the user profile, per-day metrics, and the derived analytics, insight and
//! recommendation records handed to the UI.

use crate::error::FastingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hours in a full fasting/eating cycle
pub const HOURS_PER_DAY: u32 = 24;

/// Longest fasting or eating window accepted, one week
pub const MAX_WINDOW_HOURS: u32 = HOURS_PER_DAY * 7;

/// Milliseconds per hour, used to convert hour-based fields at the boundary
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Fasting:eating split, written as `"16:8"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FastingRatio {
    pub fasting_hours: u32,
    pub eating_hours: u32,
}

impl FastingRatio {
    /// Build a ratio from hour counts. Both parts must be positive and at most
    /// [`MAX_WINDOW_HOURS`].
    pub fn new(fasting_hours: u32, eating_hours: u32) -> Result<Self, FastingError> {
        if fasting_hours == 0 || eating_hours == 0 {
            return Err(FastingError::Validation(format!(
                "ratio {fasting_hours}:{eating_hours} must have positive fasting and eating hours"
            )));
        }
        if fasting_hours > MAX_WINDOW_HOURS || eating_hours > MAX_WINDOW_HOURS {
            return Err(FastingError::Validation(format!(
                "ratio {fasting_hours}:{eating_hours} exceeds {MAX_WINDOW_HOURS} hours per window"
            )));
        }
        Ok(Self {
            fasting_hours,
            eating_hours,
        })
    }

    /// Whether the two windows add up to exactly one day
    pub fn covers_full_day(&self) -> bool {
        self.fasting_hours.checked_add(self.eating_hours) == Some(HOURS_PER_DAY)
    }

    /// Fasting window length in milliseconds
    pub fn fasting_ms(&self) -> i64 {
        i64::from(self.fasting_hours).saturating_mul(MS_PER_HOUR)
    }
}

impl Default for FastingRatio {
    fn default() -> Self {
        Self {
            fasting_hours: 16,
            eating_hours: 8,
        }
    }
}

impl fmt::Display for FastingRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.fasting_hours, self.eating_hours)
    }
}

impl FromStr for FastingRatio {
    type Err = FastingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (fasting, eating) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| FastingError::Validation(format!("ratio '{s}' is missing ':'")))?;

        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|_| {
                FastingError::Validation(format!("ratio '{s}' has non-numeric part '{part}'"))
            })
        };

        Self::new(parse(fasting)?, parse(eating)?)
    }
}

impl TryFrom<String> for FastingRatio {
    type Error = FastingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FastingRatio> for String {
    fn from(ratio: FastingRatio) -> Self {
        ratio.to_string()
    }
}

/// Gender used by the calorie formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Activity level used to scale basal metabolic rate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// User goal driving the calorie adjustment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    #[default]
    WeightLoss,
    WeightGain,
    MuscleGain,
    Maintenance,
}

impl Goal {
    /// Factor applied to TDEE for this goal
    pub fn calorie_factor(&self) -> f64 {
        match self {
            Goal::WeightLoss => 0.8,
            Goal::WeightGain => 1.2,
            Goal::MuscleGain => 1.1,
            Goal::Maintenance => 1.0,
        }
    }
}

/// Dietary flags collected during profile setup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryPreferences {
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
    pub nut_free: bool,
}

/// User profile. Every physical attribute is optional until the user fills it in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub gender: Option<Gender>,
    /// Age in years
    pub age: Option<u32>,
    /// Height in centimetres
    pub height_cm: Option<f64>,
    /// Current weight in kilograms
    pub weight_kg: Option<f64>,
    /// Target weight in kilograms
    pub target_weight_kg: Option<f64>,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal: Goal,
    #[serde(default)]
    pub dietary_preferences: DietaryPreferences,
    #[serde(default)]
    pub health_conditions: Vec<String>,
}

/// Partial profile update; only the fields present are applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<Goal>,
    pub dietary_preferences: Option<DietaryPreferences>,
    pub health_conditions: Option<Vec<String>>,
}

impl UserProfile {
    /// Apply a partial update after validating the numeric fields
    pub fn apply(&mut self, update: ProfileUpdate) -> Result<(), FastingError> {
        if let Some(age) = update.age {
            if age == 0 || age > 130 {
                return Err(FastingError::Validation(format!("age {age} is out of range")));
            }
        }
        if let Some(height) = update.height_cm {
            validate_positive("height", height)?;
        }
        if let Some(weight) = update.weight_kg {
            validate_positive("weight", weight)?;
        }
        if let Some(target) = update.target_weight_kg {
            validate_positive("target weight", target)?;
        }

        if update.gender.is_some() {
            self.gender = update.gender;
        }
        if update.age.is_some() {
            self.age = update.age;
        }
        if update.height_cm.is_some() {
            self.height_cm = update.height_cm;
        }
        if update.weight_kg.is_some() {
            self.weight_kg = update.weight_kg;
        }
        if update.target_weight_kg.is_some() {
            self.target_weight_kg = update.target_weight_kg;
        }
        if let Some(level) = update.activity_level {
            self.activity_level = level;
        }
        if let Some(goal) = update.goal {
            self.goal = goal;
        }
        if let Some(prefs) = update.dietary_preferences {
            self.dietary_preferences = prefs;
        }
        if let Some(conditions) = update.health_conditions {
            self.health_conditions = conditions;
        }
        Ok(())
    }
}

/// Reject NaN, infinite and non-positive measurements
pub fn validate_positive(field: &str, value: f64) -> Result<f64, FastingError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(FastingError::Validation(format!(
            "{field} must be a positive number, got {value}"
        )))
    }
}

/// Metrics recorded for one program day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
    /// Glasses of water
    pub water_intake: Option<u32>,
    /// Weight in kilograms
    pub weight: Option<f64>,
    /// Self-reported mood (1-5)
    pub mood: Option<f64>,
}

impl DailyMetrics {
    pub fn is_empty(&self) -> bool {
        self.water_intake.is_none() && self.weight.is_none() && self.mood.is_none()
    }

    /// Check ranges before the metrics are stored
    pub fn validate(&self) -> Result<(), FastingError> {
        if let Some(weight) = self.weight {
            validate_positive("weight", weight)?;
        }
        if let Some(mood) = self.mood {
            if !(1.0..=5.0).contains(&mood) {
                return Err(FastingError::Validation(format!(
                    "mood must be between 1 and 5, got {mood}"
                )));
            }
        }
        Ok(())
    }
}

/// Weight series point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightPoint {
    pub day: u32,
    pub weight: f64,
    pub target: f64,
}

/// Fasting duration series point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FastingPoint {
    pub day: u32,
    /// Actual fasted hours, when a fast was logged for the day
    pub duration: Option<f64>,
    pub planned: u32,
    pub completed: bool,
}

/// Water intake series point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterPoint {
    pub day: u32,
    pub intake: u32,
    pub goal: u32,
}

/// Mood series point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodPoint {
    pub day: u32,
    pub mood: f64,
}

/// Success rate for one program week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklySuccess {
    pub week: u32,
    /// Percentage of days completed (0-100)
    pub success_rate: f64,
    pub completed: u32,
    pub total: u32,
}

/// Chart-ready series derived from the recorded history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSeries {
    pub weight: Vec<WeightPoint>,
    pub fasting: Vec<FastingPoint>,
    pub water: Vec<WaterPoint>,
    pub mood: Vec<MoodPoint>,
    pub weekly_success: Vec<WeeklySuccess>,
}

/// Which rule produced an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    WeightLoss,
    Consistency,
    Streak,
    Hydration,
    WeeklyImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Human-readable observation about the user's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub category: InsightCategory,
    pub label: String,
    pub description: String,
    pub value: String,
    pub trend: TrendDirection,
}

/// Which rule produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ImproveConsistency,
    EaseUp,
    IncreaseWater,
    ReassessGoals,
    AdvancedChallenge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Sort weight, higher first
    pub fn weight(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Suggested next action for the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub action_label: String,
}
