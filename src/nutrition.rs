//! Daily calorie target
//!
//! Mifflin-St Jeor basal metabolic rate, scaled by activity level and adjusted for
//! the user's goal.

use crate::types::{Gender, UserProfile};

/// BMR offset for men
const MALE_OFFSET: f64 = 5.0;
/// BMR offset for everyone else
const FEMALE_OFFSET: f64 = -161.0;

/// Mifflin-St Jeor BMR in kcal/day
pub fn basal_metabolic_rate(gender: Gender, age: u32, weight_kg: f64, height_cm: f64) -> f64 {
    let offset = match gender {
        Gender::Male => MALE_OFFSET,
        Gender::Female | Gender::Other => FEMALE_OFFSET,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64 + offset
}

/// Daily calorie target for `profile`, or `fallback` when gender, age, weight or
/// height is missing
pub fn calorie_target(profile: &UserProfile, fallback: u32) -> u32 {
    let (Some(gender), Some(age), Some(weight), Some(height)) = (
        profile.gender,
        profile.age,
        profile.weight_kg,
        profile.height_cm,
    ) else {
        return fallback;
    };

    let bmr = basal_metabolic_rate(gender, age, weight, height);
    let tdee = bmr * profile.activity_level.multiplier() * profile.goal.calorie_factor();

    if tdee.is_finite() && tdee > 0.0 {
        tdee.round() as u32
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CALORIE_TARGET;
    use crate::types::{ActivityLevel, Goal};

    fn profile(gender: Gender, age: u32, weight: f64, height: f64) -> UserProfile {
        UserProfile {
            gender: Some(gender),
            age: Some(age),
            weight_kg: Some(weight),
            height_cm: Some(height),
            ..Default::default()
        }
    }

    #[test]
    fn test_male_weight_loss() {
        let p = profile(Gender::Male, 30, 80.0, 180.0);
        assert_eq!(p.activity_level, ActivityLevel::Moderate);
        assert_eq!(p.goal, Goal::WeightLoss);

        // 10*80 + 6.25*180 - 5*30 + 5 = 1780; * 1.55 = 2759; * 0.8 = 2207.2
        assert_eq!(basal_metabolic_rate(Gender::Male, 30, 80.0, 180.0), 1780.0);
        assert_eq!(calorie_target(&p, DEFAULT_CALORIE_TARGET), 2207);
    }

    #[test]
    fn test_female_maintenance_sedentary() {
        let p = UserProfile {
            activity_level: ActivityLevel::Sedentary,
            goal: Goal::Maintenance,
            ..profile(Gender::Female, 25, 60.0, 165.0)
        };
        // 600 + 1031.25 - 125 - 161 = 1345.25; * 1.2 = 1614.3
        assert_eq!(calorie_target(&p, DEFAULT_CALORIE_TARGET), 1614);
    }

    #[test]
    fn test_goal_factors() {
        let base = profile(Gender::Male, 40, 90.0, 175.0);
        let gain = UserProfile {
            goal: Goal::WeightGain,
            activity_level: ActivityLevel::VeryActive,
            ..base.clone()
        };
        let muscle = UserProfile {
            goal: Goal::MuscleGain,
            activity_level: ActivityLevel::VeryActive,
            ..base
        };
        // 900 + 1093.75 - 200 + 5 = 1798.75; * 1.9 = 3417.625
        assert_eq!(calorie_target(&gain, 0), 4101);
        assert_eq!(calorie_target(&muscle, 0), 3759);
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let mut p = profile(Gender::Male, 30, 80.0, 180.0);
        p.height_cm = None;
        assert_eq!(calorie_target(&p, DEFAULT_CALORIE_TARGET), 2000);

        assert_eq!(
            calorie_target(&UserProfile::default(), DEFAULT_CALORIE_TARGET),
            2000
        );
    }
}
