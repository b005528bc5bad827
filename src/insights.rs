//! Insight and recommendation rules
//!
//! Stateless, deterministic threshold rules over the progress history and its
//! analytics series. Insights describe what happened; recommendations suggest what
//! to do next and are ordered by priority.

use crate::config::TrackerConfig;
use crate::progress::ProgressHistory;
use crate::session::FastingSession;
use crate::types::{
    AnalyticsSeries, Insight, InsightCategory, InsightKind, Priority, Recommendation,
    RecommendationKind, TrendDirection,
};

/// Consistency at or above this rate is a success
pub const HIGH_CONSISTENCY_PCT: f64 = 80.0;
/// Consistency below this rate is a warning
pub const LOW_CONSISTENCY_PCT: f64 = 60.0;
/// Consistency below this rate triggers the improve-consistency recommendation
pub const IMPROVE_CONSISTENCY_PCT: f64 = 70.0;
/// Streak length worth celebrating
pub const STREAK_MILESTONE_DAYS: u32 = 7;
/// Day after which a low completion count suggests reassessing goals
pub const REASSESS_AFTER_DAY: u32 = 10;
/// Completed-day count below which goals should be reassessed
pub const REASSESS_MIN_COMPLETED: usize = 5;

/// Rule engine for insights and recommendations
pub struct InsightEngine;

impl InsightEngine {
    /// Evaluate every insight rule
    pub fn insights(
        history: &ProgressHistory,
        analytics: &AnalyticsSeries,
        config: &TrackerConfig,
    ) -> Vec<Insight> {
        let rate = history.completion_rate();

        [
            weight_loss_insight(analytics),
            consistency_insight(rate),
            streak_insight(history),
            hydration_insight(analytics, config),
            weekly_improvement_insight(analytics),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Evaluate every recommendation rule, highest priority first.
    ///
    /// Ties keep rule order.
    pub fn recommendations(
        history: &ProgressHistory,
        session: &FastingSession,
        insights: &[Insight],
    ) -> Vec<Recommendation> {
        let rate = history.completion_rate();
        let mut recommendations = Vec::new();

        if rate < IMPROVE_CONSISTENCY_PCT {
            recommendations.push(recommendation(
                RecommendationKind::ImproveConsistency,
                Priority::High,
                "Improve consistency",
                "Pick fixed fasting times and stick to them",
                "Schedule daily reminders",
            ));
        }

        if session.ratio.fasting_hours == 20
            && session.ratio.eating_hours == 4
            && rate < LOW_CONSISTENCY_PCT
        {
            recommendations.push(recommendation(
                RecommendationKind::EaseUp,
                Priority::Medium,
                "Ease up your fasting type",
                "20:4 can be hard to sustain, try 16:8 first",
                "Change fasting type",
            ));
        }

        let hydrated = insights
            .iter()
            .any(|i| i.kind == InsightKind::Hydration && i.category == InsightCategory::Success);
        if !hydrated {
            recommendations.push(recommendation(
                RecommendationKind::IncreaseWater,
                Priority::Medium,
                "Drink more water",
                "More water improves fasting results",
                "Set water reminders",
            ));
        }

        if history.current_day() > REASSESS_AFTER_DAY
            && history.completed_days().len() < REASSESS_MIN_COMPLETED
        {
            recommendations.push(recommendation(
                RecommendationKind::ReassessGoals,
                Priority::High,
                "Reassess your goals",
                "Your plan may need to be more realistic",
                "Review profile",
            ));
        }

        if rate >= HIGH_CONSISTENCY_PCT {
            recommendations.push(recommendation(
                RecommendationKind::AdvancedChallenge,
                Priority::Low,
                "Advanced challenge",
                "You are doing great, try a more demanding fasting type",
                "Upgrade fasting type",
            ));
        }

        sort_by_priority(&mut recommendations);
        recommendations
    }
}

/// Stable sort, high priority first
pub fn sort_by_priority(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| b.priority.weight().cmp(&a.priority.weight()));
}

fn recommendation(
    kind: RecommendationKind,
    priority: Priority,
    title: &str,
    description: &str,
    action_label: &str,
) -> Recommendation {
    Recommendation {
        kind,
        priority,
        title: title.to_string(),
        description: description.to_string(),
        action_label: action_label.to_string(),
    }
}

fn weight_loss_insight(analytics: &AnalyticsSeries) -> Option<Insight> {
    if analytics.weight.len() < 2 {
        return None;
    }
    let first = analytics.weight.first()?.weight;
    let last = analytics.weight.last()?.weight;
    let lost = first - last;

    (lost > 0.0).then(|| Insight {
        kind: InsightKind::WeightLoss,
        category: InsightCategory::Success,
        label: "Great weight progress".to_string(),
        description: format!("You lost {lost:.1} kg since the start"),
        value: format!("{lost:.1} kg"),
        trend: TrendDirection::Down,
    })
}

fn consistency_insight(rate: f64) -> Option<Insight> {
    if rate >= HIGH_CONSISTENCY_PCT {
        Some(Insight {
            kind: InsightKind::Consistency,
            category: InsightCategory::Success,
            label: "High commitment".to_string(),
            description: format!("Success rate {rate:.0}%, keep going!"),
            value: format!("{rate:.0}%"),
            trend: TrendDirection::Up,
        })
    } else if rate < LOW_CONSISTENCY_PCT {
        Some(Insight {
            kind: InsightKind::Consistency,
            category: InsightCategory::Warning,
            label: "Needs improvement".to_string(),
            description: format!("Success rate {rate:.0}%, try to stay more consistent"),
            value: format!("{rate:.0}%"),
            trend: TrendDirection::Down,
        })
    } else {
        None
    }
}

fn streak_insight(history: &ProgressHistory) -> Option<Insight> {
    let streak = history.current_streak();
    (streak >= STREAK_MILESTONE_DAYS).then(|| Insight {
        kind: InsightKind::Streak,
        category: InsightCategory::Success,
        label: "Great streak".to_string(),
        description: format!("{streak} successful days in a row"),
        value: format!("{streak} days"),
        trend: TrendDirection::Up,
    })
}

fn hydration_insight(analytics: &AnalyticsSeries, config: &TrackerConfig) -> Option<Insight> {
    if analytics.water.is_empty() {
        return None;
    }
    let total: u32 = analytics.water.iter().map(|w| w.intake).sum();
    let average = total as f64 / analytics.water.len() as f64;

    (average >= config.daily_water_goal as f64).then(|| Insight {
        kind: InsightKind::Hydration,
        category: InsightCategory::Success,
        label: "Excellent hydration".to_string(),
        description: format!("Average of {average:.1} glasses a day"),
        value: format!("{average:.1} glasses"),
        trend: TrendDirection::Up,
    })
}

fn weekly_improvement_insight(analytics: &AnalyticsSeries) -> Option<Insight> {
    let [.., previous, last] = analytics.weekly_success.as_slice() else {
        return None;
    };
    let gain = last.success_rate - previous.success_rate;

    (gain > 0.0).then(|| Insight {
        kind: InsightKind::WeeklyImprovement,
        category: InsightCategory::Success,
        label: "Weekly improvement".to_string(),
        description: format!("{gain:.0}% better than last week"),
        value: format!("+{gain:.0}%"),
        trend: TrendDirection::Up,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::AnalyticsGenerator;
    use crate::types::{
        DailyMetrics, FastingRatio, UserProfile, WaterPoint, WeeklySuccess, WeightPoint,
    };
    use pretty_assertions::assert_eq;

    /// History at `current_day` with the listed days completed in order
    fn history(completed: &[u32], current_day: u32) -> ProgressHistory {
        let mut history = ProgressHistory::new();
        for day in 1..=current_day {
            history.advance_day(day, 20).unwrap();
            if completed.contains(&day) {
                history.record_completion(16.0);
            }
        }
        history
    }

    fn kinds(insights: &[Insight]) -> Vec<InsightKind> {
        insights.iter().map(|i| i.kind).collect()
    }

    fn weight_points(values: &[f64]) -> Vec<WeightPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &weight)| WeightPoint {
                day: i as u32 + 1,
                weight,
                target: weight,
            })
            .collect()
    }

    #[test]
    fn test_weight_loss_insight() {
        let analytics = AnalyticsSeries {
            weight: weight_points(&[82.0, 81.2, 80.5]),
            ..Default::default()
        };
        let insight = weight_loss_insight(&analytics).unwrap();
        assert_eq!(insight.value, "1.5 kg");
        assert_eq!(insight.trend, TrendDirection::Down);

        let gained = AnalyticsSeries {
            weight: weight_points(&[80.0, 80.4]),
            ..Default::default()
        };
        assert!(weight_loss_insight(&gained).is_none());

        let single = AnalyticsSeries {
            weight: weight_points(&[80.0]),
            ..Default::default()
        };
        assert!(weight_loss_insight(&single).is_none());
    }

    #[test]
    fn test_consistency_bands() {
        let high = consistency_insight(85.0).unwrap();
        assert_eq!(high.category, InsightCategory::Success);
        assert_eq!(high.value, "85%");

        let low = consistency_insight(40.0).unwrap();
        assert_eq!(low.category, InsightCategory::Warning);

        // Dead zone between 60 and 80
        assert!(consistency_insight(60.0).is_none());
        assert!(consistency_insight(79.9).is_none());
        assert!(consistency_insight(80.0).is_some());
    }

    #[test]
    fn test_streak_insight_threshold() {
        let six = history(&[1, 2, 3, 4, 5, 6], 6);
        assert!(streak_insight(&six).is_none());

        let seven = history(&[1, 2, 3, 4, 5, 6, 7], 7);
        let insight = streak_insight(&seven).unwrap();
        assert_eq!(insight.value, "7 days");
    }

    #[test]
    fn test_hydration_insight() {
        let config = TrackerConfig::default();
        let good = AnalyticsSeries {
            water: vec![
                WaterPoint { day: 1, intake: 8, goal: 8 },
                WaterPoint { day: 2, intake: 9, goal: 8 },
            ],
            ..Default::default()
        };
        assert!(hydration_insight(&good, &config).is_some());

        let short = AnalyticsSeries {
            water: vec![
                WaterPoint { day: 1, intake: 8, goal: 8 },
                WaterPoint { day: 2, intake: 6, goal: 8 },
            ],
            ..Default::default()
        };
        assert!(hydration_insight(&short, &config).is_none());
        assert!(hydration_insight(&AnalyticsSeries::default(), &config).is_none());
    }

    #[test]
    fn test_weekly_improvement_insight() {
        let week = |week, success_rate| WeeklySuccess {
            week,
            success_rate,
            completed: 0,
            total: 7,
        };
        let improving = AnalyticsSeries {
            weekly_success: vec![week(1, 40.0), week(2, 70.0)],
            ..Default::default()
        };
        let insight = weekly_improvement_insight(&improving).unwrap();
        assert_eq!(insight.value, "+30%");

        let flat = AnalyticsSeries {
            weekly_success: vec![week(1, 70.0), week(2, 70.0)],
            ..Default::default()
        };
        assert!(weekly_improvement_insight(&flat).is_none());

        let single = AnalyticsSeries {
            weekly_success: vec![week(1, 70.0)],
            ..Default::default()
        };
        assert!(weekly_improvement_insight(&single).is_none());
    }

    #[test]
    fn test_insights_from_generated_series() {
        let mut history = history(&[1, 2, 3, 4, 5, 6, 7, 8], 8);
        for day in 1..=8 {
            history
                .record_daily_metrics(
                    day,
                    DailyMetrics {
                        water_intake: Some(8),
                        weight: Some(80.0 - day as f64 * 0.2),
                        mood: None,
                    },
                    30,
                )
                .unwrap();
        }
        let config = TrackerConfig::default();
        let analytics = AnalyticsGenerator::generate(
            &history,
            &UserProfile::default(),
            &FastingRatio::default(),
            &config,
        );

        let insights = InsightEngine::insights(&history, &analytics, &config);
        assert_eq!(
            kinds(&insights),
            vec![
                InsightKind::WeightLoss,
                InsightKind::Consistency,
                InsightKind::Streak,
                InsightKind::Hydration,
            ]
        );
    }

    #[test]
    fn test_recommendations_for_struggling_user() {
        let history = history(&[1, 2], 12);
        let session = FastingSession::new(FastingRatio::new(20, 4).unwrap());

        let recommendations = InsightEngine::recommendations(&history, &session, &[]);
        let found: Vec<_> = recommendations.iter().map(|r| (r.kind, r.priority)).collect();

        assert_eq!(
            found,
            vec![
                (RecommendationKind::ImproveConsistency, Priority::High),
                (RecommendationKind::ReassessGoals, Priority::High),
                (RecommendationKind::EaseUp, Priority::Medium),
                (RecommendationKind::IncreaseWater, Priority::Medium),
            ]
        );
    }

    #[test]
    fn test_recommendations_for_consistent_user() {
        let history = history(&[1, 2, 3, 4, 5], 5);
        let session = FastingSession::default();
        let hydration = Insight {
            kind: InsightKind::Hydration,
            category: InsightCategory::Success,
            label: String::new(),
            description: String::new(),
            value: String::new(),
            trend: TrendDirection::Up,
        };

        let recommendations = InsightEngine::recommendations(&history, &session, &[hydration]);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].kind, RecommendationKind::AdvancedChallenge);
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let make = |kind, priority| recommendation(kind, priority, "", "", "");
        let mut recommendations = vec![
            make(RecommendationKind::AdvancedChallenge, Priority::Low),
            make(RecommendationKind::ImproveConsistency, Priority::High),
            make(RecommendationKind::IncreaseWater, Priority::Medium),
            make(RecommendationKind::ReassessGoals, Priority::High),
        ];
        sort_by_priority(&mut recommendations);

        let order: Vec<_> = recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(
            order,
            vec![
                RecommendationKind::ImproveConsistency,
                RecommendationKind::ReassessGoals,
                RecommendationKind::IncreaseWater,
                RecommendationKind::AdvancedChallenge,
            ]
        );
    }
}
