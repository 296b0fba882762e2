//! Achievement detector
//!
//! Celebrates streak milestones (21 days to establish a habit, 66 to make
//! it automatic), new personal-best streaks past the first week, and goals
//! completed within the last day. Milestones take precedence: a streak
//! sitting exactly on a milestone emits the milestone insight only.

use chrono::Duration;

use super::engine::{DetectionContext, Detector, DetectorKind};
use super::types::{Insight, InsightCategory, InsightKind};

pub struct AchievementDetector;

impl Detector for AchievementDetector {
    fn id(&self) -> DetectorKind {
        DetectorKind::Achievement
    }

    fn name(&self) -> &'static str {
        "Achievements"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();

        for habit in &ctx.snapshot.habits.habits {
            let streak = ctx
                .snapshot
                .habits
                .streaks
                .get(&habit.id)
                .copied()
                .unwrap_or(0);

            if streak == ctx.config.establishment_milestone {
                insights.push(
                    Insight::new(
                        InsightKind::Achievement,
                        InsightCategory::Habit,
                        format!("21 days of \"{}\" - habit established", habit.name),
                        format!(
                            "You've kept \"{}\" going for {} straight days. That's the point \
                             where a routine starts to feel like part of the day.",
                            habit.name, streak
                        ),
                    )
                    .with_scores(0.2, 0.6, 1.0),
                );
            } else if streak == ctx.config.automation_milestone {
                insights.push(
                    Insight::new(
                        InsightKind::Achievement,
                        InsightCategory::Habit,
                        format!("66 days of \"{}\" - habit on autopilot", habit.name),
                        format!(
                            "{} consecutive days of \"{}\". At this length the habit runs \
                             itself.",
                            streak, habit.name
                        ),
                    )
                    .with_scores(0.2, 0.7, 1.0),
                );
            } else if streak > habit.best_streak && streak > 7 {
                insights.push(
                    Insight::new(
                        InsightKind::Achievement,
                        InsightCategory::Habit,
                        format!("New best streak for \"{}\"", habit.name),
                        format!(
                            "{} straight days of \"{}\" - past your previous best of {}.",
                            streak, habit.name, habit.best_streak
                        ),
                    )
                    .with_scores(0.15, 0.5, 1.0),
                );
            }
        }

        for goal in &ctx.snapshot.goals.goals {
            let completed_at = match goal.completed_at {
                Some(at) => at,
                None => continue,
            };
            if ctx.now - completed_at <= Duration::hours(24) && ctx.now >= completed_at {
                insights.push(
                    Insight::new(
                        InsightKind::Achievement,
                        InsightCategory::Goal,
                        format!("Goal completed: {}", goal.title),
                        format!("\"{}\" is done. Take the win.", goal.title),
                    )
                    .with_scores(0.1, 0.5, 1.0),
                );
            }
        }

        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::models::{Goal, GoalStatus, Habit, HabitCompletion, HabitKind, UserProfile};
    use crate::snapshot::{
        EmotionOverview, FinanceOverview, GoalOverview, HabitOverview, ScheduleOverview, Snapshot,
    };
    use chrono::{NaiveDate, Utc};
    use std::collections::HashMap;

    fn habit(id: i64, best_streak: u32) -> Habit {
        Habit {
            id,
            user_id: 1,
            name: "Journal".to_string(),
            kind: HabitKind::Other,
            weekly_target: 7,
            streak: 0,
            best_streak,
            last_completed: None,
            preferred_time: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// History giving the habit an unbroken streak of `days` ending today
    fn streak_history(habit_id: i64, days: u32, today: NaiveDate) -> Vec<HabitCompletion> {
        (0..days)
            .map(|i| HabitCompletion {
                id: 0,
                habit_id,
                user_id: 1,
                date: today - chrono::Duration::days(i as i64),
                completed: true,
                minutes: None,
            })
            .collect()
    }

    fn snapshot(habits: Vec<Habit>, history: Vec<HabitCompletion>, goals: Vec<Goal>) -> Snapshot {
        let now = Utc::now();
        Snapshot::assemble(
            UserProfile {
                id: 1,
                name: "Ada".to_string(),
                timezone: "UTC".to_string(),
                created_at: now,
            },
            GoalOverview::from_goals(goals),
            HabitOverview::build(habits, vec![], history, now.date_naive()),
            FinanceOverview::build(None, vec![], HashMap::new()),
            EmotionOverview::from_records(vec![]),
            ScheduleOverview::build(vec![], vec![]),
            vec![],
            vec![],
            vec![],
            now,
        )
    }

    fn detect(snapshot: &Snapshot) -> Vec<Insight> {
        let config = EngineConfig::default();
        let now = Utc::now();
        let ctx = DetectionContext {
            snapshot,
            correlations: &[],
            config: &config,
            now,
            today: now.date_naive(),
        };
        AchievementDetector.detect(&ctx)
    }

    #[test]
    fn test_21_day_streak_marks_habit_established() {
        let today = Utc::now().date_naive();
        let snap = snapshot(vec![habit(1, 30)], streak_history(1, 21, today), vec![]);
        let insights = detect(&snap);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightKind::Achievement);
        assert!(insights[0].title.contains("established"));
    }

    #[test]
    fn test_66_day_streak_marks_habit_automated() {
        let today = Utc::now().date_naive();
        let snap = snapshot(vec![habit(1, 100)], streak_history(1, 66, today), vec![]);
        let insights = detect(&snap);

        assert_eq!(insights.len(), 1);
        assert!(insights[0].title.contains("autopilot"));
    }

    #[test]
    fn test_milestone_takes_precedence_over_personal_best() {
        // 21-day streak that also beats the old best of 10: one insight,
        // and it's the milestone
        let today = Utc::now().date_naive();
        let snap = snapshot(vec![habit(1, 10)], streak_history(1, 21, today), vec![]);
        let insights = detect(&snap);

        assert_eq!(insights.len(), 1);
        assert!(insights[0].title.contains("established"));
    }

    #[test]
    fn test_personal_best_past_a_week() {
        let today = Utc::now().date_naive();
        let snap = snapshot(vec![habit(1, 8)], streak_history(1, 10, today), vec![]);
        let insights = detect(&snap);

        assert_eq!(insights.len(), 1);
        assert!(insights[0].title.contains("best streak"));
    }

    #[test]
    fn test_short_or_ordinary_streaks_stay_quiet() {
        let today = Utc::now().date_naive();
        // New best, but only 5 days: too short
        let snap = snapshot(vec![habit(1, 3)], streak_history(1, 5, today), vec![]);
        assert!(detect(&snap).is_empty());

        // 15 days but the best is 20: nothing new
        let snap = snapshot(vec![habit(1, 20)], streak_history(1, 15, today), vec![]);
        assert!(detect(&snap).is_empty());
    }

    #[test]
    fn test_goal_completed_in_last_day() {
        let now = Utc::now();
        let goal = |completed_at| Goal {
            id: 1,
            user_id: 1,
            title: "Run a 10k".to_string(),
            status: GoalStatus::Completed,
            progress: 1.0,
            deadline: None,
            created_at: now - chrono::Duration::days(60),
            completed_at: Some(completed_at),
        };

        let fresh = snapshot(vec![], vec![], vec![goal(now - chrono::Duration::hours(3))]);
        assert_eq!(detect(&fresh).len(), 1);
        assert!(detect(&fresh)[0].title.contains("Goal completed"));

        let old = snapshot(vec![], vec![], vec![goal(now - chrono::Duration::hours(30))]);
        assert!(detect(&old).is_empty());
    }
}
