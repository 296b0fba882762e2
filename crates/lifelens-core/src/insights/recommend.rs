//! Recommendation detector
//!
//! Three independent rules: struggling habits (low success rate with enough
//! history to mean something), goals drifting behind their linear pace, and
//! overlapping calendar events.

use crate::models::{GoalStatus, Habit, HabitCompletion};

use super::engine::{DetectionContext, Detector, DetectorKind};
use super::types::{ActionKind, Insight, InsightCategory, InsightKind, SuggestedAction};

/// Minimum recorded completions before the habit rule judges a success rate
const MIN_HABIT_RECORDS: usize = 7;

/// Success rate below which a habit counts as struggling
const STRUGGLING_RATE: f64 = 0.5;

/// How far actual progress may lag the linear expectation before the pace
/// rule fires
const PACE_LAG: f64 = 0.1;

pub struct RecommendationDetector;

impl Detector for RecommendationDetector {
    fn id(&self) -> DetectorKind {
        DetectorKind::Recommendation
    }

    fn name(&self) -> &'static str {
        "Recommendations"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();
        insights.extend(struggling_habits(ctx));
        insights.extend(lagging_goals(ctx));
        insights.extend(schedule_conflicts(ctx));
        insights
    }
}

fn habit_success_rate(habit: &Habit, history: &[HabitCompletion]) -> (usize, f64) {
    let records: Vec<_> = history.iter().filter(|c| c.habit_id == habit.id).collect();
    if records.is_empty() {
        return (0, 0.0);
    }
    let completed = records.iter().filter(|c| c.completed).count();
    (records.len(), completed as f64 / records.len() as f64)
}

fn struggling_habits(ctx: &DetectionContext<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    for habit in ctx.snapshot.habits.habits.iter().filter(|h| h.active) {
        let (records, rate) = habit_success_rate(habit, &ctx.snapshot.habits.history);
        if records < MIN_HABIT_RECORDS || rate >= STRUGGLING_RATE {
            continue;
        }

        let suggested_target = (habit.weekly_target / 2).max(1);
        let mut insight = Insight::new(
            InsightKind::Recommendation,
            InsightCategory::Habit,
            format!("\"{}\" isn't sticking yet", habit.name),
            format!(
                "You've completed \"{}\" {:.0}% of the time over the last {} check-ins. \
                 A smaller target tends to rebuild the chain.",
                habit.name,
                rate * 100.0,
                records
            ),
        )
        .with_scores(0.4, 0.6, 0.8)
        .with_action(SuggestedAction::new(
            format!("Lower the target to {}x per week", suggested_target),
            1,
            ActionKind::LowerHabitTarget {
                habit_id: habit.id,
                current_target: habit.weekly_target,
                suggested_target,
            },
        ));

        // The habit's best historical slot is the natural reminder time
        if let Some(at) = habit.preferred_time {
            insight = insight.with_action(SuggestedAction::new(
                format!("Set a reminder at {}", at.format("%H:%M")),
                2,
                ActionKind::ScheduleReminder {
                    habit_id: habit.id,
                    at,
                },
            ));
        }

        insights.push(insight);
    }

    insights
}

fn lagging_goals(ctx: &DetectionContext<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    for goal in &ctx.snapshot.goals.goals {
        if goal.status != GoalStatus::Active {
            continue;
        }
        let deadline = match goal.deadline {
            Some(d) => d,
            None => continue,
        };
        let days_left = (deadline - ctx.today).num_days();
        if days_left <= 0 {
            continue;
        }
        let total_days = (deadline - goal.created_at.date_naive()).num_days();
        if total_days <= 0 {
            continue;
        }
        let elapsed = (ctx.today - goal.created_at.date_naive()).num_days();
        let expected = (elapsed as f64 / total_days as f64).clamp(0.0, 1.0);
        if expected - goal.progress <= PACE_LAG {
            continue;
        }

        let required_daily_percent = (1.0 - goal.progress) * 100.0 / days_left as f64;
        insights.push(
            Insight::new(
                InsightKind::Recommendation,
                InsightCategory::Goal,
                format!("\"{}\" is behind pace", goal.title),
                format!(
                    "At this point you'd expect {:.0}% done, and you're at {:.0}%. \
                     About {:.1}% per day from here finishes on time.",
                    expected * 100.0,
                    goal.progress * 100.0,
                    required_daily_percent
                ),
            )
            .with_scores(0.5, 0.65, 0.85)
            .with_action(SuggestedAction::new(
                format!("Hold a {:.1}%-per-day pace", required_daily_percent),
                1,
                ActionKind::DailyPaceGoal {
                    goal_id: goal.id,
                    required_daily_percent,
                },
            )),
        );
    }

    insights
}

fn schedule_conflicts(ctx: &DetectionContext<'_>) -> Vec<Insight> {
    ctx.snapshot
        .schedule
        .conflicts
        .iter()
        .map(|conflict| {
            Insight::new(
                InsightKind::Recommendation,
                InsightCategory::Time,
                "Overlapping events",
                format!(
                    "\"{}\" and \"{}\" overlap by {} minutes.",
                    conflict.first_title, conflict.second_title, conflict.overlap_minutes
                ),
            )
            .with_scores(0.6, 0.5, 1.0)
            .with_action(SuggestedAction::new(
                format!("Reschedule \"{}\"", conflict.second_title),
                1,
                ActionKind::RescheduleEvent {
                    event_id: conflict.second_id,
                    conflicting_event_id: conflict.first_id,
                },
            ))
        })
        .collect()
}
