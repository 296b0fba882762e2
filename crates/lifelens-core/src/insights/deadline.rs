//! Deadline reminder detector
//!
//! Watches active goals whose deadline falls within the reminder window
//! (0-7 days by default). Urgency rises linearly as the deadline closes in;
//! impact is raised when the goal is less than half done.

use crate::models::GoalStatus;

use super::engine::{DetectionContext, Detector, DetectorKind};
use super::types::{ActionKind, Insight, InsightCategory, InsightKind, SuggestedAction};

pub struct DeadlineReminderDetector;

impl Detector for DeadlineReminderDetector {
    fn id(&self) -> DetectorKind {
        DetectorKind::Deadline
    }

    fn name(&self) -> &'static str {
        "Deadline Reminders"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        let window = ctx.config.deadline_window_days;
        let mut insights = Vec::new();

        for goal in &ctx.snapshot.goals.goals {
            if goal.status != GoalStatus::Active {
                continue;
            }
            let days_left = match goal.days_until_deadline(ctx.today) {
                Some(days) if (0..=window).contains(&days) => days,
                _ => continue,
            };

            let urgency = 1.0 - days_left as f64 / window as f64;
            let behind = goal.progress < 0.5;
            let impact = if behind { 0.85 } else { 0.6 };
            let progress_percent = goal.progress * 100.0;

            let description = match days_left {
                0 => format!(
                    "\"{}\" is due today and sits at {:.0}% complete.",
                    goal.title, progress_percent
                ),
                1 => format!(
                    "\"{}\" is due tomorrow and sits at {:.0}% complete.",
                    goal.title, progress_percent
                ),
                n => format!(
                    "\"{}\" is due in {} days and sits at {:.0}% complete.",
                    goal.title, n, progress_percent
                ),
            };

            let action = if behind {
                SuggestedAction::new(
                    "Plan a finishing sprint",
                    1,
                    ActionKind::SprintPlan {
                        goal_id: goal.id,
                        days_left,
                        remaining_percent: (1.0 - goal.progress) * 100.0,
                    },
                )
            } else {
                SuggestedAction::new(
                    "Adjust the deadline if needed",
                    1,
                    ActionKind::AdjustDeadline {
                        goal_id: goal.id,
                        suggested_extension_days: 7,
                    },
                )
            };

            let mut insight = Insight::new(
                InsightKind::Warning,
                InsightCategory::Goal,
                format!("Deadline approaching: {}", goal.title),
                description,
            )
            .with_scores(urgency, impact, 0.9)
            .with_action(action);

            if let Some(deadline) = goal.deadline {
                if let Some(end_of_day) = deadline.and_hms_opt(23, 59, 59) {
                    insight = insight.with_validity(end_of_day.and_utc());
                }
            }

            insights.push(insight);
        }

        insights
    }
}
