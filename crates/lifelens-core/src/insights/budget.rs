//! Budget warning detector
//!
//! Emits one warning per budget alert in the snapshot. The alert list is
//! derived at snapshot assembly (spend/limit >= threshold), so this detector
//! fires exactly when a category crossed its alert threshold.

use chrono::{Datelike, Duration, NaiveDate};

use super::engine::{DetectionContext, Detector, DetectorKind};
use super::types::{ActionKind, Insight, InsightCategory, InsightKind, SuggestedAction};

/// Categories that get the meal-planning suggestion instead of a generic
/// spending review
const FOOD_CATEGORIES: [&str; 3] = ["food", "dining", "groceries"];

pub struct BudgetWarningDetector;

impl Detector for BudgetWarningDetector {
    fn id(&self) -> DetectorKind {
        DetectorKind::Budget
    }

    fn name(&self) -> &'static str {
        "Budget Warnings"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();

        for alert in &ctx.snapshot.finances.alerts {
            let usage_percent = alert.usage_rate * 100.0;

            let urgency = if alert.usage_rate >= 1.0 {
                1.0
            } else if alert.usage_rate >= 0.9 {
                0.9
            } else if alert.usage_rate >= 0.8 {
                0.7
            } else {
                0.5
            };
            let impact = if alert.usage_rate >= 1.0 { 0.9 } else { 0.7 };

            let (title, description) = if alert.usage_rate >= 1.0 {
                (
                    format!("{} budget exceeded", capitalize(&alert.category)),
                    format!(
                        "You've spent {:.2} of your {:.2} {} budget ({:.0}% used).",
                        alert.spent, alert.limit, alert.category, usage_percent
                    ),
                )
            } else {
                (
                    format!("{} budget nearly spent", capitalize(&alert.category)),
                    format!(
                        "{:.0}% of your {} budget is gone with the month still running ({:.2} of {:.2}).",
                        usage_percent, alert.category, alert.spent, alert.limit
                    ),
                )
            };

            let action = if FOOD_CATEGORIES.contains(&alert.category.as_str()) {
                SuggestedAction::new(
                    "Plan meals for the rest of the month",
                    1,
                    ActionKind::PlanMeals {
                        category: alert.category.clone(),
                        weekly_budget: (alert.limit - alert.spent).max(0.0) / 4.0,
                    },
                )
            } else {
                SuggestedAction::new(
                    format!("Review recent {} spending", alert.category),
                    1,
                    ActionKind::ReviewSpending {
                        category: alert.category.clone(),
                    },
                )
            };

            insights.push(
                Insight::new(InsightKind::Warning, InsightCategory::Financial, title, description)
                    .with_scores(urgency, impact, 1.0)
                    .with_action(action)
                    .with_validity(month_end(ctx.today)),
            );
        }

        insights
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Last instant of the current month; budget warnings expire with the month
fn month_end(today: NaiveDate) -> chrono::DateTime<chrono::Utc> {
    let next_month = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
    };
    let last_day = next_month
        .map(|d| d - Duration::days(1))
        .unwrap_or(today);
    last_day
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(chrono::Utc::now)
}
