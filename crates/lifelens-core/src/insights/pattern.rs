//! Pattern insight detector
//!
//! Surfaces two kinds of patterns: discovered correlations that are at
//! least weak and statistically significant, and a specialized
//! emotion-spending rule that fires when a low-mood stretch coincides with
//! a short-term spending spike.

use std::collections::HashMap;

use chrono::Duration;

use crate::correlate::{Correlation, CorrelationStrength, Dimension};

use super::engine::{DetectionContext, Detector, DetectorKind};
use super::types::{ActionKind, Insight, InsightCategory, InsightKind, SuggestedAction};

/// Short-term spike window for the emotion-spending rule (days)
const SPIKE_WINDOW_DAYS: i64 = 3;

/// Spike threshold as a multiple of the window's average daily spend
const SPIKE_FACTOR: f64 = 1.3;

/// Mood floor below which the emotion-spending rule arms itself
const LOW_MOOD_FLOOR: f64 = -0.2;

pub struct PatternDetector;

impl Detector for PatternDetector {
    fn id(&self) -> DetectorKind {
        DetectorKind::Pattern
    }

    fn name(&self) -> &'static str {
        "Pattern Insights"
    }

    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();

        for correlation in ctx.correlations {
            if correlation.strength() < CorrelationStrength::Weak
                || !correlation.is_significant()
            {
                continue;
            }
            insights.push(correlation_insight(correlation));
        }

        if let Some(insight) = emotion_spending_spike(ctx) {
            insights.push(insight);
        }

        insights
    }
}

fn correlation_insight(correlation: &Correlation) -> Insight {
    let impact = match correlation.strength() {
        CorrelationStrength::Strong => 0.9,
        CorrelationStrength::Moderate => 0.7,
        _ => 0.5,
    };
    // Significance earns a confidence bonus on top of the base
    let confidence = if correlation.is_significant() {
        0.55 + 0.3
    } else {
        0.55
    };

    Insight::new(
        InsightKind::Pattern,
        category_for_pair(correlation.dimension_a, correlation.dimension_b),
        format!(
            "Pattern: {} and {} are linked",
            correlation.dimension_a.label(),
            correlation.dimension_b.label()
        ),
        correlation.description.clone(),
    )
    .with_scores(0.3, impact, confidence)
    .with_action(SuggestedAction::new(
        "See the days behind this pattern",
        1,
        ActionKind::ReviewCorrelation {
            dimension_a: correlation.dimension_a,
            dimension_b: correlation.dimension_b,
        },
    ))
}

/// Category for a cross-domain pair: money beats mood beats goals beats
/// habits, so the insight lands where the user can act on it
fn category_for_pair(a: Dimension, b: Dimension) -> InsightCategory {
    let involves = |d: Dimension| a == d || b == d;
    if involves(Dimension::FinancialSpending) {
        InsightCategory::Financial
    } else if involves(Dimension::EmotionScore) {
        InsightCategory::Health
    } else if involves(Dimension::GoalProgress) {
        InsightCategory::Goal
    } else {
        InsightCategory::Habit
    }
}

/// Fire when average mood over the window is below the floor and the last
/// 3 days' average daily spend exceeds 1.3x the window's average
fn emotion_spending_spike(ctx: &DetectionContext<'_>) -> Option<Insight> {
    let average_mood = ctx.snapshot.emotions.average_score?;
    if average_mood >= LOW_MOOD_FLOOR {
        return None;
    }

    let window_days = ctx.config.recent_window_days as f64;
    let transactions = &ctx.snapshot.finances.recent_transactions;
    let total_spend: f64 = transactions.iter().map(|t| t.spend()).sum();
    if total_spend <= 0.0 {
        return None;
    }
    let window_daily_avg = total_spend / window_days;

    let spike_start = ctx.today - Duration::days(SPIKE_WINDOW_DAYS - 1);
    let recent: Vec<_> = transactions
        .iter()
        .filter(|t| t.date >= spike_start)
        .collect();
    let recent_daily_avg =
        recent.iter().map(|t| t.spend()).sum::<f64>() / SPIKE_WINDOW_DAYS as f64;

    if recent_daily_avg <= SPIKE_FACTOR * window_daily_avg {
        return None;
    }

    // Point the review at wherever the spike money actually went
    let mut by_category: HashMap<&str, f64> = HashMap::new();
    for t in &recent {
        *by_category.entry(t.category.as_str()).or_insert(0.0) += t.spend();
    }
    let top_category = by_category
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(category, _)| category.to_string())?;

    Some(
        Insight::new(
            InsightKind::Pattern,
            InsightCategory::Financial,
            "Spending climbs when your mood dips",
            format!(
                "Your average mood has been low ({:.2}) and daily spending over the last {} days \
                 ({:.2}) runs well above your recent average ({:.2}).",
                average_mood, SPIKE_WINDOW_DAYS, recent_daily_avg, window_daily_avg
            ),
        )
        .with_scores(0.6, 0.75, 0.7)
        .with_action(SuggestedAction::new(
            format!("Review this week's {} spending", top_category),
            1,
            ActionKind::ReviewSpending {
                category: top_category,
            },
        )),
    )
}
