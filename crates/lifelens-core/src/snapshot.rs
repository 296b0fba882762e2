//! The aggregated per-user snapshot
//!
//! A [`Snapshot`] is the complete view of one user's data across all life
//! domains at a point in time. It is immutable once assembled: every derived
//! field (completion rate, streaks, category totals, emotion trend, event
//! conflicts) is computed here, from one consistent set of repository
//! results, and a refresh replaces the whole snapshot rather than patching
//! fields in place.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::correlate::Correlation;
use crate::insights::Insight;
use crate::models::{
    Budget, CalendarEvent, EmotionRecord, EmotionTrend, FinancialRecord, Goal, GoalStatus, Habit,
    HabitCompletion, UserProfile,
};

/// Goals plus their completion statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalOverview {
    pub goals: Vec<Goal>,
    pub active_count: usize,
    pub completed_count: usize,
    /// completed / total, 0 when there are no goals
    pub completion_rate: f64,
}

impl GoalOverview {
    pub fn from_goals(goals: Vec<Goal>) -> Self {
        let active_count = goals
            .iter()
            .filter(|g| g.status == GoalStatus::Active)
            .count();
        let completed_count = goals
            .iter()
            .filter(|g| g.status == GoalStatus::Completed)
            .count();
        let completion_rate = if goals.is_empty() {
            0.0
        } else {
            completed_count as f64 / goals.len() as f64
        };
        Self {
            goals,
            active_count,
            completed_count,
            completion_rate,
        }
    }
}

/// Habits, today's completions, and streak statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitOverview {
    pub habits: Vec<Habit>,
    pub today_completions: Vec<HabitCompletion>,
    /// habit id -> consecutive completed days ending today or yesterday
    pub streaks: HashMap<i64, u32>,
    /// Fraction of historical completion records marked completed
    pub success_rate: f64,
    /// Completion records in the history window, for downstream detectors
    pub history: Vec<HabitCompletion>,
}

impl HabitOverview {
    pub fn build(
        habits: Vec<Habit>,
        today_completions: Vec<HabitCompletion>,
        history: Vec<HabitCompletion>,
        today: NaiveDate,
    ) -> Self {
        let streaks = habits
            .iter()
            .map(|h| (h.id, current_streak(h.id, &history, today)))
            .collect();
        let success_rate = success_rate(&history);
        Self {
            habits,
            today_completions,
            streaks,
            success_rate,
            history,
        }
    }
}

/// Consecutive completed days for one habit, counting back from today
/// (or yesterday, when today has no record yet).
pub fn current_streak(habit_id: i64, history: &[HabitCompletion], today: NaiveDate) -> u32 {
    let completed_days: std::collections::HashSet<NaiveDate> = history
        .iter()
        .filter(|c| c.habit_id == habit_id && c.completed)
        .map(|c| c.date)
        .collect();

    let mut day = if completed_days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while completed_days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Fraction of completion records marked completed; 0 with no history
pub fn success_rate(history: &[HabitCompletion]) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let completed = history.iter().filter(|c| c.completed).count();
    completed as f64 / history.len() as f64
}

/// A category whose spend crossed its alert threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub category: String,
    pub limit: f64,
    pub spent: f64,
    /// spent / limit
    pub usage_rate: f64,
    pub threshold: f64,
}

/// Budget, transactions, and category spend rollup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceOverview {
    pub budget: Option<Budget>,
    pub recent_transactions: Vec<FinancialRecord>,
    pub category_spending: HashMap<String, f64>,
    pub alerts: Vec<BudgetAlert>,
}

impl FinanceOverview {
    pub fn build(
        budget: Option<Budget>,
        recent_transactions: Vec<FinancialRecord>,
        category_spending: HashMap<String, f64>,
    ) -> Self {
        let alerts = budget
            .as_ref()
            .map(|b| budget_alerts(b, &category_spending))
            .unwrap_or_default();
        Self {
            budget,
            recent_transactions,
            category_spending,
            alerts,
        }
    }
}

/// An alert exists for a category exactly when `spend / limit >= threshold`
pub fn budget_alerts(budget: &Budget, spending: &HashMap<String, f64>) -> Vec<BudgetAlert> {
    let mut alerts = Vec::new();
    for cat in &budget.categories {
        if cat.limit <= 0.0 {
            continue;
        }
        let spent = spending.get(&cat.category).copied().unwrap_or(0.0);
        let usage_rate = spent / cat.limit;
        if usage_rate >= cat.alert_threshold {
            alerts.push(BudgetAlert {
                category: cat.category.clone(),
                limit: cat.limit,
                spent,
                usage_rate,
                threshold: cat.alert_threshold,
            });
        }
    }
    alerts.sort_by(|a, b| {
        b.usage_rate
            .partial_cmp(&a.usage_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    alerts
}

/// Recent emotion records with rolling statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionOverview {
    pub recent: Vec<EmotionRecord>,
    /// Mean score over the window; `None` with no records
    pub average_score: Option<f64>,
    /// Most frequent trigger tags on low-mood records
    pub triggers: Vec<String>,
    pub trend: EmotionTrend,
}

impl EmotionOverview {
    pub fn from_records(recent: Vec<EmotionRecord>) -> Self {
        let average_score = if recent.is_empty() {
            None
        } else {
            Some(recent.iter().map(|e| e.score).sum::<f64>() / recent.len() as f64)
        };
        let triggers = detect_triggers(&recent);
        let trend = classify_trend(&recent);
        Self {
            recent,
            average_score,
            triggers,
            trend,
        }
    }
}

/// Trigger tags that recur on records with score below -0.2, most frequent
/// first, capped at 3.
pub fn detect_triggers(records: &[EmotionRecord]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records.iter().filter(|r| r.score < -0.2) {
        if let Some(trigger) = record.trigger.as_deref() {
            *counts.entry(trigger).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().filter(|(_, n)| *n >= 2).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(3)
        .map(|(t, _)| t.to_string())
        .collect()
}

/// Classify the emotion trajectory by least-squares slope over
/// (days since first record, score). A deadband of ±0.01 score/day reads
/// as stable; fewer than 3 records is always stable.
pub fn classify_trend(records: &[EmotionRecord]) -> EmotionTrend {
    if records.len() < 3 {
        return EmotionTrend::Stable;
    }

    let t0 = records[0].recorded_at;
    let points: Vec<(f64, f64)> = records
        .iter()
        .map(|r| {
            let days = (r.recorded_at - t0).num_seconds() as f64 / 86_400.0;
            (days, r.score)
        })
        .collect();

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut num = 0.0;
    let mut denom = 0.0;
    for (x, y) in &points {
        num += (x - mean_x) * (y - mean_y);
        denom += (x - mean_x) * (x - mean_x);
    }
    if denom < f64::EPSILON {
        return EmotionTrend::Stable;
    }

    let slope = num / denom;
    if slope > 0.01 {
        EmotionTrend::Improving
    } else if slope < -0.01 {
        EmotionTrend::Declining
    } else {
        EmotionTrend::Stable
    }
}

/// Two events that overlap in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConflict {
    pub first_id: i64,
    pub first_title: String,
    pub second_id: i64,
    pub second_title: String,
    pub overlap_minutes: i64,
}

/// Upcoming and today's events plus detected conflicts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOverview {
    pub upcoming: Vec<CalendarEvent>,
    pub today: Vec<CalendarEvent>,
    pub conflicts: Vec<EventConflict>,
}

impl ScheduleOverview {
    pub fn build(upcoming: Vec<CalendarEvent>, today: Vec<CalendarEvent>) -> Self {
        let conflicts = detect_conflicts(&upcoming);
        Self {
            upcoming,
            today,
            conflicts,
        }
    }
}

/// Pairwise interval-overlap scan. O(n²) over the upcoming window, which
/// stays small in practice.
pub fn detect_conflicts(events: &[CalendarEvent]) -> Vec<EventConflict> {
    let mut conflicts = Vec::new();
    for (i, a) in events.iter().enumerate() {
        for b in events.iter().skip(i + 1) {
            let overlap = a.overlap_minutes(b);
            if overlap > 0 {
                conflicts.push(EventConflict {
                    first_id: a.id,
                    first_title: a.title.clone(),
                    second_id: b.id,
                    second_title: b.title.clone(),
                    overlap_minutes: overlap,
                });
            }
        }
    }
    conflicts
}

/// Headline counts and totals derived from the assembled sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub active_goals: usize,
    pub active_habits: usize,
    pub habits_completed_today: usize,
    pub month_to_date_spend: f64,
    pub events_today: usize,
    pub conflict_count: usize,
    pub average_emotion: Option<f64>,
    pub correlation_count: usize,
}

/// The complete aggregated view of one user at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub user: UserProfile,
    pub goals: GoalOverview,
    pub habits: HabitOverview,
    pub finances: FinanceOverview,
    pub emotions: EmotionOverview,
    pub schedule: ScheduleOverview,
    pub recent_insights: Vec<Insight>,
    pub urgent_insights: Vec<Insight>,
    pub correlations: Vec<Correlation>,
    pub summary: SnapshotSummary,
    pub captured_at: DateTime<Utc>,
}

impl Snapshot {
    /// Assemble a snapshot from one consistent set of section inputs.
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        user: UserProfile,
        goals: GoalOverview,
        habits: HabitOverview,
        finances: FinanceOverview,
        emotions: EmotionOverview,
        schedule: ScheduleOverview,
        recent_insights: Vec<Insight>,
        urgent_insights: Vec<Insight>,
        correlations: Vec<Correlation>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let month_start = captured_at
            .date_naive()
            .with_day(1)
            .unwrap_or_else(|| captured_at.date_naive());
        let month_to_date_spend = finances
            .recent_transactions
            .iter()
            .filter(|t| t.date >= month_start)
            .map(|t| t.spend())
            .sum();

        let summary = SnapshotSummary {
            active_goals: goals.active_count,
            active_habits: habits.habits.iter().filter(|h| h.active).count(),
            habits_completed_today: habits
                .today_completions
                .iter()
                .filter(|c| c.completed)
                .count(),
            month_to_date_spend,
            events_today: schedule.today.len(),
            conflict_count: schedule.conflicts.len(),
            average_emotion: emotions.average_score,
            correlation_count: correlations.len(),
        };

        Self {
            user,
            goals,
            habits,
            finances,
            emotions,
            schedule,
            recent_insights,
            urgent_insights,
            correlations,
            summary,
            captured_at,
        }
    }
}
