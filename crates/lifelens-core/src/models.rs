//! Domain models for Lifelens
//!
//! Plain data carried between the repositories and the pipeline. Derived
//! state (streak maps, category totals, trends) lives in the snapshot; the
//! one transition that belongs to the entity itself is `apply_completion`,
//! which advances a habit's streak as a pure function.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    /// IANA timezone label, e.g. "America/Los_Angeles"
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

/// A goal with a progress fraction and an optional deadline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub status: GoalStatus,
    /// Fraction complete in [0, 1]
    pub progress: f64,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Goal {
    /// Whole days until the deadline, negative when past due
    pub fn days_until_deadline(&self, today: NaiveDate) -> Option<i64> {
        self.deadline.map(|d| (d - today).num_days())
    }
}

/// Goal lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Abandoned,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }
}

impl std::str::FromStr for GoalStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "abandoned" => Ok(Self::Abandoned),
            _ => Err(format!("Unknown goal status: {}", s)),
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring habit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// What kind of habit this is; drives correlation dimensions
    pub kind: HabitKind,
    /// Target completions per week
    pub weekly_target: u32,
    /// Consecutive days completed without a miss
    pub streak: u32,
    /// Longest streak ever reached
    pub best_streak: u32,
    /// Date of the most recent completion, if any
    pub last_completed: Option<NaiveDate>,
    /// The time of day this habit has historically been completed most often
    pub preferred_time: Option<NaiveTime>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Habit kinds tracked by the correlation detectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    Exercise,
    Study,
    Mindfulness,
    Other,
}

impl HabitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exercise => "exercise",
            Self::Study => "study",
            Self::Mindfulness => "mindfulness",
            Self::Other => "other",
        }
    }
}

impl std::str::FromStr for HabitKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exercise" => Ok(Self::Exercise),
            "study" => Ok(Self::Study),
            "mindfulness" => Ok(Self::Mindfulness),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown habit kind: {}", s)),
        }
    }
}

impl std::fmt::Display for HabitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One day's record for one habit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitCompletion {
    pub id: i64,
    pub habit_id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
    /// Minutes spent, where the habit tracks duration
    pub minutes: Option<u32>,
}

/// Advance a habit's streak for one day's outcome.
///
/// Pure transition: the input habit is unchanged and the updated habit is
/// returned. A completion on the day after `last_completed` extends the
/// streak; a repeat completion on the same day is a no-op; anything else
/// starts a new streak of 1. A miss resets the streak to 0. The best streak
/// only ever grows.
pub fn apply_completion(habit: &Habit, date: NaiveDate, completed: bool) -> Habit {
    let mut next = habit.clone();

    if !completed {
        next.streak = 0;
        return next;
    }

    match habit.last_completed {
        Some(last) if last == date => return next,
        Some(last) if date - last == chrono::Duration::days(1) => {
            next.streak = habit.streak + 1;
        }
        _ => next.streak = 1,
    }

    next.best_streak = next.best_streak.max(next.streak);
    next.last_completed = Some(date);
    next
}

/// A single financial transaction. Negative amounts are spending,
/// positive amounts are income.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    pub description: String,
}

impl FinancialRecord {
    /// Spend magnitude: |amount| for spending rows, 0 for income
    pub fn spend(&self) -> f64 {
        if self.amount < 0.0 {
            self.amount.abs()
        } else {
            0.0
        }
    }
}

/// A monthly budget with per-category limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    /// First day of the budget month
    pub month: NaiveDate,
    pub categories: Vec<CategoryBudget>,
}

/// One category's slice of a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category: String,
    pub limit: f64,
    /// Fraction of the limit at which an alert fires
    pub alert_threshold: f64,
}

/// One logged emotional state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionRecord {
    pub id: i64,
    pub user_id: i64,
    pub recorded_at: DateTime<Utc>,
    /// Score in [-1, 1]; negative is low mood
    pub score: f64,
    /// Free-text trigger tag, e.g. "work", "sleep"
    pub trigger: Option<String>,
}

/// Direction of the recent emotion trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionTrend {
    Improving,
    Stable,
    Declining,
}

impl EmotionTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
        }
    }
}

impl std::fmt::Display for EmotionTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A calendar event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    /// Minutes of overlap with another event, 0 when disjoint
    pub fn overlap_minutes(&self, other: &CalendarEvent) -> i64 {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).num_minutes().max(0)
    }
}

/// One day of recorded goal progress, as a fraction in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProgressEntry {
    pub user_id: i64,
    pub goal_id: i64,
    pub date: NaiveDate,
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn habit(streak: u32, best: u32, last: Option<NaiveDate>) -> Habit {
        Habit {
            id: 1,
            user_id: 1,
            name: "Run".to_string(),
            kind: HabitKind::Exercise,
            weekly_target: 5,
            streak,
            best_streak: best,
            last_completed: last,
            preferred_time: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_apply_completion_extends_consecutive_streak() {
        let h = habit(5, 5, Some(d(2026, 3, 10)));
        let next = apply_completion(&h, d(2026, 3, 11), true);

        assert_eq!(next.streak, 6);
        assert_eq!(next.best_streak, 6);
        assert_eq!(next.last_completed, Some(d(2026, 3, 11)));
        // Input untouched
        assert_eq!(h.streak, 5);
    }

    #[test]
    fn test_apply_completion_same_day_is_idempotent() {
        let h = habit(5, 9, Some(d(2026, 3, 10)));
        let next = apply_completion(&h, d(2026, 3, 10), true);

        assert_eq!(next.streak, 5);
        assert_eq!(next.best_streak, 9);
    }

    #[test]
    fn test_apply_completion_gap_restarts_streak() {
        let h = habit(12, 12, Some(d(2026, 3, 1)));
        let next = apply_completion(&h, d(2026, 3, 10), true);

        assert_eq!(next.streak, 1);
        // Best streak is preserved across the reset
        assert_eq!(next.best_streak, 12);
    }

    #[test]
    fn test_apply_completion_miss_resets_to_zero() {
        let h = habit(12, 12, Some(d(2026, 3, 1)));
        let next = apply_completion(&h, d(2026, 3, 2), false);

        assert_eq!(next.streak, 0);
        assert_eq!(next.best_streak, 12);
        assert_eq!(next.last_completed, Some(d(2026, 3, 1)));
    }

    #[test]
    fn test_event_overlap_minutes() {
        let mk = |sh: u32, sm: u32, eh: u32, em: u32| CalendarEvent {
            id: 1,
            user_id: 1,
            title: "x".to_string(),
            start: d(2026, 4, 1).and_hms_opt(sh, sm, 0).unwrap().and_utc(),
            end: d(2026, 4, 1).and_hms_opt(eh, em, 0).unwrap().and_utc(),
        };

        assert_eq!(mk(9, 0, 10, 0).overlap_minutes(&mk(9, 30, 10, 30)), 30);
        assert_eq!(mk(9, 0, 10, 0).overlap_minutes(&mk(10, 0, 11, 0)), 0);
        assert_eq!(mk(9, 0, 12, 0).overlap_minutes(&mk(10, 0, 11, 0)), 60);
    }

    #[test]
    fn test_spend_ignores_income() {
        let tx = FinancialRecord {
            id: 1,
            user_id: 1,
            date: d(2026, 1, 5),
            amount: 1200.0,
            category: "salary".to_string(),
            description: "Payroll".to_string(),
        };
        assert_eq!(tx.spend(), 0.0);

        let tx = FinancialRecord { amount: -42.5, ..tx };
        assert_eq!(tx.spend(), 42.5);
    }

    #[test]
    fn test_goal_days_until_deadline() {
        let goal = Goal {
            id: 1,
            user_id: 1,
            title: "Ship".to_string(),
            status: GoalStatus::Active,
            progress: 0.4,
            deadline: Some(d(2026, 5, 10)),
            created_at: Utc::now(),
            completed_at: None,
        };

        assert_eq!(goal.days_until_deadline(d(2026, 5, 7)), Some(3));
        assert_eq!(goal.days_until_deadline(d(2026, 5, 12)), Some(-2));
    }
}
