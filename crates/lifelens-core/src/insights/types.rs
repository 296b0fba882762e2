//! Core types for the insight pipeline

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::correlate::Dimension;

/// What kind of insight this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// Something needs attention now
    Warning,
    /// A recurring pattern worth knowing about
    Pattern,
    /// A concrete change worth trying
    Recommendation,
    /// A milestone reached
    Achievement,
    /// A favorable opening to act on
    Opportunity,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Pattern => "pattern",
            Self::Recommendation => "recommendation",
            Self::Achievement => "achievement",
            Self::Opportunity => "opportunity",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Self::Warning),
            "pattern" => Ok(Self::Pattern),
            "recommendation" => Ok(Self::Recommendation),
            "achievement" => Ok(Self::Achievement),
            "opportunity" => Ok(Self::Opportunity),
            _ => Err(format!("Unknown insight kind: {}", s)),
        }
    }
}

/// Which life area an insight belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Financial,
    Health,
    Habit,
    Goal,
    Time,
    General,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Health => "health",
            Self::Habit => "habit",
            Self::Goal => "goal",
            Self::Time => "time",
            Self::General => "general",
        }
    }
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "financial" => Ok(Self::Financial),
            "health" => Ok(Self::Health),
            "habit" => Ok(Self::Habit),
            "goal" => Ok(Self::Goal),
            "time" => Ok(Self::Time),
            "general" => Ok(Self::General),
            _ => Err(format!("Unknown insight category: {}", s)),
        }
    }
}

/// Where an insight is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    /// Generated, not yet shown
    New,
    /// Shown to the user
    Viewed,
    /// The user acted on it
    Acted,
    /// The user dismissed it
    Dismissed,
}

impl InsightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Viewed => "viewed",
            Self::Acted => "acted",
            Self::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for InsightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "viewed" => Ok(Self::Viewed),
            "acted" => Ok(Self::Acted),
            "dismissed" => Ok(Self::Dismissed),
            _ => Err(format!("Unknown insight status: {}", s)),
        }
    }
}

/// A machine-actionable step, one variant per action kind.
///
/// Each variant carries its own typed parameters; the serialized form tags
/// the variant so downstream consumers can dispatch without string-keyed
/// parameter maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    /// Plan meals ahead to rein in a food category
    PlanMeals { category: String, weekly_budget: f64 },
    /// Walk through recent spending in one category
    ReviewSpending { category: String },
    /// Break the remaining work into a short sprint
    SprintPlan {
        goal_id: i64,
        days_left: i64,
        remaining_percent: f64,
    },
    /// Push the deadline out or reduce scope
    AdjustDeadline {
        goal_id: i64,
        suggested_extension_days: i64,
    },
    /// Lower a struggling habit's weekly target
    LowerHabitTarget {
        habit_id: i64,
        current_target: u32,
        suggested_target: u32,
    },
    /// Add a reminder at the habit's best historical time
    ScheduleReminder { habit_id: i64, at: NaiveTime },
    /// Hold a steady daily pace to finish on time
    DailyPaceGoal {
        goal_id: i64,
        required_daily_percent: f64,
    },
    /// Move one of two overlapping events
    RescheduleEvent {
        event_id: i64,
        conflicting_event_id: i64,
    },
    /// Look at the evidence behind a discovered correlation
    ReviewCorrelation {
        dimension_a: Dimension,
        dimension_b: Dimension,
    },
}

/// A suggested action attached to an insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    /// Short human phrasing, e.g. "Prep lunches for the week"
    pub label: String,
    /// Ordering among this insight's actions (lower first)
    pub priority: u8,
    pub action: ActionKind,
}

impl SuggestedAction {
    pub fn new(label: impl Into<String>, priority: u8, action: ActionKind) -> Self {
        Self {
            label: label.into(),
            priority,
            action,
        }
    }
}

/// Band `urgency*0.6 + impact*0.4` into a 1-5 priority.
///
/// The banded priority is folded back into `overall_score` via the
/// priority/5 term, so urgency and impact are intentionally counted twice;
/// see the scoring tests below which pin this behavior.
pub fn priority_band(urgency: f64, impact: f64) -> u8 {
    let weight = urgency * 0.6 + impact * 0.4;
    if weight >= 0.85 {
        5
    } else if weight >= 0.65 {
        4
    } else if weight >= 0.45 {
        3
    } else if weight >= 0.25 {
        2
    } else {
        1
    }
}

/// A ranked, actionable observation produced by the insight engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    /// 1 (low) to 5 (high), banded from urgency and impact
    pub priority: u8,
    /// How time-sensitive this is, in [0, 1]
    pub urgency: f64,
    /// How consequential this is, in [0, 1]
    pub impact: f64,
    /// How trustworthy the underlying signal is, in [0, 1]
    pub confidence: f64,
    pub actionable: bool,
    pub actions: Vec<SuggestedAction>,
    pub status: InsightStatus,
    pub generated_at: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl Insight {
    /// Create a new insight with the current timestamp and default scores
    pub fn new(
        kind: InsightKind,
        category: InsightCategory,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            category,
            title: title.into(),
            description: description.into(),
            priority: 1,
            urgency: 0.0,
            impact: 0.0,
            confidence: 0.0,
            actionable: false,
            actions: vec![],
            status: InsightStatus::New,
            generated_at: Utc::now(),
            valid_until: None,
        }
    }

    /// Set urgency/impact/confidence (clamped to [0,1]) and derive priority
    pub fn with_scores(mut self, urgency: f64, impact: f64, confidence: f64) -> Self {
        self.urgency = urgency.clamp(0.0, 1.0);
        self.impact = impact.clamp(0.0, 1.0);
        self.confidence = confidence.clamp(0.0, 1.0);
        self.priority = priority_band(self.urgency, self.impact);
        self
    }

    /// Attach a suggested action; marks the insight actionable
    pub fn with_action(mut self, action: SuggestedAction) -> Self {
        self.actionable = true;
        self.actions.push(action);
        self
    }

    /// Set an expiry after which the insight no longer applies
    pub fn with_validity(mut self, until: DateTime<Utc>) -> Self {
        self.valid_until = Some(until);
        self
    }

    /// Pure lifecycle transition
    pub fn transition(mut self, status: InsightStatus) -> Self {
        self.status = status;
        self
    }

    /// Composite ranking score:
    /// `0.4*urgency + 0.3*impact + 0.2*confidence + 0.1*(priority/5)`
    pub fn overall_score(&self) -> f64 {
        0.4 * self.urgency
            + 0.3 * self.impact
            + 0.2 * self.confidence
            + 0.1 * (self.priority as f64 / 5.0)
    }

    /// Still applicable at `now`?
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        match self.valid_until {
            None => true,
            Some(until) => now <= until,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_banding() {
        assert_eq!(priority_band(1.0, 1.0), 5);
        assert_eq!(priority_band(1.0, 0.5), 4); // 0.8
        assert_eq!(priority_band(0.5, 0.5), 3); // 0.5
        assert_eq!(priority_band(0.3, 0.3), 2); // 0.3
        assert_eq!(priority_band(0.1, 0.1), 1);
    }

    #[test]
    fn test_overall_score_counts_urgency_and_impact_twice() {
        // urgency/impact enter directly AND through the banded priority;
        // this pins the double-weighting rather than letting a refactor
        // silently "fix" it.
        let insight = Insight::new(
            InsightKind::Warning,
            InsightCategory::Financial,
            "t",
            "d",
        )
        .with_scores(1.0, 1.0, 0.0);

        assert_eq!(insight.priority, 5);
        // 0.4 + 0.3 + 0.0 + 0.1*(5/5)
        assert!((insight.overall_score() - 0.8).abs() < 1e-9);

        let low = Insight::new(InsightKind::Warning, InsightCategory::Financial, "t", "d")
            .with_scores(0.1, 0.1, 0.0);
        assert_eq!(low.priority, 1);
        // 0.04 + 0.03 + 0.0 + 0.1*(1/5)
        assert!((low.overall_score() - 0.09).abs() < 1e-9);
    }

    #[test]
    fn test_scores_are_clamped() {
        let insight = Insight::new(InsightKind::Pattern, InsightCategory::General, "t", "d")
            .with_scores(1.4, -0.2, 2.0);
        assert_eq!(insight.urgency, 1.0);
        assert_eq!(insight.impact, 0.0);
        assert_eq!(insight.confidence, 1.0);
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let open = Insight::new(InsightKind::Pattern, InsightCategory::General, "t", "d");
        assert!(open.is_valid(now));

        let expired = open.clone().with_validity(now - chrono::Duration::hours(1));
        assert!(!expired.is_valid(now));

        let live = open.with_validity(now + chrono::Duration::hours(1));
        assert!(live.is_valid(now));
    }

    #[test]
    fn test_action_attachment_marks_actionable() {
        let insight = Insight::new(
            InsightKind::Recommendation,
            InsightCategory::Habit,
            "t",
            "d",
        );
        assert!(!insight.actionable);

        let insight = insight.with_action(SuggestedAction::new(
            "Lower the target",
            1,
            ActionKind::LowerHabitTarget {
                habit_id: 3,
                current_target: 5,
                suggested_target: 3,
            },
        ));
        assert!(insight.actionable);
        assert_eq!(insight.actions.len(), 1);
    }

    #[test]
    fn test_action_kind_serializes_tagged() {
        let action = ActionKind::ReviewSpending {
            category: "food".to_string(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "review_spending");
        assert_eq!(json["category"], "food");
    }

    #[test]
    fn test_lifecycle_transition_is_pure() {
        let insight = Insight::new(InsightKind::Warning, InsightCategory::Goal, "t", "d");
        let viewed = insight.clone().transition(InsightStatus::Viewed);
        assert_eq!(insight.status, InsightStatus::New);
        assert_eq!(viewed.status, InsightStatus::Viewed);
    }
}
