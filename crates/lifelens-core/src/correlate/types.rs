//! Core types for cross-domain correlation analysis

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Days after which an unverified correlation is considered stale
pub const STALE_AFTER_DAYS: i64 = 30;

/// A measurable series in one life domain.
///
/// Each dimension resolves to one daily value series over the lookback
/// window; correlations are computed between pairs of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Mean emotion score per day
    EmotionScore,
    /// Total spend per day
    FinancialSpending,
    /// Exercise minutes per day
    HabitExercise,
    /// Study minutes per day
    HabitStudy,
    /// Mean goal progress per day
    GoalProgress,
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmotionScore => "emotion.score",
            Self::FinancialSpending => "financial.spending",
            Self::HabitExercise => "habit.exercise",
            Self::HabitStudy => "habit.study",
            Self::GoalProgress => "goal.progress",
        }
    }

    /// Human label used in correlation descriptions
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmotionScore => "mood",
            Self::FinancialSpending => "spending",
            Self::HabitExercise => "exercise",
            Self::HabitStudy => "study time",
            Self::GoalProgress => "goal progress",
        }
    }

    /// Whether low values are the interesting extreme for this dimension.
    ///
    /// Evidence points are picked from the extreme end: the lowest-mood days
    /// for the emotion dimension, the heaviest-spend days for spending.
    pub fn low_is_extreme(&self) -> bool {
        !matches!(self, Self::FinancialSpending)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "emotion.score" => Ok(Self::EmotionScore),
            "financial.spending" => Ok(Self::FinancialSpending),
            "habit.exercise" => Ok(Self::HabitExercise),
            "habit.study" => Ok(Self::HabitStudy),
            "goal.progress" => Ok(Self::GoalProgress),
            _ => Err(format!("Unknown dimension: {}", s)),
        }
    }
}

/// Strength bands for |r|
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    None,
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }

    /// Band |r| at the 0.2 / 0.4 / 0.7 cut points
    pub fn from_coefficient(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude >= 0.7 {
            Self::Strong
        } else if magnitude >= 0.4 {
            Self::Moderate
        } else if magnitude >= 0.2 {
            Self::Weak
        } else {
            Self::None
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sign of the association, with a deadband around zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    None,
    Positive,
    Negative,
}

impl CorrelationDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    /// ±0.1 deadband: |r| <= 0.1 reads as no direction
    pub fn from_coefficient(r: f64) -> Self {
        if r > 0.1 {
            Self::Positive
        } else if r < -0.1 {
            Self::Negative
        } else {
            Self::None
        }
    }
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One sample pair kept as evidence for a correlation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidencePoint {
    pub date: NaiveDate,
    pub value_a: f64,
    pub value_b: f64,
}

/// A discovered association between two dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correlation {
    pub dimension_a: Dimension,
    pub dimension_b: Dimension,
    /// Pearson r in [-1, 1]; absent when never computed
    pub coefficient: Option<f64>,
    /// Approximate p-value; absent when never computed
    pub significance: Option<f64>,
    pub description: String,
    /// Up to 3 of the most extreme sample pairs
    pub evidence: Vec<EvidencePoint>,
    pub discovered_at: DateTime<Utc>,
    pub last_verified: Option<DateTime<Utc>>,
}

impl Correlation {
    pub fn strength(&self) -> CorrelationStrength {
        match self.coefficient {
            Some(r) => CorrelationStrength::from_coefficient(r),
            None => CorrelationStrength::None,
        }
    }

    pub fn direction(&self) -> CorrelationDirection {
        match self.coefficient {
            Some(r) => CorrelationDirection::from_coefficient(r),
            None => CorrelationDirection::None,
        }
    }

    /// `p < 0.05`
    pub fn is_significant(&self) -> bool {
        matches!(self.significance, Some(p) if p < 0.05)
    }

    /// Never verified, or last verified more than 30 days ago
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.last_verified {
            None => true,
            Some(verified) => (now - verified).num_days() > STALE_AFTER_DAYS,
        }
    }
}
