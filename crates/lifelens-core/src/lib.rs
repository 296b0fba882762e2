//! Lifelens Core Library
//!
//! The aggregation-to-insight pipeline for the Lifelens life tracker:
//! - Context aggregation: concurrent per-domain repository fan-out into an
//!   immutable, TTL-cached snapshot
//! - Correlation analysis: Pearson correlation with significance thresholds
//!   across life domains (mood vs. spending, exercise vs. mood, study vs.
//!   goal progress)
//! - Insight generation: independent detectors over the snapshot, ranked by
//!   a composite score
//! - Repository traits for external domain stores, plus an in-memory store
//!   for tests and the CLI

pub mod aggregator;
pub mod config;
pub mod correlate;
pub mod error;
pub mod insights;
pub mod models;
pub mod repository;
pub mod snapshot;
pub mod store;

pub use aggregator::ContextAggregator;
pub use config::EngineConfig;
pub use correlate::{
    Correlation, CorrelationAnalyzer, CorrelationDirection, CorrelationStrength, Dimension,
    EvidencePoint,
};
pub use error::{Error, Result};
pub use insights::{
    ActionKind, Insight, InsightCategory, InsightEngine, InsightKind, InsightStatus,
    SuggestedAction,
};
pub use models::{
    apply_completion, Budget, CalendarEvent, CategoryBudget, EmotionRecord, EmotionTrend,
    FinancialRecord, Goal, GoalProgressEntry, GoalStatus, Habit, HabitCompletion, HabitKind,
    UserProfile,
};
pub use repository::{DateRange, Repositories};
pub use snapshot::{
    BudgetAlert, EmotionOverview, EventConflict, FinanceOverview, GoalOverview, HabitOverview,
    ScheduleOverview, Snapshot, SnapshotSummary,
};
pub use store::{Dataset, MemoryStore};
