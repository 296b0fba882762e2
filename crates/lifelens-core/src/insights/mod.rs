//! Insight generation - ranked, actionable observations
//!
//! A fixed set of independent detectors inspects the snapshot (and the
//! current correlation set) and emits [`Insight`] records; the engine ranks
//! them by a composite score. Detectors no-op on absent data, so a sparse
//! snapshot degrades to a short (or empty) list rather than an error.
//!
//! ## Built-in detectors
//!
//! - **Budget warnings** - categories over their alert threshold
//! - **Deadline reminders** - goals due within the reminder window
//! - **Pattern insights** - significant correlations and mood-driven
//!   spending spikes
//! - **Recommendations** - struggling habits, lagging goals, schedule
//!   conflicts
//! - **Achievements** - streak milestones, personal bests, completed goals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lifelens_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new(config);
//! let ranked = engine.generate(&snapshot, &correlations);
//! ```

pub mod achievement;
pub mod budget;
pub mod deadline;
pub mod engine;
pub mod pattern;
pub mod recommend;
pub mod types;

pub use achievement::AchievementDetector;
pub use budget::BudgetWarningDetector;
pub use deadline::DeadlineReminderDetector;
pub use engine::{DetectionContext, Detector, DetectorKind, InsightEngine};
pub use pattern::PatternDetector;
pub use recommend::RecommendationDetector;
pub use types::{
    priority_band, ActionKind, Insight, InsightCategory, InsightKind, InsightStatus,
    SuggestedAction,
};
