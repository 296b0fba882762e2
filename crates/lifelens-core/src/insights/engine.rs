//! Insight engine - orchestrates detectors and ranks their output

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::correlate::Correlation;
use crate::snapshot::Snapshot;

use super::achievement::AchievementDetector;
use super::budget::BudgetWarningDetector;
use super::deadline::DeadlineReminderDetector;
use super::pattern::PatternDetector;
use super::recommend::RecommendationDetector;
use super::types::Insight;

/// Identifies a built-in detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    Budget,
    Deadline,
    Pattern,
    Recommendation,
    Achievement,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Deadline => "deadline",
            Self::Pattern => "pattern",
            Self::Recommendation => "recommendation",
            Self::Achievement => "achievement",
        }
    }
}

/// Everything a detector may look at.
///
/// Detectors are pure functions of this context: no repository access, no
/// shared state, so the engine is safely callable concurrently for
/// different users.
pub struct DetectionContext<'a> {
    pub snapshot: &'a Snapshot,
    pub correlations: &'a [Correlation],
    pub config: &'a EngineConfig,
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
}

/// A single insight detector
pub trait Detector: Send + Sync {
    /// Which detector this is
    fn id(&self) -> DetectorKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Inspect the context and emit insights. Detectors no-op on absent
    /// data; they never fail.
    fn detect(&self, ctx: &DetectionContext<'_>) -> Vec<Insight>;
}

/// Runs the detector set over a snapshot and ranks the results
pub struct InsightEngine {
    detectors: Vec<Box<dyn Detector>>,
    config: EngineConfig,
}

impl InsightEngine {
    /// Create an engine with the built-in detectors registered in their
    /// canonical order (ties in the final ranking keep this order)
    pub fn new(config: EngineConfig) -> Self {
        let mut engine = Self {
            detectors: vec![],
            config,
        };

        engine.register(Box::new(BudgetWarningDetector));
        engine.register(Box::new(DeadlineReminderDetector));
        engine.register(Box::new(PatternDetector));
        engine.register(Box::new(RecommendationDetector));
        engine.register(Box::new(AchievementDetector));

        engine
    }

    /// Register an additional detector
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Run every detector and return insights ordered by `overall_score`
    /// descending. Sparse input degrades to an empty list, never an error.
    pub fn generate(&self, snapshot: &Snapshot, correlations: &[Correlation]) -> Vec<Insight> {
        let now = Utc::now();
        let ctx = DetectionContext {
            snapshot,
            correlations,
            config: &self.config,
            now,
            today: now.date_naive(),
        };

        let mut insights = Vec::new();
        for detector in &self.detectors {
            let found = detector.detect(&ctx);
            debug!(
                detector = detector.id().as_str(),
                count = found.len(),
                "Detector pass complete"
            );
            insights.extend(found);
        }

        // Stable sort: equal scores keep detector emission order
        insights.sort_by(|a, b| {
            b.overall_score()
                .partial_cmp(&a.overall_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        insights
    }

    /// Registered detector kinds, in emission order
    pub fn detector_kinds(&self) -> Vec<DetectorKind> {
        self.detectors.iter().map(|d| d.id()).collect()
    }
}
