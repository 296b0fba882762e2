//! Cross-domain correlation discovery
//!
//! Pairs daily series from two life domains (mood vs. spending, exercise
//! vs. mood, study time vs. goal progress), computes Pearson's r with an
//! approximate significance level, and reports only associations that pass
//! the data-sufficiency, strength, and significance thresholds.

pub mod analyzer;
pub mod stats;
pub mod types;

pub use analyzer::{CorrelationAnalyzer, REFERENCE_PAIRS};
pub use types::{
    Correlation, CorrelationDirection, CorrelationStrength, Dimension, EvidencePoint,
    STALE_AFTER_DAYS,
};
