//! Engine configuration
//!
//! Every threshold the pipeline applies is collected here rather than
//! hard-coded at the call sites, so deployments can tune them through a
//! TOML file. Missing fields fall back to the defaults below.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Tunable constants for the aggregation / correlation / insight pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long a cached snapshot stays valid (seconds)
    pub cache_ttl_secs: u64,
    /// Minimum paired samples before a correlation is considered at all
    pub min_samples: usize,
    /// Minimum |r| for a correlation to be emitted
    pub min_coefficient: f64,
    /// Maximum p-value for a correlation to count as significant
    pub significance_level: f64,
    /// Historical window for paired-sample collection (days)
    pub lookback_days: u32,
    /// Goals with a deadline this many days out (or closer) get reminders
    pub deadline_window_days: i64,
    /// Streak length considered "habit established"
    pub establishment_milestone: u32,
    /// Streak length considered "habit automated"
    pub automation_milestone: u32,
    /// Budget alert fires when spend/limit reaches this fraction
    pub default_alert_threshold: f64,
    /// Window for "recent" transactions and emotion records (days)
    pub recent_window_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            min_samples: 30,
            min_coefficient: 0.4,
            significance_level: 0.05,
            lookback_days: 60,
            deadline_window_days: 7,
            establishment_milestone: 21,
            automation_milestone: 66,
            default_alert_threshold: 0.8,
            recent_window_days: 30,
        }
    }
}

impl EngineConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Cache TTL as a `Duration`
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
