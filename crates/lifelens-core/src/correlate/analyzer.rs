//! Cross-domain correlation discovery
//!
//! The analyzer turns each [`Dimension`] into a daily value series over a
//! lookback window, inner-joins two series on date into paired samples, and
//! emits a [`Correlation`] only when the pair passes the data-sufficiency,
//! strength, and significance thresholds. Thin samples are not an error:
//! the analyzer simply returns nothing.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::correlate::stats;
use crate::correlate::types::{
    Correlation, CorrelationStrength, Dimension, EvidencePoint,
};
use crate::error::Result;
use crate::models::HabitKind;
use crate::repository::Repositories;

/// The dimension pairs the analyzer sweeps in `analyze_all`
pub const REFERENCE_PAIRS: [(Dimension, Dimension); 3] = [
    (Dimension::EmotionScore, Dimension::FinancialSpending),
    (Dimension::HabitExercise, Dimension::EmotionScore),
    (Dimension::HabitStudy, Dimension::GoalProgress),
];

/// Discovers statistically meaningful associations between life domains
pub struct CorrelationAnalyzer {
    repos: Repositories,
    config: EngineConfig,
}

impl CorrelationAnalyzer {
    pub fn new(repos: Repositories, config: EngineConfig) -> Self {
        Self { repos, config }
    }

    /// Sweep every reference dimension pair for one user
    pub async fn analyze_all(&self, user_id: i64) -> Result<Vec<Correlation>> {
        let mut found = Vec::new();
        for (a, b) in REFERENCE_PAIRS {
            if let Some(correlation) = self.analyze_one(user_id, a, b).await? {
                found.push(correlation);
            }
        }
        info!(user_id, count = found.len(), "Correlation sweep complete");
        Ok(found)
    }

    /// Analyze one dimension pair.
    ///
    /// Returns `Ok(None)` when the pair has too few samples or the
    /// association is too weak or insignificant to report.
    pub async fn analyze_one(
        &self,
        user_id: i64,
        dim_a: Dimension,
        dim_b: Dimension,
    ) -> Result<Option<Correlation>> {
        let samples = self.paired_samples(user_id, dim_a, dim_b).await?;
        if samples.len() < self.config.min_samples {
            debug!(
                user_id,
                pair = %format!("{}x{}", dim_a, dim_b),
                samples = samples.len(),
                needed = self.config.min_samples,
                "Too few paired samples"
            );
            return Ok(None);
        }

        let pairs: Vec<(f64, f64)> = samples.iter().map(|s| (s.value_a, s.value_b)).collect();
        let r = stats::pearson(&pairs);
        let p = stats::significance(r, pairs.len());

        if r.abs() < self.config.min_coefficient || p >= self.config.significance_level {
            debug!(
                user_id,
                pair = %format!("{}x{}", dim_a, dim_b),
                r,
                p,
                "Association below reporting thresholds"
            );
            return Ok(None);
        }

        let now = Utc::now();
        Ok(Some(Correlation {
            dimension_a: dim_a,
            dimension_b: dim_b,
            coefficient: Some(r),
            significance: Some(p),
            description: describe(dim_a, dim_b, r),
            evidence: select_evidence(dim_a, samples),
            discovered_at: now,
            last_verified: Some(now),
        }))
    }

    /// Re-check a stored correlation against fresh data.
    ///
    /// Still valid when the freshly computed coefficient lands within ±0.2
    /// of the stored one and the fresh result is itself significant.
    pub async fn verify(&self, user_id: i64, stored: &Correlation) -> Result<bool> {
        let stored_r = match stored.coefficient {
            Some(r) => r,
            None => return Ok(false),
        };

        let samples = self
            .paired_samples(user_id, stored.dimension_a, stored.dimension_b)
            .await?;
        if samples.len() < self.config.min_samples {
            return Ok(false);
        }

        let pairs: Vec<(f64, f64)> = samples.iter().map(|s| (s.value_a, s.value_b)).collect();
        let fresh_r = stats::pearson(&pairs);
        let fresh_p = stats::significance(fresh_r, pairs.len());

        Ok((fresh_r - stored_r).abs() <= 0.2 && fresh_p < self.config.significance_level)
    }

    /// Re-analyze every reference pair and persist the survivors with a
    /// fresh verification stamp. The maintenance sweep behind correlation
    /// staleness.
    pub async fn refresh(&self, user_id: i64) -> Result<Vec<Correlation>> {
        let found = self.analyze_all(user_id).await?;
        for correlation in &found {
            self.repos
                .correlations
                .upsert_correlation(user_id, correlation)
                .await?;
        }
        info!(user_id, count = found.len(), "Correlations refreshed");
        Ok(found)
    }

    async fn paired_samples(
        &self,
        user_id: i64,
        dim_a: Dimension,
        dim_b: Dimension,
    ) -> Result<Vec<Sample>> {
        let (series_a, series_b) = tokio::try_join!(
            self.daily_series(user_id, dim_a),
            self.daily_series(user_id, dim_b),
        )?;

        let mut samples: Vec<Sample> = series_a
            .into_iter()
            .filter_map(|(date, value_a)| {
                series_b.get(&date).map(|value_b| Sample {
                    date,
                    value_a,
                    value_b: *value_b,
                })
            })
            .collect();
        samples.sort_by_key(|s| s.date);
        Ok(samples)
    }

    /// Resolve one dimension to a date -> value map over the lookback window
    async fn daily_series(
        &self,
        user_id: i64,
        dimension: Dimension,
    ) -> Result<HashMap<NaiveDate, f64>> {
        let days = self.config.lookback_days;
        let today = Utc::now().date_naive();
        let range = (today - Duration::days(days as i64), today);

        match dimension {
            Dimension::EmotionScore => {
                let records = self.repos.emotions.fetch_recent_emotions(user_id, days).await?;
                let mut sums: HashMap<NaiveDate, (f64, usize)> = HashMap::new();
                for record in records {
                    let entry = sums.entry(record.recorded_at.date_naive()).or_insert((0.0, 0));
                    entry.0 += record.score;
                    entry.1 += 1;
                }
                Ok(sums
                    .into_iter()
                    .map(|(date, (sum, n))| (date, sum / n as f64))
                    .collect())
            }
            Dimension::FinancialSpending => {
                let records = self.repos.finance.fetch_recent_financials(user_id, days).await?;
                let mut totals: HashMap<NaiveDate, f64> = HashMap::new();
                for record in records {
                    let spend = record.spend();
                    if spend > 0.0 {
                        *totals.entry(record.date).or_insert(0.0) += spend;
                    }
                }
                Ok(totals)
            }
            Dimension::HabitExercise => self.habit_series(user_id, HabitKind::Exercise, range).await,
            Dimension::HabitStudy => self.habit_series(user_id, HabitKind::Study, range).await,
            Dimension::GoalProgress => {
                let entries = self.repos.goals.fetch_progress_log(user_id, range).await?;
                let mut sums: HashMap<NaiveDate, (f64, usize)> = HashMap::new();
                for entry in entries {
                    let slot = sums.entry(entry.date).or_insert((0.0, 0));
                    slot.0 += entry.progress;
                    slot.1 += 1;
                }
                Ok(sums
                    .into_iter()
                    .map(|(date, (sum, n))| (date, sum / n as f64))
                    .collect())
            }
        }
    }

    /// Daily effort for habits of one kind: minutes where tracked, one unit
    /// per completion otherwise
    async fn habit_series(
        &self,
        user_id: i64,
        kind: HabitKind,
        range: (NaiveDate, NaiveDate),
    ) -> Result<HashMap<NaiveDate, f64>> {
        let (habits, completions) = tokio::try_join!(
            self.repos.habits.fetch_habits(user_id),
            self.repos.habits.fetch_completions(user_id, range),
        )?;
        let matching: std::collections::HashSet<i64> = habits
            .iter()
            .filter(|h| h.kind == kind)
            .map(|h| h.id)
            .collect();

        let mut totals: HashMap<NaiveDate, f64> = HashMap::new();
        for completion in completions {
            if !completion.completed || !matching.contains(&completion.habit_id) {
                continue;
            }
            let value = completion.minutes.map(|m| m as f64).unwrap_or(1.0);
            *totals.entry(completion.date).or_insert(0.0) += value;
        }
        Ok(totals)
    }
}

/// One joined observation of a dimension pair
#[derive(Debug, Clone)]
struct Sample {
    date: NaiveDate,
    value_a: f64,
    value_b: f64,
}

/// Template a human-readable description from the sign and magnitude of r
fn describe(dim_a: Dimension, dim_b: Dimension, r: f64) -> String {
    let strength = match CorrelationStrength::from_coefficient(r) {
        CorrelationStrength::Strong => "Strong",
        CorrelationStrength::Moderate => "Moderate",
        _ => "Mild",
    };
    if r < 0.0 {
        format!(
            "{} link between {} and {}: on days when your {} is lower, your {} tends to be higher (r = {:.2})",
            strength,
            dim_a.label(),
            dim_b.label(),
            dim_a.label(),
            dim_b.label(),
            r
        )
    } else {
        format!(
            "{} link between {} and {}: they tend to rise and fall together (r = {:.2})",
            strength,
            dim_a.label(),
            dim_b.label(),
            r
        )
    }
}

/// Keep the 3 most extreme samples by dimension A's interesting end
/// (lowest mood first for the emotion dimension, heaviest days first for
/// spending)
fn select_evidence(dim_a: Dimension, mut samples: Vec<Sample>) -> Vec<EvidencePoint> {
    if dim_a.low_is_extreme() {
        samples.sort_by(|a, b| {
            a.value_a
                .partial_cmp(&b.value_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    } else {
        samples.sort_by(|a, b| {
            b.value_a
                .partial_cmp(&a.value_a)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }
    samples
        .into_iter()
        .take(3)
        .map(|s| EvidencePoint {
            date: s.date,
            value_a: s.value_a,
            value_b: s.value_b,
        })
        .collect()
}
