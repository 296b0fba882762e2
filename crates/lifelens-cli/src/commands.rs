//! Command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use lifelens_core::repository::{
    EventRepository, FinanceRepository, GoalRepository, HabitRepository,
};
use lifelens_core::{
    ContextAggregator, CorrelationAnalyzer, Dataset, Dimension, EngineConfig, Insight,
    InsightEngine, MemoryStore, Snapshot,
};

use crate::demo;

/// Build the store from a dataset file, or seed the demo dataset.
/// Returns the store and the default user id.
pub fn open_store(data: Option<&Path>) -> Result<(Arc<MemoryStore>, i64)> {
    let store = Arc::new(MemoryStore::new());
    match data {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read dataset {}", path.display()))?;
            let dataset: Dataset = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse dataset {}", path.display()))?;
            let default_user = match dataset.users.first() {
                Some(user) => user.id,
                None => bail!("Dataset {} contains no users", path.display()),
            };
            store.load_dataset(dataset);
            Ok((store, default_user))
        }
        None => {
            let user_id = demo::seed(&store);
            tracing::info!(user_id, "Using built-in demo dataset");
            Ok((store, user_id))
        }
    }
}

/// Load the engine config from a TOML file, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

pub async fn cmd_snapshot(
    store: Arc<MemoryStore>,
    user_id: i64,
    config: EngineConfig,
) -> Result<()> {
    let aggregator = ContextAggregator::new(store.into_repositories(), config);
    let snapshot = aggregator.load_snapshot(user_id).await?;
    print_snapshot(&snapshot);
    Ok(())
}

pub async fn cmd_insights(
    store: Arc<MemoryStore>,
    user_id: i64,
    config: EngineConfig,
    limit: usize,
    json: bool,
) -> Result<()> {
    let aggregator = ContextAggregator::new(store.clone().into_repositories(), config.clone());
    let analyzer = CorrelationAnalyzer::new(store.into_repositories(), config.clone());

    let snapshot = aggregator.load_snapshot(user_id).await?;
    let correlations = analyzer.analyze_all(user_id).await?;
    let engine = InsightEngine::new(config);
    let mut insights = engine.generate(&snapshot, &correlations);
    insights.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    if insights.is_empty() {
        println!("No insights right now.");
        return Ok(());
    }
    println!("Insights for {} (top {}):", snapshot.user.name, insights.len());
    for insight in &insights {
        print_insight(insight);
    }
    Ok(())
}

pub async fn cmd_correlations(
    store: Arc<MemoryStore>,
    user_id: i64,
    config: EngineConfig,
) -> Result<()> {
    let analyzer = CorrelationAnalyzer::new(store.into_repositories(), config);
    let correlations = analyzer.analyze_all(user_id).await?;

    if correlations.is_empty() {
        println!("No correlations cleared the reporting thresholds.");
        return Ok(());
    }
    for correlation in &correlations {
        println!(
            "{} x {}: r = {:.3}, p = {:.2} ({}, {})",
            correlation.dimension_a,
            correlation.dimension_b,
            correlation.coefficient.unwrap_or(0.0),
            correlation.significance.unwrap_or(1.0),
            correlation.strength(),
            correlation.direction(),
        );
        println!("  {}", correlation.description);
        for point in &correlation.evidence {
            println!(
                "  {}: {:.2} / {:.2}",
                point.date, point.value_a, point.value_b
            );
        }
    }
    Ok(())
}

pub async fn cmd_analyze(
    store: Arc<MemoryStore>,
    user_id: i64,
    config: EngineConfig,
    dim_a: &str,
    dim_b: &str,
) -> Result<()> {
    let dim_a: Dimension = dim_a
        .parse()
        .map_err(|_| lifelens_core::Error::UnknownDimension(dim_a.to_string()))?;
    let dim_b: Dimension = dim_b
        .parse()
        .map_err(|_| lifelens_core::Error::UnknownDimension(dim_b.to_string()))?;

    let analyzer = CorrelationAnalyzer::new(store.into_repositories(), config);
    match analyzer.analyze_one(user_id, dim_a, dim_b).await? {
        Some(correlation) => {
            println!(
                "{} x {}: r = {:.3}, p = {:.2} ({}, {})",
                dim_a,
                dim_b,
                correlation.coefficient.unwrap_or(0.0),
                correlation.significance.unwrap_or(1.0),
                correlation.strength(),
                correlation.direction(),
            );
            println!("{}", correlation.description);
        }
        None => println!(
            "No reportable correlation between {} and {} (thin data or weak association).",
            dim_a, dim_b
        ),
    }
    Ok(())
}

pub async fn cmd_status(store: Arc<MemoryStore>, user_id: i64) -> Result<()> {
    let goals = store.fetch_goals(user_id).await?;
    let habits = store.fetch_habits(user_id).await?;
    let budget = store.fetch_current_budget(user_id).await?;
    let recent = store.fetch_recent_financials(user_id, 30).await?;
    let events = store.fetch_upcoming_events(user_id, 7).await?;

    println!("Dataset status for user {}:", user_id);
    println!("  goals:        {}", goals.len());
    println!("  habits:       {}", habits.len());
    println!("  transactions: {} (last 30 days)", recent.len());
    println!(
        "  budget:       {}",
        match &budget {
            Some(b) => format!("{} categories for {}", b.categories.len(), b.month),
            None => "none".to_string(),
        }
    );
    println!("  events:       {} (next 7 days)", events.len());
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    let s = &snapshot.summary;
    println!("Snapshot for {} ({})", snapshot.user.name, snapshot.captured_at);
    println!(
        "  goals:    {} active, {:.0}% completion rate",
        s.active_goals,
        snapshot.goals.completion_rate * 100.0
    );
    println!(
        "  habits:   {} active, {} completed today, {:.0}% success rate",
        s.active_habits,
        s.habits_completed_today,
        snapshot.habits.success_rate * 100.0
    );
    println!(
        "  money:    {:.2} spent this month, {} budget alert(s)",
        s.month_to_date_spend,
        snapshot.finances.alerts.len()
    );
    match s.average_emotion {
        Some(avg) => println!(
            "  mood:     {:.2} average, trend {}",
            avg, snapshot.emotions.trend
        ),
        None => println!("  mood:     no records"),
    }
    println!(
        "  schedule: {} today, {} conflict(s)",
        s.events_today, s.conflict_count
    );
    println!("  patterns: {} correlation(s) on file", s.correlation_count);
}

fn print_insight(insight: &Insight) {
    println!(
        "  [{}] ({}/{}) {}  score {:.2}",
        insight.kind,
        insight.category,
        insight.priority,
        insight.title,
        insight.overall_score()
    );
    println!("      {}", insight.description);
    for action in &insight.actions {
        println!("      -> {}", action.label);
    }
}
