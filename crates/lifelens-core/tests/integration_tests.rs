//! Integration tests for lifelens-core
//!
//! These tests exercise the full aggregate → analyze → generate pipeline
//! over the in-memory store.

use std::sync::Arc;

use chrono::{Datelike, Duration, Utc};
use lifelens_core::{
    Budget, CategoryBudget, ContextAggregator, CorrelationAnalyzer, CorrelationDirection,
    CorrelationStrength, Dimension, EmotionRecord, EngineConfig, FinancialRecord, Goal,
    GoalStatus, Habit, HabitCompletion, HabitKind, InsightCategory, InsightEngine, InsightKind,
    MemoryStore,
};

// =============================================================================
// Helpers
// =============================================================================

fn new_store() -> (Arc<MemoryStore>, i64) {
    let store = Arc::new(MemoryStore::new());
    let user_id = store.insert_user("Ada", "UTC");
    (store, user_id)
}

fn seed_habit_with_streak(store: &MemoryStore, user_id: i64, name: &str, days: u32) -> i64 {
    let habit_id = store.insert_habit(Habit {
        id: 0,
        user_id,
        name: name.to_string(),
        kind: HabitKind::Other,
        weekly_target: 7,
        streak: 0,
        best_streak: 100, // above any milestone so only the milestone fires
        last_completed: None,
        preferred_time: None,
        active: true,
        created_at: Utc::now() - Duration::days(120),
    });
    let today = Utc::now().date_naive();
    for i in 0..days {
        store.record_completion(HabitCompletion {
            id: 0,
            habit_id,
            user_id,
            date: today - Duration::days(i as i64),
            completed: true,
            minutes: None,
        });
    }
    habit_id
}

/// 35 days where low mood and heavy spending coincide almost linearly
fn seed_mood_spending_link(store: &MemoryStore, user_id: i64, days: usize) {
    let today = Utc::now().date_naive();
    for i in 0..days {
        let date = today - Duration::days(i as i64 + 1);
        let score = (-0.9 + 0.045 * i as f64).clamp(-1.0, 1.0);
        store.record_emotion(EmotionRecord {
            id: 0,
            user_id,
            recorded_at: date.and_hms_opt(20, 0, 0).unwrap().and_utc(),
            score,
            trigger: Some("work".to_string()),
        });
        let wobble = ((i * 7) % 5) as f64;
        store.insert_financial(FinancialRecord {
            id: 0,
            user_id,
            date,
            amount: -(150.0 - 80.0 * score + wobble),
            category: "shopping".to_string(),
            description: "retail therapy".to_string(),
        });
    }
}

// =============================================================================
// Aggregation and caching
// =============================================================================

#[tokio::test]
async fn test_snapshot_caching_and_invalidation_round_trip() {
    let (store, user_id) = new_store();
    seed_habit_with_streak(&store, user_id, "Journal", 5);
    let aggregator =
        ContextAggregator::new(store.clone().into_repositories(), EngineConfig::default());

    let first = aggregator.load_snapshot(user_id).await.unwrap();
    let reads = store.read_count();

    // Within the TTL: same snapshot, zero extra repository reads
    let second = aggregator.load_snapshot(user_id).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(store.read_count(), reads);

    // Invalidate: the next load performs a fresh fan-out
    aggregator.invalidate(user_id).await;
    let third = aggregator.load_snapshot(user_id).await.unwrap();
    assert!(store.read_count() > reads);
    assert!(!Arc::ptr_eq(&first, &third));
}

#[tokio::test]
async fn test_snapshot_derives_streaks_and_summary() {
    let (store, user_id) = new_store();
    let habit_id = seed_habit_with_streak(&store, user_id, "Journal", 9);
    let aggregator =
        ContextAggregator::new(store.into_repositories(), EngineConfig::default());

    let snapshot = aggregator.load_snapshot(user_id).await.unwrap();
    assert_eq!(snapshot.habits.streaks.get(&habit_id), Some(&9));
    assert_eq!(snapshot.summary.active_habits, 1);
    assert_eq!(snapshot.summary.habits_completed_today, 1);
    assert_eq!(snapshot.goals.completion_rate, 0.0);
}

// =============================================================================
// Correlation analysis
// =============================================================================

#[tokio::test]
async fn test_mood_spending_scenario_strong_negative_significant() {
    let (store, user_id) = new_store();
    seed_mood_spending_link(&store, user_id, 35);
    let analyzer =
        CorrelationAnalyzer::new(store.into_repositories(), EngineConfig::default());

    let correlation = analyzer
        .analyze_one(user_id, Dimension::EmotionScore, Dimension::FinancialSpending)
        .await
        .unwrap()
        .expect("expected the mood-spending correlation");

    assert_eq!(correlation.strength(), CorrelationStrength::Strong);
    assert_eq!(correlation.direction(), CorrelationDirection::Negative);
    assert!(correlation.is_significant());
    let r = correlation.coefficient.unwrap();
    assert!((-1.0..=1.0).contains(&r));
    assert!(correlation.evidence.len() <= 3);
}

#[tokio::test]
async fn test_no_correlation_below_min_samples() {
    let (store, user_id) = new_store();
    seed_mood_spending_link(&store, user_id, 20);
    let analyzer =
        CorrelationAnalyzer::new(store.into_repositories(), EngineConfig::default());

    assert!(analyzer
        .analyze_one(user_id, Dimension::EmotionScore, Dimension::FinancialSpending)
        .await
        .unwrap()
        .is_none());
    assert!(analyzer.analyze_all(user_id).await.unwrap().is_empty());
}

// =============================================================================
// Insight generation
// =============================================================================

#[tokio::test]
async fn test_generate_ranks_by_overall_score() {
    let (store, user_id) = new_store();
    let today = Utc::now().date_naive();

    // A near-exhausted budget, a close deadline, and a streak milestone
    store.set_budget(Budget {
        id: 0,
        user_id,
        month: today.with_day(1).unwrap(),
        categories: vec![CategoryBudget {
            category: "food".to_string(),
            limit: 300.0,
            alert_threshold: 0.8,
        }],
    });
    store.insert_financial(FinancialRecord {
        id: 0,
        user_id,
        date: today,
        amount: -290.0,
        category: "food".to_string(),
        description: String::new(),
    });
    store.insert_goal(Goal {
        id: 0,
        user_id,
        title: "Ship the feature".to_string(),
        status: GoalStatus::Active,
        progress: 0.4,
        deadline: Some(today + Duration::days(2)),
        created_at: Utc::now() - Duration::days(12),
        completed_at: None,
    });
    seed_habit_with_streak(&store, user_id, "Journal", 21);

    let config = EngineConfig::default();
    let aggregator =
        ContextAggregator::new(store.clone().into_repositories(), config.clone());
    let snapshot = aggregator.load_snapshot(user_id).await.unwrap();
    let engine = InsightEngine::new(config);
    let insights = engine.generate(&snapshot, &snapshot.correlations);

    assert!(insights.len() >= 3);
    for window in insights.windows(2) {
        assert!(window[0].overall_score() >= window[1].overall_score());
    }
}

#[tokio::test]
async fn test_deadline_scenario_three_days_forty_percent() {
    let (store, user_id) = new_store();
    let today = Utc::now().date_naive();
    store.insert_goal(Goal {
        id: 0,
        user_id,
        title: "Finish the thesis chapter".to_string(),
        status: GoalStatus::Active,
        progress: 0.4,
        deadline: Some(today + Duration::days(3)),
        created_at: Utc::now() - Duration::days(4),
        completed_at: None,
    });

    let config = EngineConfig::default();
    let aggregator =
        ContextAggregator::new(store.into_repositories(), config.clone());
    let snapshot = aggregator.load_snapshot(user_id).await.unwrap();
    let insights = InsightEngine::new(config).generate(&snapshot, &[]);

    let warning = insights
        .iter()
        .find(|i| i.kind == InsightKind::Warning && i.category == InsightCategory::Goal)
        .expect("expected a goal deadline warning");
    assert!((warning.urgency - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
}

#[tokio::test]
async fn test_streak_milestones_fire_exactly_once_each() {
    let (store, user_id) = new_store();
    seed_habit_with_streak(&store, user_id, "Meditate", 21);
    seed_habit_with_streak(&store, user_id, "Stretch", 66);

    let config = EngineConfig::default();
    let aggregator =
        ContextAggregator::new(store.into_repositories(), config.clone());
    let snapshot = aggregator.load_snapshot(user_id).await.unwrap();
    let insights = InsightEngine::new(config).generate(&snapshot, &[]);

    let established: Vec<_> = insights
        .iter()
        .filter(|i| i.kind == InsightKind::Achievement && i.title.contains("established"))
        .collect();
    let automated: Vec<_> = insights
        .iter()
        .filter(|i| i.kind == InsightKind::Achievement && i.title.contains("autopilot"))
        .collect();

    assert_eq!(established.len(), 1);
    assert!(established[0].title.contains("Meditate"));
    assert_eq!(automated.len(), 1);
    assert!(automated[0].title.contains("Stretch"));
}

#[tokio::test]
async fn test_budget_alert_iff_threshold() {
    let (store, user_id) = new_store();
    let today = Utc::now().date_naive();
    store.set_budget(Budget {
        id: 0,
        user_id,
        month: today.with_day(1).unwrap(),
        categories: vec![
            CategoryBudget {
                category: "food".to_string(),
                limit: 100.0,
                alert_threshold: 0.8,
            },
            CategoryBudget {
                category: "transport".to_string(),
                limit: 100.0,
                alert_threshold: 0.8,
            },
        ],
    });
    // food at exactly 80%, transport well under
    for (amount, category) in [(-80.0, "food"), (-20.0, "transport")] {
        store.insert_financial(FinancialRecord {
            id: 0,
            user_id,
            date: today,
            amount,
            category: category.to_string(),
            description: String::new(),
        });
    }

    let config = EngineConfig::default();
    let aggregator =
        ContextAggregator::new(store.into_repositories(), config.clone());
    let snapshot = aggregator.load_snapshot(user_id).await.unwrap();

    assert_eq!(snapshot.finances.alerts.len(), 1);
    assert_eq!(snapshot.finances.alerts[0].category, "food");

    let insights = InsightEngine::new(config).generate(&snapshot, &[]);
    let budget_warnings: Vec<_> = insights
        .iter()
        .filter(|i| i.kind == InsightKind::Warning && i.category == InsightCategory::Financial)
        .collect();
    assert_eq!(budget_warnings.len(), 1);
}

#[tokio::test]
async fn test_empty_snapshot_yields_empty_insights() {
    let (store, user_id) = new_store();
    let config = EngineConfig::default();
    let aggregator =
        ContextAggregator::new(store.into_repositories(), config.clone());

    let snapshot = aggregator.load_snapshot(user_id).await.unwrap();
    let insights = InsightEngine::new(config).generate(&snapshot, &snapshot.correlations);

    assert!(insights.is_empty());
}

// =============================================================================
// Full pipeline
// =============================================================================

#[tokio::test]
async fn test_full_pipeline_correlations_feed_pattern_insights() {
    let (store, user_id) = new_store();
    seed_mood_spending_link(&store, user_id, 40);

    let config = EngineConfig::default();
    let analyzer =
        CorrelationAnalyzer::new(store.clone().into_repositories(), config.clone());
    let correlations = analyzer.refresh(user_id).await.unwrap();
    assert_eq!(correlations.len(), 1);

    // The refreshed correlation is now part of the aggregated snapshot
    let aggregator =
        ContextAggregator::new(store.into_repositories(), config.clone());
    let snapshot = aggregator.load_snapshot(user_id).await.unwrap();
    assert_eq!(snapshot.correlations.len(), 1);
    assert_eq!(snapshot.summary.correlation_count, 1);

    let insights = InsightEngine::new(config).generate(&snapshot, &snapshot.correlations);
    let patterns: Vec<_> = insights
        .iter()
        .filter(|i| i.kind == InsightKind::Pattern)
        .collect();
    assert!(!patterns.is_empty());

    // Verification of the fresh correlation holds against the same data
    assert!(analyzer.verify(user_id, &correlations[0]).await.unwrap());
}
