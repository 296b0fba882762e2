//! Context aggregation with snapshot caching
//!
//! `ContextAggregator` fans out reads across every domain repository for one
//! user, assembles the results into an immutable [`Snapshot`], and caches it
//! under a TTL. Aggregation is fail-fast: if any single read fails the whole
//! load fails and no partial snapshot is returned or cached.
//!
//! Concurrent `load_snapshot` calls for the same uncached user share one
//! aggregation through a per-user in-flight guard, so a cold cache never
//! triggers duplicate repository fan-outs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::repository::Repositories;
use crate::snapshot::{
    EmotionOverview, FinanceOverview, GoalOverview, HabitOverview, ScheduleOverview, Snapshot,
};

/// A cached snapshot and when it was stored
struct CacheEntry {
    snapshot: Arc<Snapshot>,
    cached_at: Instant,
}

/// Aggregates one user's data across all repositories into a cached snapshot
pub struct ContextAggregator {
    repos: Repositories,
    config: EngineConfig,
    cache: RwLock<HashMap<i64, CacheEntry>>,
    /// Per-user guards; whoever holds the guard performs the aggregation,
    /// everyone queued behind it lands on the cache. Entries persist for
    /// the process lifetime, bounded by the number of distinct users seen.
    inflight: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ContextAggregator {
    pub fn new(repos: Repositories, config: EngineConfig) -> Self {
        Self {
            repos,
            config,
            cache: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Load the user's snapshot, from cache when fresh.
    ///
    /// A cache hit issues zero repository calls. On a miss, all domain reads
    /// run concurrently and must all succeed before the snapshot is
    /// assembled and cached.
    pub async fn load_snapshot(&self, user_id: i64) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.cached(user_id).await {
            debug!(user_id, "Snapshot cache hit");
            return Ok(snapshot);
        }

        let guard = {
            let mut inflight = self.inflight.lock().await;
            inflight
                .entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _held = guard.lock().await;

        // Another caller may have finished the aggregation while we waited
        if let Some(snapshot) = self.cached(user_id).await {
            debug!(user_id, "Snapshot cache hit after in-flight wait");
            return Ok(snapshot);
        }

        let started = Instant::now();
        let snapshot = match self.aggregate(user_id).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!(user_id, error = %e, "Snapshot aggregation failed");
                return Err(e);
            }
        };

        self.cache.write().await.insert(
            user_id,
            CacheEntry {
                snapshot: snapshot.clone(),
                cached_at: Instant::now(),
            },
        );
        info!(
            user_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Snapshot aggregated"
        );

        Ok(snapshot)
    }

    /// Drop the cached snapshot for one user; the next load re-aggregates
    pub async fn invalidate(&self, user_id: i64) {
        self.cache.write().await.remove(&user_id);
        debug!(user_id, "Snapshot cache invalidated");
    }

    /// Drop every cached snapshot
    pub async fn invalidate_all(&self) {
        self.cache.write().await.clear();
        debug!("Snapshot cache cleared");
    }

    async fn cached(&self, user_id: i64) -> Option<Arc<Snapshot>> {
        let cache = self.cache.read().await;
        cache.get(&user_id).and_then(|entry| {
            if entry.cached_at.elapsed() < self.config.cache_ttl() {
                Some(entry.snapshot.clone())
            } else {
                None
            }
        })
    }

    /// The fan-out itself. Every repository read is issued concurrently and
    /// joined before assembly; the combined snapshot reflects whatever each
    /// repository returned at call time (no cross-repository isolation).
    async fn aggregate(&self, user_id: i64) -> Result<Snapshot> {
        let now = Utc::now();
        let today = now.date_naive();
        let recent_days = self.config.recent_window_days;
        // Completion history must reach past the longest streak milestone,
        // or a 66-day streak could never be derived
        let history_days = self
            .config
            .lookback_days
            .max(self.config.automation_milestone + 7);
        let history_range = (today - Duration::days(history_days as i64), today);
        let month_range = (today.with_day(1).unwrap_or(today), today);

        let (
            user,
            goals,
            habits,
            today_completions,
            completion_history,
            budget,
            recent_financials,
            category_spending,
            recent_emotions,
            upcoming_events,
            today_events,
            recent_insights,
            urgent_insights,
            correlations,
        ) = tokio::try_join!(
            self.repos.users.fetch_user(user_id),
            self.repos.goals.fetch_goals(user_id),
            self.repos.habits.fetch_active_habits(user_id),
            self.repos.habits.fetch_today_completions(user_id),
            self.repos.habits.fetch_completions(user_id, history_range),
            self.repos.finance.fetch_current_budget(user_id),
            self.repos.finance.fetch_recent_financials(user_id, recent_days),
            self.repos.finance.category_spending(user_id, month_range),
            self.repos.emotions.fetch_recent_emotions(user_id, recent_days),
            self.repos.events.fetch_upcoming_events(user_id, 7),
            self.repos.events.fetch_today_events(user_id),
            self.repos.insights.fetch_recent_insights(user_id, 20),
            self.repos.insights.fetch_urgent_insights(user_id),
            self.repos.correlations.fetch_correlations(user_id),
        )?;

        Ok(Snapshot::assemble(
            user,
            GoalOverview::from_goals(goals),
            HabitOverview::build(habits, today_completions, completion_history, today),
            FinanceOverview::build(budget, recent_financials, category_spending),
            EmotionOverview::from_records(recent_emotions),
            ScheduleOverview::build(upcoming_events, today_events),
            recent_insights,
            urgent_insights,
            correlations,
            now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::Goal;
    use crate::repository::GoalRepository;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn seeded_store() -> (Arc<MemoryStore>, i64) {
        let store = Arc::new(MemoryStore::new());
        let user_id = store.insert_user("Ada", "UTC");
        (store, user_id)
    }

    fn aggregator(store: Arc<MemoryStore>) -> ContextAggregator {
        ContextAggregator::new(store.into_repositories(), EngineConfig::default())
    }

    #[tokio::test]
    async fn test_cache_hit_issues_zero_repository_reads() {
        let (store, user_id) = seeded_store();
        let agg = aggregator(store.clone());

        let first = agg.load_snapshot(user_id).await.unwrap();
        let reads_after_first = store.read_count();
        assert!(reads_after_first > 0);

        let second = agg.load_snapshot(user_id).await.unwrap();
        assert_eq!(store.read_count(), reads_after_first);
        // Same snapshot instance, not a rebuild
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_invalidate_forces_fresh_aggregation() {
        let (store, user_id) = seeded_store();
        let agg = aggregator(store.clone());

        let _ = agg.load_snapshot(user_id).await.unwrap();
        let reads_after_first = store.read_count();

        agg.invalidate(user_id).await;
        let _ = agg.load_snapshot(user_id).await.unwrap();
        assert!(store.read_count() > reads_after_first);
    }

    #[tokio::test]
    async fn test_expired_ttl_forces_fresh_aggregation() {
        let (store, user_id) = seeded_store();
        let config = EngineConfig {
            cache_ttl_secs: 0,
            ..EngineConfig::default()
        };
        let agg = ContextAggregator::new(store.clone().into_repositories(), config);

        let _ = agg.load_snapshot(user_id).await.unwrap();
        let reads_after_first = store.read_count();
        let _ = agg.load_snapshot(user_id).await.unwrap();
        assert!(store.read_count() > reads_after_first);
    }

    #[tokio::test]
    async fn test_concurrent_cold_loads_share_one_aggregation() {
        let (store, user_id) = seeded_store();
        let agg = Arc::new(aggregator(store.clone()));

        let a = {
            let agg = agg.clone();
            tokio::spawn(async move { agg.load_snapshot(user_id).await })
        };
        let b = {
            let agg = agg.clone();
            tokio::spawn(async move { agg.load_snapshot(user_id).await })
        };
        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
        let reads_after_pair = store.read_count();

        // A third, cache-invalidated load measures one full fan-out
        agg.invalidate(user_id).await;
        let _ = agg.load_snapshot(user_id).await.unwrap();
        let one_fanout = store.read_count() - reads_after_pair;

        assert_eq!(reads_after_pair, one_fanout);
        assert!(Arc::ptr_eq(&a, &b));
    }

    /// Goal repository that always fails, for fail-fast tests
    struct BrokenGoals;

    #[async_trait]
    impl GoalRepository for BrokenGoals {
        async fn fetch_goals(&self, _user_id: i64) -> Result<Vec<Goal>> {
            Err(Error::Repository("goals store offline".to_string()))
        }
        async fn fetch_active_goals(&self, _user_id: i64) -> Result<Vec<Goal>> {
            Err(Error::Repository("goals store offline".to_string()))
        }
        async fn fetch_progress_log(
            &self,
            _user_id: i64,
            _range: crate::repository::DateRange,
        ) -> Result<Vec<crate::models::GoalProgressEntry>> {
            Err(Error::Repository("goals store offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_one_failing_read_fails_the_whole_aggregation() {
        let (store, user_id) = seeded_store();
        let mut repos = store.clone().into_repositories();
        repos.goals = Arc::new(BrokenGoals);
        let agg = ContextAggregator::new(repos, EngineConfig::default());

        let result = agg.load_snapshot(user_id).await;
        assert!(matches!(result, Err(Error::Repository(_))));

        // Nothing was cached: a retry hits the repositories again
        let reads = store.read_count();
        let _ = agg.load_snapshot(user_id).await;
        assert!(store.read_count() > reads);
    }

    #[tokio::test]
    async fn test_invalidate_all_clears_every_user() {
        let store = Arc::new(MemoryStore::new());
        let user_a = store.insert_user("Ada", "UTC");
        let user_b = store.insert_user("Grace", "UTC");
        let agg = aggregator(store.clone());

        let _ = agg.load_snapshot(user_a).await.unwrap();
        let _ = agg.load_snapshot(user_b).await.unwrap();
        let reads = store.read_count();

        agg.invalidate_all().await;
        let _ = agg.load_snapshot(user_a).await.unwrap();
        let _ = agg.load_snapshot(user_b).await.unwrap();
        assert!(store.read_count() > reads);
    }
}
