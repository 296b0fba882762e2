//! In-memory repository store
//!
//! Implements every repository trait over locked maps. This is the backing
//! store for tests and the CLI; production deployments wire their own
//! repository implementations into [`Repositories`] instead.
//!
//! Every trait read bumps `read_count`, which lets tests assert that a cache
//! hit issues zero repository calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Deserialize;

use crate::correlate::Correlation;
use crate::error::{Error, Result};
use crate::insights::Insight;
use crate::models::{
    Budget, CalendarEvent, EmotionRecord, FinancialRecord, Goal, GoalProgressEntry, Habit,
    HabitCompletion, UserProfile,
};
use crate::repository::{
    CorrelationRepository, DateRange, EmotionRepository, EventRepository, FinanceRepository,
    GoalRepository, HabitRepository, InsightRepository, Repositories, UserRepository,
};

#[derive(Default)]
struct Inner {
    users: HashMap<i64, UserProfile>,
    goals: Vec<Goal>,
    progress_log: Vec<GoalProgressEntry>,
    habits: Vec<Habit>,
    completions: Vec<HabitCompletion>,
    financials: Vec<FinancialRecord>,
    budgets: Vec<Budget>,
    emotions: Vec<EmotionRecord>,
    events: Vec<CalendarEvent>,
    insights: HashMap<i64, Vec<Insight>>,
    correlations: HashMap<i64, Vec<Correlation>>,
}

/// Thread-safe in-memory store implementing all repository traits
pub struct MemoryStore {
    inner: RwLock<Inner>,
    next_id: AtomicI64,
    reads: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            next_id: AtomicI64::new(1),
            reads: AtomicUsize::new(0),
        }
    }

    /// Build a [`Repositories`] bundle where every domain is served by
    /// this store
    pub fn into_repositories(self: Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            goals: self.clone(),
            habits: self.clone(),
            finance: self.clone(),
            emotions: self.clone(),
            events: self.clone(),
            insights: self.clone(),
            correlations: self,
        }
    }

    /// Number of repository reads served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn count_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn alloc_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    // --- Seeding -----------------------------------------------------------

    pub fn insert_user(&self, name: &str, timezone: &str) -> i64 {
        let id = self.alloc_id();
        self.inner.write().users.insert(
            id,
            UserProfile {
                id,
                name: name.to_string(),
                timezone: timezone.to_string(),
                created_at: Utc::now(),
            },
        );
        id
    }

    pub fn insert_goal(&self, goal: Goal) -> i64 {
        let id = self.alloc_id();
        self.inner.write().goals.push(Goal { id, ..goal });
        id
    }

    pub fn insert_habit(&self, habit: Habit) -> i64 {
        let id = self.alloc_id();
        self.inner.write().habits.push(Habit { id, ..habit });
        id
    }

    pub fn record_completion(&self, completion: HabitCompletion) -> i64 {
        let id = self.alloc_id();
        self.inner
            .write()
            .completions
            .push(HabitCompletion { id, ..completion });
        id
    }

    pub fn record_progress(&self, entry: GoalProgressEntry) {
        self.inner.write().progress_log.push(entry);
    }

    pub fn insert_financial(&self, record: FinancialRecord) -> i64 {
        let id = self.alloc_id();
        self.inner
            .write()
            .financials
            .push(FinancialRecord { id, ..record });
        id
    }

    pub fn set_budget(&self, budget: Budget) -> i64 {
        let id = self.alloc_id();
        let mut inner = self.inner.write();
        inner
            .budgets
            .retain(|b| !(b.user_id == budget.user_id && b.month == budget.month));
        inner.budgets.push(Budget { id, ..budget });
        id
    }

    pub fn record_emotion(&self, record: EmotionRecord) -> i64 {
        let id = self.alloc_id();
        self.inner
            .write()
            .emotions
            .push(EmotionRecord { id, ..record });
        id
    }

    pub fn insert_event(&self, event: CalendarEvent) -> i64 {
        let id = self.alloc_id();
        self.inner.write().events.push(CalendarEvent { id, ..event });
        id
    }

    pub fn insert_insight(&self, user_id: i64, insight: Insight) {
        self.inner
            .write()
            .insights
            .entry(user_id)
            .or_default()
            .push(insight);
    }

    /// Load a whole dataset at once (CLI fixture files)
    pub fn load_dataset(&self, dataset: Dataset) {
        let mut inner = self.inner.write();
        for user in dataset.users {
            inner.users.insert(user.id, user);
        }
        inner.goals.extend(dataset.goals);
        inner.progress_log.extend(dataset.progress_log);
        inner.habits.extend(dataset.habits);
        inner.completions.extend(dataset.completions);
        inner.financials.extend(dataset.financials);
        inner.budgets.extend(dataset.budgets);
        inner.emotions.extend(dataset.emotions);
        inner.events.extend(dataset.events);
    }
}

/// A deserializable bundle of seed data, the CLI's dataset file format
#[derive(Debug, Default, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<UserProfile>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub progress_log: Vec<GoalProgressEntry>,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub completions: Vec<HabitCompletion>,
    #[serde(default)]
    pub financials: Vec<FinancialRecord>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub emotions: Vec<EmotionRecord>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}

fn in_range(date: NaiveDate, range: DateRange) -> bool {
    date >= range.0 && date <= range.1
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn fetch_user(&self, user_id: i64) -> Result<UserProfile> {
        self.count_read();
        self.inner
            .read()
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
    }
}

#[async_trait]
impl GoalRepository for MemoryStore {
    async fn fetch_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        self.count_read();
        Ok(self
            .inner
            .read()
            .goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_active_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        self.count_read();
        Ok(self
            .inner
            .read()
            .goals
            .iter()
            .filter(|g| g.user_id == user_id && g.status == crate::models::GoalStatus::Active)
            .cloned()
            .collect())
    }

    async fn fetch_progress_log(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<GoalProgressEntry>> {
        self.count_read();
        Ok(self
            .inner
            .read()
            .progress_log
            .iter()
            .filter(|e| e.user_id == user_id && in_range(e.date, range))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HabitRepository for MemoryStore {
    async fn fetch_habits(&self, user_id: i64) -> Result<Vec<Habit>> {
        self.count_read();
        Ok(self
            .inner
            .read()
            .habits
            .iter()
            .filter(|h| h.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_active_habits(&self, user_id: i64) -> Result<Vec<Habit>> {
        self.count_read();
        Ok(self
            .inner
            .read()
            .habits
            .iter()
            .filter(|h| h.user_id == user_id && h.active)
            .cloned()
            .collect())
    }

    async fn fetch_today_completions(&self, user_id: i64) -> Result<Vec<HabitCompletion>> {
        self.count_read();
        let today = Utc::now().date_naive();
        Ok(self
            .inner
            .read()
            .completions
            .iter()
            .filter(|c| c.user_id == user_id && c.date == today)
            .cloned()
            .collect())
    }

    async fn fetch_completions(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<HabitCompletion>> {
        self.count_read();
        Ok(self
            .inner
            .read()
            .completions
            .iter()
            .filter(|c| c.user_id == user_id && in_range(c.date, range))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FinanceRepository for MemoryStore {
    async fn fetch_current_budget(&self, user_id: i64) -> Result<Option<Budget>> {
        self.count_read();
        let today = Utc::now().date_naive();
        let month_start = today.with_day(1).unwrap_or(today);
        Ok(self
            .inner
            .read()
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id && b.month <= month_start)
            .max_by_key(|b| b.month)
            .cloned())
    }

    async fn fetch_recent_financials(
        &self,
        user_id: i64,
        days: u32,
    ) -> Result<Vec<FinancialRecord>> {
        self.count_read();
        let cutoff = Utc::now().date_naive() - Duration::days(days as i64);
        let mut records: Vec<_> = self
            .inner
            .read()
            .financials
            .iter()
            .filter(|f| f.user_id == user_id && f.date >= cutoff)
            .cloned()
            .collect();
        records.sort_by_key(|f| std::cmp::Reverse(f.date));
        Ok(records)
    }

    async fn category_spending(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<HashMap<String, f64>> {
        self.count_read();
        let mut by_category: HashMap<String, f64> = HashMap::new();
        for record in self
            .inner
            .read()
            .financials
            .iter()
            .filter(|f| f.user_id == user_id && in_range(f.date, range))
        {
            let spend = record.spend();
            if spend > 0.0 {
                *by_category.entry(record.category.clone()).or_insert(0.0) += spend;
            }
        }
        Ok(by_category)
    }
}

#[async_trait]
impl EmotionRepository for MemoryStore {
    async fn fetch_recent_emotions(&self, user_id: i64, days: u32) -> Result<Vec<EmotionRecord>> {
        self.count_read();
        let cutoff = Utc::now() - Duration::days(days as i64);
        let mut records: Vec<_> = self
            .inner
            .read()
            .emotions
            .iter()
            .filter(|e| e.user_id == user_id && e.recorded_at >= cutoff)
            .cloned()
            .collect();
        records.sort_by_key(|e| e.recorded_at);
        Ok(records)
    }

    async fn average_emotion(&self, user_id: i64, days: u32) -> Result<Option<f64>> {
        self.count_read();
        let cutoff = Utc::now() - Duration::days(days as i64);
        let inner = self.inner.read();
        let scores: Vec<f64> = inner
            .emotions
            .iter()
            .filter(|e| e.user_id == user_id && e.recorded_at >= cutoff)
            .map(|e| e.score)
            .collect();
        if scores.is_empty() {
            Ok(None)
        } else {
            Ok(Some(scores.iter().sum::<f64>() / scores.len() as f64))
        }
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn fetch_upcoming_events(&self, user_id: i64, days: u32) -> Result<Vec<CalendarEvent>> {
        self.count_read();
        let now = Utc::now();
        let horizon = now + Duration::days(days as i64);
        let mut events: Vec<_> = self
            .inner
            .read()
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.end >= now && e.start <= horizon)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        Ok(events)
    }

    async fn fetch_today_events(&self, user_id: i64) -> Result<Vec<CalendarEvent>> {
        self.count_read();
        let today = Utc::now().date_naive();
        let mut events: Vec<_> = self
            .inner
            .read()
            .events
            .iter()
            .filter(|e| e.user_id == user_id && e.start.date_naive() == today)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start);
        Ok(events)
    }
}

#[async_trait]
impl InsightRepository for MemoryStore {
    async fn fetch_recent_insights(&self, user_id: i64, limit: usize) -> Result<Vec<Insight>> {
        self.count_read();
        let inner = self.inner.read();
        let mut insights: Vec<_> = inner
            .insights
            .get(&user_id)
            .map(|v| v.to_vec())
            .unwrap_or_default();
        insights.sort_by_key(|i| std::cmp::Reverse(i.generated_at));
        insights.truncate(limit);
        Ok(insights)
    }

    async fn fetch_urgent_insights(&self, user_id: i64) -> Result<Vec<Insight>> {
        self.count_read();
        let now = Utc::now();
        let inner = self.inner.read();
        Ok(inner
            .insights
            .get(&user_id)
            .map(|v| {
                v.iter()
                    .filter(|i| i.priority >= 4 && i.is_valid(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn store_insights(&self, user_id: i64, insights: &[Insight]) -> Result<()> {
        self.inner
            .write()
            .insights
            .entry(user_id)
            .or_default()
            .extend_from_slice(insights);
        Ok(())
    }
}

#[async_trait]
impl CorrelationRepository for MemoryStore {
    async fn fetch_correlations(&self, user_id: i64) -> Result<Vec<Correlation>> {
        self.count_read();
        Ok(self
            .inner
            .read()
            .correlations
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_correlation(&self, user_id: i64, correlation: &Correlation) -> Result<()> {
        let mut inner = self.inner.write();
        let entries = inner.correlations.entry(user_id).or_default();
        entries.retain(|c| {
            !(c.dimension_a == correlation.dimension_a && c.dimension_b == correlation.dimension_b)
        });
        entries.push(correlation.clone());
        Ok(())
    }
}
