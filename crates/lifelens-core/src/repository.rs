//! Repository traits consumed by the pipeline
//!
//! Persistence is an external collaborator: each life domain exposes typed
//! read accessors behind one of these traits, and the pipeline never sees a
//! storage schema. Engines receive a [`Repositories`] bundle explicitly
//! instead of reaching for process-wide singletons, which keeps call sites
//! testable with in-memory implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::correlate::Correlation;
use crate::error::Result;
use crate::insights::Insight;
use crate::models::{
    Budget, CalendarEvent, EmotionRecord, FinancialRecord, Goal, GoalProgressEntry, Habit,
    HabitCompletion, UserProfile,
};

/// Inclusive date range `(start, end)`
pub type DateRange = (NaiveDate, NaiveDate);

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn fetch_user(&self, user_id: i64) -> Result<UserProfile>;
}

#[async_trait]
pub trait GoalRepository: Send + Sync {
    async fn fetch_goals(&self, user_id: i64) -> Result<Vec<Goal>>;
    async fn fetch_active_goals(&self, user_id: i64) -> Result<Vec<Goal>>;
    /// Daily progress series for every goal, over the given range
    async fn fetch_progress_log(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<GoalProgressEntry>>;
}

#[async_trait]
pub trait HabitRepository: Send + Sync {
    async fn fetch_habits(&self, user_id: i64) -> Result<Vec<Habit>>;
    async fn fetch_active_habits(&self, user_id: i64) -> Result<Vec<Habit>>;
    async fn fetch_today_completions(&self, user_id: i64) -> Result<Vec<HabitCompletion>>;
    async fn fetch_completions(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<HabitCompletion>>;
}

#[async_trait]
pub trait FinanceRepository: Send + Sync {
    async fn fetch_current_budget(&self, user_id: i64) -> Result<Option<Budget>>;
    async fn fetch_recent_financials(&self, user_id: i64, days: u32)
        -> Result<Vec<FinancialRecord>>;
    /// Spend per category, grouped-summed over the range
    async fn category_spending(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<HashMap<String, f64>>;
}

#[async_trait]
pub trait EmotionRepository: Send + Sync {
    async fn fetch_recent_emotions(&self, user_id: i64, days: u32) -> Result<Vec<EmotionRecord>>;
    /// Mean score over the window; `None` when no records exist
    async fn average_emotion(&self, user_id: i64, days: u32) -> Result<Option<f64>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn fetch_upcoming_events(&self, user_id: i64, days: u32) -> Result<Vec<CalendarEvent>>;
    async fn fetch_today_events(&self, user_id: i64) -> Result<Vec<CalendarEvent>>;
}

#[async_trait]
pub trait InsightRepository: Send + Sync {
    async fn fetch_recent_insights(&self, user_id: i64, limit: usize) -> Result<Vec<Insight>>;
    async fn fetch_urgent_insights(&self, user_id: i64) -> Result<Vec<Insight>>;
    /// Persist freshly generated insights (caller-driven; the engine itself
    /// never writes)
    async fn store_insights(&self, user_id: i64, insights: &[Insight]) -> Result<()>;
}

#[async_trait]
pub trait CorrelationRepository: Send + Sync {
    async fn fetch_correlations(&self, user_id: i64) -> Result<Vec<Correlation>>;
    /// Insert or replace by dimension pair
    async fn upsert_correlation(&self, user_id: i64, correlation: &Correlation) -> Result<()>;
}

/// Every repository the pipeline needs, bundled for injection.
///
/// Cheap to clone; all handles are `Arc`s.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub goals: Arc<dyn GoalRepository>,
    pub habits: Arc<dyn HabitRepository>,
    pub finance: Arc<dyn FinanceRepository>,
    pub emotions: Arc<dyn EmotionRepository>,
    pub events: Arc<dyn EventRepository>,
    pub insights: Arc<dyn InsightRepository>,
    pub correlations: Arc<dyn CorrelationRepository>,
}
