//! Built-in demo dataset
//!
//! Seeds the in-memory store with a few weeks of plausible life-tracking
//! data for one user, so every command has something to chew on without a
//! dataset file. The data is shaped to exercise the whole pipeline: a
//! mood-spending link strong enough to report, a budget close to its limit,
//! a tight deadline, a struggling habit, a streak milestone, and one
//! calendar collision.

use chrono::{Datelike, Duration, NaiveTime, Utc};
use lifelens_core::{
    Budget, CalendarEvent, CategoryBudget, EmotionRecord, FinancialRecord, Goal, GoalStatus,
    Habit, HabitCompletion, HabitKind, MemoryStore,
};

/// Seed the demo dataset and return the demo user's id
pub fn seed(store: &MemoryStore) -> i64 {
    let user_id = store.insert_user("Demo User", "America/Los_Angeles");
    let now = Utc::now();
    let today = now.date_naive();

    // Goals: one under deadline pressure, one finished this morning
    store.insert_goal(Goal {
        id: 0,
        user_id,
        title: "Finish the conference talk".to_string(),
        status: GoalStatus::Active,
        progress: 0.4,
        deadline: Some(today + Duration::days(3)),
        created_at: now - Duration::days(11),
        completed_at: None,
    });
    store.insert_goal(Goal {
        id: 0,
        user_id,
        title: "Run a 10k".to_string(),
        status: GoalStatus::Completed,
        progress: 1.0,
        deadline: None,
        created_at: now - Duration::days(90),
        completed_at: Some(now - Duration::hours(6)),
    });

    // Habits: a 21-day meditation streak and a study habit that isn't
    // sticking
    let meditate = store.insert_habit(Habit {
        id: 0,
        user_id,
        name: "Meditate".to_string(),
        kind: HabitKind::Mindfulness,
        weekly_target: 7,
        streak: 0,
        best_streak: 30,
        last_completed: None,
        preferred_time: Some(NaiveTime::from_hms_opt(7, 0, 0).unwrap()),
        active: true,
        created_at: now - Duration::days(120),
    });
    for i in 0..21 {
        store.record_completion(HabitCompletion {
            id: 0,
            habit_id: meditate,
            user_id,
            date: today - Duration::days(i),
            completed: true,
            minutes: Some(10),
        });
    }

    let study = store.insert_habit(Habit {
        id: 0,
        user_id,
        name: "Study Spanish".to_string(),
        kind: HabitKind::Study,
        weekly_target: 5,
        streak: 0,
        best_streak: 4,
        last_completed: None,
        preferred_time: Some(NaiveTime::from_hms_opt(19, 30, 0).unwrap()),
        active: true,
        created_at: now - Duration::days(60),
    });
    for i in 0..14 {
        store.record_completion(HabitCompletion {
            id: 0,
            habit_id: study,
            user_id,
            date: today - Duration::days(i + 1),
            completed: i % 3 == 0, // roughly one in three sticks
            minutes: if i % 3 == 0 { Some(25) } else { None },
        });
    }

    // Six weeks where low mood and heavy spending track each other
    for i in 0..42i64 {
        let date = today - Duration::days(i + 1);
        let score = (-0.85 + 0.04 * i as f64).clamp(-1.0, 1.0);
        store.record_emotion(EmotionRecord {
            id: 0,
            user_id,
            recorded_at: date.and_hms_opt(21, 0, 0).unwrap().and_utc(),
            score,
            trigger: if score < -0.2 {
                Some("work".to_string())
            } else {
                None
            },
        });
        let wobble = ((i * 7) % 11) as f64;
        store.insert_financial(FinancialRecord {
            id: 0,
            user_id,
            date,
            amount: -(40.0 - 25.0 * score + wobble),
            category: if i % 4 == 0 { "food" } else { "shopping" }.to_string(),
            description: "card purchase".to_string(),
        });
    }

    // A food budget that the month has nearly consumed
    store.set_budget(Budget {
        id: 0,
        user_id,
        month: today.with_day(1).unwrap_or(today),
        categories: vec![
            CategoryBudget {
                category: "food".to_string(),
                limit: 350.0,
                alert_threshold: 0.8,
            },
            CategoryBudget {
                category: "shopping".to_string(),
                limit: 2000.0,
                alert_threshold: 0.8,
            },
        ],
    });
    store.insert_financial(FinancialRecord {
        id: 0,
        user_id,
        date: today,
        amount: -310.0,
        category: "food".to_string(),
        description: "monthly grocery run".to_string(),
    });

    // Tomorrow's calendar double-booking
    let tomorrow_ten = (today + Duration::days(1))
        .and_hms_opt(10, 0, 0)
        .unwrap()
        .and_utc();
    store.insert_event(CalendarEvent {
        id: 0,
        user_id,
        title: "Sprint planning".to_string(),
        start: tomorrow_ten,
        end: tomorrow_ten + Duration::hours(1),
    });
    store.insert_event(CalendarEvent {
        id: 0,
        user_id,
        title: "Dentist".to_string(),
        start: tomorrow_ten + Duration::minutes(30),
        end: tomorrow_ten + Duration::minutes(90),
    });

    user_id
}
