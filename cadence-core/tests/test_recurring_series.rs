//! End-to-end series lifecycle: create a recurring todo, let the sweep carry
//! it forward, and check the lineage chain stays intact.

use cadence_core::{
    create_recurring_todo, MaintenanceRunner, MemoryStore, MonthlyDay, RecurrenceRule, Task,
    TaskStatus, TaskStore,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc, Weekday};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn at(y: i32, m: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, day, 6, 0, 0).unwrap()
}

#[test]
fn daily_series_advances_across_sweeps() {
    let mut store = MemoryStore::new();
    let first = create_recurring_todo(
        &mut store,
        Task::new("u1", "take meds", at(2024, 3, 1)).with_due_date(d(2024, 3, 1)),
        RecurrenceRule::daily(1),
    )
    .unwrap();
    let rule_id = first.rule_id.clone().unwrap();

    let runner = MaintenanceRunner::new();

    // Three days of hourly-style triggers; only the first trigger of each day
    // finds work.
    let mut latest_id = first.id.clone();
    for day in 1..=3 {
        let outcome = runner.run(&mut store, at(2024, 3, day));
        assert_eq!(outcome.recurring_advanced, 1, "day {day}");

        let rerun = runner.run(&mut store, at(2024, 3, day));
        assert_eq!(rerun.recurring_advanced, 0, "rerun day {day}");

        // The previous head is now Completed and its successor is linked to it.
        let head = store.get_task(&latest_id).unwrap().unwrap();
        assert_eq!(head.status, TaskStatus::Completed);
        assert!(head.completed_at.is_some());

        let successors = store.find_due_recurring(d(2024, 3, day + 1)).unwrap();
        assert_eq!(successors.len(), 1);
        let next = &successors[0];
        assert_eq!(next.parent_id.as_deref(), Some(latest_id.as_str()));
        assert_eq!(next.rule_id.as_deref(), Some(rule_id.as_str()));
        assert_eq!(next.due_date, Some(d(2024, 3, day + 1)));
        latest_id = next.id.clone();
    }

    // Original + three generated occurrences, all sharing one rule.
    assert_eq!(store.task_count(), 4);
}

#[test]
fn series_stops_after_end_date() {
    let mut store = MemoryStore::new();
    create_recurring_todo(
        &mut store,
        Task::new("u1", "sprint retro", at(2024, 3, 4)).with_due_date(d(2024, 3, 4)),
        RecurrenceRule::weekly(1, vec![Weekday::Mon]).with_end_date(d(2024, 3, 8)),
    )
    .unwrap();

    let runner = MaintenanceRunner::new();

    // First sweep on the due date: rule has not ended, successor lands on the
    // next Monday (past the end date, but generated before the end passed).
    let outcome = runner.run(&mut store, at(2024, 3, 4));
    assert_eq!(outcome.recurring_advanced, 1);
    assert_eq!(store.task_count(), 2);

    // By the successor's due date the rule has ended: it completes but no new
    // occurrence appears. The lineage is terminal.
    let outcome = runner.run(&mut store, at(2024, 3, 11));
    assert_eq!(outcome.recurring_advanced, 1);
    assert_eq!(store.task_count(), 2);

    let outcome = runner.run(&mut store, at(2024, 3, 18));
    assert_eq!(outcome.recurring_scanned, 0);
}

#[test]
fn monthly_last_day_series_hugs_month_ends() {
    let mut store = MemoryStore::new();
    create_recurring_todo(
        &mut store,
        Task::new("u1", "pay rent", at(2024, 1, 31)).with_due_date(d(2024, 1, 31)),
        RecurrenceRule::monthly(1, MonthlyDay::Last),
    )
    .unwrap();

    let runner = MaintenanceRunner::new();

    runner.run(&mut store, at(2024, 1, 31));
    assert_eq!(store.find_due_recurring(d(2024, 2, 29)).unwrap()[0].due_date, Some(d(2024, 2, 29)));

    runner.run(&mut store, at(2024, 2, 29));
    assert_eq!(store.find_due_recurring(d(2024, 3, 31)).unwrap()[0].due_date, Some(d(2024, 3, 31)));
}
