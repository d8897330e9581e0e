//! Occurrence advancement: produce the next task in a recurring series from
//! a just-completed one.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::store::TaskStore;
use crate::task::{Task, TaskStatus};

/// Generate and persist the next occurrence for `completed`.
///
/// Caller guarantees `completed.status == Completed` (the completion service
/// is the only caller). Returns `None` without touching the store when the
/// task has no rule or the rule's end date has passed; otherwise inserts and
/// returns exactly one new `NotStarted` task.
///
/// Base-date priority: due date, then completion time, then `now`. Anchoring
/// on the due date keeps the series from drifting when a task is completed
/// early or late.
pub fn advance<S: TaskStore>(
    store: &mut S,
    completed: &Task,
    now: DateTime<Utc>,
) -> Result<Option<Task>> {
    let Some(rule_id) = completed.rule_id.as_deref() else {
        return Ok(None);
    };
    let Some(rule) = store.get_rule(rule_id)? else {
        return Ok(None);
    };

    let today = now.date_naive();
    if rule.ended_by(today) {
        return Ok(None);
    }

    let base = completed
        .due_date
        .or_else(|| completed.completed_at.map(|t| t.date_naive()))
        .unwrap_or(today);
    let next_due = rule.next_occurrence(base);

    let next = Task {
        id: String::new(),
        owner_id: completed.owner_id.clone(),
        title: completed.title.clone(),
        description: completed.description.clone(),
        status: TaskStatus::NotStarted,
        priority: completed.priority,
        due_date: Some(next_due),
        created_at: now,
        completed_at: None,
        category_id: completed.category_id.clone(),
        estimated_minutes: completed.estimated_minutes,
        actual_minutes: None,
        // Same rule id, not a copy: the whole series shares one rule.
        rule_id: Some(rule.id),
        parent_id: Some(completed.id.clone()),
        generate_next_on_complete: completed.generate_next_on_complete,
    };

    let inserted = store.insert_task(next)?;
    Ok(Some(inserted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::RecurrenceRule;
    use crate::store::MemoryStore;
    use chrono::{NaiveDate, TimeZone};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn completed_task(store: &mut MemoryStore, rule_id: Option<String>, due: Option<NaiveDate>) -> Task {
        let mut t = Task::new("u1", "stretch", now())
            .with_description("morning stretch")
            .with_estimated_minutes(10);
        t.due_date = due;
        t.rule_id = rule_id;
        let mut t = store.insert_task(t).unwrap();
        t.status = TaskStatus::Completed;
        t.completed_at = Some(now());
        store.update_task(&t).unwrap();
        t
    }

    #[test]
    fn advance_creates_linked_successor() {
        let mut store = MemoryStore::new();
        let rule = store.insert_rule(RecurrenceRule::daily(1)).unwrap();
        let done = completed_task(&mut store, Some(rule.id.clone()), Some(d(2024, 3, 10)));

        let next = advance(&mut store, &done, now()).unwrap().unwrap();
        assert_eq!(next.status, TaskStatus::NotStarted);
        assert_eq!(next.due_date, Some(d(2024, 3, 11)));
        assert_eq!(next.parent_id.as_deref(), Some(done.id.as_str()));
        assert_eq!(next.rule_id, Some(rule.id));
        assert_eq!(next.title, done.title);
        assert_eq!(next.description, done.description);
        assert_eq!(next.estimated_minutes, done.estimated_minutes);
        assert!(next.completed_at.is_none());
        assert_eq!(store.task_count(), 2);
    }

    #[test]
    fn no_rule_is_a_no_op() {
        let mut store = MemoryStore::new();
        let done = completed_task(&mut store, None, Some(d(2024, 3, 10)));
        assert!(advance(&mut store, &done, now()).unwrap().is_none());
        assert_eq!(store.task_count(), 1);
    }

    #[test]
    fn past_end_date_suppresses_advance() {
        let mut store = MemoryStore::new();
        let rule = store
            .insert_rule(RecurrenceRule::daily(1).with_end_date(d(2024, 3, 1)))
            .unwrap();
        let done = completed_task(&mut store, Some(rule.id), Some(d(2024, 3, 10)));

        assert!(advance(&mut store, &done, now()).unwrap().is_none());
        assert_eq!(store.task_count(), 1);
    }

    #[test]
    fn end_date_today_still_advances() {
        let mut store = MemoryStore::new();
        let rule = store
            .insert_rule(RecurrenceRule::daily(1).with_end_date(d(2024, 3, 10)))
            .unwrap();
        let done = completed_task(&mut store, Some(rule.id), Some(d(2024, 3, 10)));

        assert!(advance(&mut store, &done, now()).unwrap().is_some());
    }

    #[test]
    fn base_date_prefers_due_date_over_completion() {
        let mut store = MemoryStore::new();
        let rule = store.insert_rule(RecurrenceRule::daily(7)).unwrap();
        // Due on the 5th, completed (late) on the 10th: next anchors to the 5th.
        let done = completed_task(&mut store, Some(rule.id), Some(d(2024, 3, 5)));

        let next = advance(&mut store, &done, now()).unwrap().unwrap();
        assert_eq!(next.due_date, Some(d(2024, 3, 12)));
    }

    #[test]
    fn base_date_falls_back_to_completed_at() {
        let mut store = MemoryStore::new();
        let rule = store.insert_rule(RecurrenceRule::daily(2)).unwrap();
        let done = completed_task(&mut store, Some(rule.id), None);

        let next = advance(&mut store, &done, now()).unwrap().unwrap();
        assert_eq!(next.due_date, Some(d(2024, 3, 12)));
    }
}
