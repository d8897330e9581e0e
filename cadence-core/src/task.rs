//! Todo/task model for the recurring-task engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
    Cancelled,
    Deferred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Urgent = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

/// One unit of work. A recurring series is a chain of these, linked by
/// `parent_id` and all pointing at the same rule id.
///
/// Invariant: `completed_at` is `Some` iff `status == Completed`. The status
/// transitions in `service` maintain this; nothing else should touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned. Empty until inserted.
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,

    pub status: TaskStatus,
    pub priority: Priority,

    /// Whole-day granularity; time-of-day is not tracked for deadlines.
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    pub category_id: Option<String>,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: Option<i32>,

    /// Shared by every occurrence in the series; never copied on advance.
    pub rule_id: Option<String>,
    /// The completed occurrence this one was generated from.
    pub parent_id: Option<String>,
    pub generate_next_on_complete: bool,
}

impl Task {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            owner_id: owner_id.into(),
            title: title.into(),
            description: None,
            status: TaskStatus::NotStarted,
            priority: Priority::Medium,
            due_date: None,
            created_at,
            completed_at: None,
            category_id: None,
            estimated_minutes: None,
            actual_minutes: None,
            rule_id: None,
            parent_id: None,
            generate_next_on_complete: true,
        }
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_estimated_minutes(mut self, minutes: i32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Open = still in the working set: not completed, not cancelled.
    pub fn is_open(&self) -> bool {
        !matches!(self.status, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_task_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let t = Task::new("u1", "water plants", now);
        assert_eq!(t.status, TaskStatus::NotStarted);
        assert_eq!(t.priority, Priority::Medium);
        assert!(t.generate_next_on_complete);
        assert!(t.completed_at.is_none());
        assert!(t.is_open());
    }

    #[test]
    fn priority_orders_urgent_first() {
        assert!(Priority::Urgent < Priority::High);
        assert!(Priority::High < Priority::Medium);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn cancelled_is_not_open() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let mut t = Task::new("u1", "x", now);
        t.status = TaskStatus::Cancelled;
        assert!(!t.is_open());
    }
}
