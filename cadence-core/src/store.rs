//! Task/rule persistence boundary.
//!
//! The engine only ever talks to a `TaskStore`; it never owns storage. The
//! `MemoryStore` here backs tests and the CLI's JSON state file. A SQL-backed
//! implementation would slot in behind the same trait.

use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::recurrence::RecurrenceRule;
use crate::task::{Task, TaskStatus};

pub trait TaskStore {
    /// Persist a new task, assigning its id. Returns the stored copy.
    fn insert_task(&mut self, task: Task) -> Result<Task>;

    fn update_task(&mut self, task: &Task) -> Result<()>;

    fn get_task(&self, id: &str) -> Result<Option<Task>>;

    /// Persist a new rule, assigning its id. Returns the stored copy.
    fn insert_rule(&mut self, rule: RecurrenceRule) -> Result<RecurrenceRule>;

    fn get_rule(&self, id: &str) -> Result<Option<RecurrenceRule>>;

    /// Sweep candidates: rule attached, NotStarted, due on or before `as_of`.
    fn find_due_recurring(&self, as_of: NaiveDate) -> Result<Vec<Task>>;

    /// Open tasks (not Completed/Cancelled) whose due date is strictly before
    /// `as_of`.
    fn find_overdue(&self, as_of: NaiveDate) -> Result<Vec<Task>>;
}

/// In-memory store over `BTreeMap`s so query iteration order is stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    tasks: BTreeMap<String, Task>,
    rules: BTreeMap<String, RecurrenceRule>,
    next_task_id: u64,
    next_rule_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// All tasks for one owner, open first, sorted by due date then priority.
    pub fn tasks_for_owner(&self, owner_id: &str, include_closed: bool) -> Vec<Task> {
        let mut out: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .filter(|t| include_closed || t.is_open())
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then(a.priority.cmp(&b.priority))
                .then(a.id.cmp(&b.id))
        });
        out
    }
}

impl TaskStore for MemoryStore {
    fn insert_task(&mut self, mut task: Task) -> Result<Task> {
        self.next_task_id += 1;
        task.id = format!("t-{}", self.next_task_id);
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    fn update_task(&mut self, task: &Task) -> Result<()> {
        if !self.tasks.contains_key(&task.id) {
            anyhow::bail!("no such task: {}", task.id);
        }
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.tasks.get(id).cloned())
    }

    fn insert_rule(&mut self, mut rule: RecurrenceRule) -> Result<RecurrenceRule> {
        self.next_rule_id += 1;
        rule.id = format!("r-{}", self.next_rule_id);
        self.rules.insert(rule.id.clone(), rule.clone());
        Ok(rule)
    }

    fn get_rule(&self, id: &str) -> Result<Option<RecurrenceRule>> {
        Ok(self.rules.get(id).cloned())
    }

    fn find_due_recurring(&self, as_of: NaiveDate) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .values()
            .filter(|t| {
                t.rule_id.is_some()
                    && t.status == TaskStatus::NotStarted
                    && t.due_date.is_some_and(|due| due <= as_of)
            })
            .cloned()
            .collect())
    }

    fn find_overdue(&self, as_of: NaiveDate) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .values()
            .filter(|t| t.is_open() && t.due_date.is_some_and(|due| due < as_of))
            .cloned()
            .collect())
    }
}
