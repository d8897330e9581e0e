//! Status management for todos. Completion is the interesting one: it is the
//! hook that fires the recurrence engine.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::engine;
use crate::recurrence::RecurrenceRule;
use crate::store::TaskStore;
use crate::task::{Task, TaskStatus};

/// Result of completing a todo: the completed row plus the regenerated
/// successor, if the rule produced one.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub completed: Task,
    pub generated: Option<Task>,
}

/// Mark a task Completed and, for recurring tasks with
/// `generate_next_on_complete`, advance the series.
///
/// Returns `Ok(None)` when the task does not exist or belongs to a different
/// owner; mirrors lookup-by-(id, owner) semantics so a caller can't complete
/// someone else's task.
pub fn complete_todo<S: TaskStore>(
    store: &mut S,
    task_id: &str,
    owner_id: &str,
    actual_minutes: Option<i32>,
    now: DateTime<Utc>,
) -> Result<Option<CompletionOutcome>> {
    let Some(mut task) = owned_task(store, task_id, owner_id)? else {
        return Ok(None);
    };

    task.status = TaskStatus::Completed;
    task.completed_at = Some(now);
    task.actual_minutes = actual_minutes;
    store.update_task(&task)?;

    let generated = if task.rule_id.is_some() && task.generate_next_on_complete {
        engine::advance(store, &task, now)?
    } else {
        None
    };

    Ok(Some(CompletionOutcome { completed: task, generated }))
}

/// NotStarted/Deferred → InProgress.
pub fn start_todo<S: TaskStore>(
    store: &mut S,
    task_id: &str,
    owner_id: &str,
) -> Result<Option<Task>> {
    set_status(store, task_id, owner_id, TaskStatus::InProgress)
}

/// → Cancelled. Cancelled tasks are invisible to the maintenance sweep and
/// never produce successors.
pub fn cancel_todo<S: TaskStore>(
    store: &mut S,
    task_id: &str,
    owner_id: &str,
) -> Result<Option<Task>> {
    set_status(store, task_id, owner_id, TaskStatus::Cancelled)
}

/// → Deferred with a new due date. A deferred task needs an explicit start
/// or status reset to re-enter the recurring pipeline.
pub fn defer_todo<S: TaskStore>(
    store: &mut S,
    task_id: &str,
    owner_id: &str,
    new_due: NaiveDate,
) -> Result<Option<Task>> {
    let Some(mut task) = owned_task(store, task_id, owner_id)? else {
        return Ok(None);
    };
    apply_status(&mut task, TaskStatus::Deferred);
    task.due_date = Some(new_due);
    store.update_task(&task)?;
    Ok(Some(task))
}

/// → NotStarted. The way back into the recurring pipeline for a deferred,
/// started, or mistakenly completed task.
pub fn resume_todo<S: TaskStore>(
    store: &mut S,
    task_id: &str,
    owner_id: &str,
) -> Result<Option<Task>> {
    set_status(store, task_id, owner_id, TaskStatus::NotStarted)
}

/// Insert a rule, then the first occurrence pointing at it.
pub fn create_recurring_todo<S: TaskStore>(
    store: &mut S,
    mut task: Task,
    rule: RecurrenceRule,
) -> Result<Task> {
    let rule = store.insert_rule(rule)?;
    task.rule_id = Some(rule.id);
    store.insert_task(task)
}

fn owned_task<S: TaskStore>(store: &S, task_id: &str, owner_id: &str) -> Result<Option<Task>> {
    Ok(store
        .get_task(task_id)?
        .filter(|t| t.owner_id == owner_id))
}

fn set_status<S: TaskStore>(
    store: &mut S,
    task_id: &str,
    owner_id: &str,
    status: TaskStatus,
) -> Result<Option<Task>> {
    let Some(mut task) = owned_task(store, task_id, owner_id)? else {
        return Ok(None);
    };
    apply_status(&mut task, status);
    store.update_task(&task)?;
    Ok(Some(task))
}

/// Set a status while keeping the completion fields consistent: only a
/// Completed task carries `completed_at`/`actual_minutes`.
fn apply_status(task: &mut Task, status: TaskStatus) {
    task.status = status;
    if status != TaskStatus::Completed {
        task.completed_at = None;
        task.actual_minutes = None;
    }
}
