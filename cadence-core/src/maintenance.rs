//! Periodic maintenance sweep over the task store.
//!
//! Driven by an external fixed-interval trigger (the CLI's `watch` loop or a
//! cron-like host). Two phases per run, isolated from each other:
//!
//! 1. complete due recurring tasks, which regenerates their successors;
//! 2. count overdue open tasks (reporting only — escalation policy is a
//!    deliberate extension point, left unimplemented).
//!
//! The run itself never fails: per-task and per-phase errors are folded into
//! the outcome for the caller to log. Each task's completion+advance stands
//! alone, so an interrupted sweep leaves processed tasks advanced and the
//! rest eligible for the next run.

use chrono::{DateTime, Utc};

use crate::service;
use crate::store::TaskStore;

/// Report for one sweep. Transient; callers log it and move on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaintenanceOutcome {
    /// Due recurring candidates found by phase 1.
    pub recurring_scanned: usize,
    /// Candidates successfully completed (and their series advanced where
    /// the rule still had occurrences left).
    pub recurring_advanced: usize,
    /// Open tasks past their due date, per phase 2.
    pub overdue: usize,
    pub errors: Vec<String>,
}

impl MaintenanceOutcome {
    pub fn summary(&self) -> String {
        format!(
            "sweep: {} due recurring, {} advanced, {} overdue, errors={}",
            self.recurring_scanned,
            self.recurring_advanced,
            self.overdue,
            self.errors.len()
        )
    }
}

/// One sweep of both phases. Safe to call at any cadence; a second run with
/// no newly-due tasks is a no-op because advanced tasks no longer match the
/// NotStarted + due predicate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenanceRunner;

impl MaintenanceRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run<S: TaskStore>(&self, store: &mut S, now: DateTime<Utc>) -> MaintenanceOutcome {
        let mut outcome = MaintenanceOutcome::default();
        let today = now.date_naive();

        // Phase 1: complete due recurring tasks. A query failure skips the
        // phase; a per-task failure skips that task only.
        match store.find_due_recurring(today) {
            Ok(candidates) => {
                outcome.recurring_scanned = candidates.len();
                for task in candidates {
                    match service::complete_todo(store, &task.id, &task.owner_id, None, now) {
                        Ok(Some(_)) => outcome.recurring_advanced += 1,
                        // Vanished between query and completion; not an error.
                        Ok(None) => {}
                        Err(e) => outcome
                            .errors
                            .push(format!("advance {} failed: {e:#}", task.id)),
                    }
                }
            }
            Err(e) => outcome
                .errors
                .push(format!("due-recurring query failed: {e:#}")),
        }

        // Phase 2: overdue count, regardless of how phase 1 went.
        match store.find_overdue(today) {
            Ok(overdue) => outcome.overdue = overdue.len(),
            Err(e) => outcome.errors.push(format!("overdue query failed: {e:#}")),
        }

        outcome
    }
}
