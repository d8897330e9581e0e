//! cadence-core: recurring-task scheduling engine.
//!
//! Pure and clock-free: every operation takes an explicit `now`, storage is
//! behind the [`TaskStore`] trait, and next-occurrence computation is a pure
//! function. The periodic trigger (and anything it schedules) lives in the
//! caller.

pub mod engine;
pub mod maintenance;
pub mod recurrence;
pub mod service;
pub mod store;
pub mod task;

pub use engine::advance;
pub use maintenance::{MaintenanceOutcome, MaintenanceRunner};
pub use recurrence::{MonthlyDay, RecurrenceRule, RecurrenceType};
pub use service::{
    cancel_todo, complete_todo, create_recurring_todo, defer_todo, resume_todo, start_todo,
    CompletionOutcome,
};
pub use store::{MemoryStore, TaskStore};
pub use task::{Priority, Task, TaskStatus};
