use anyhow::{bail, Result};
use cadence_core::{
    cancel_todo, complete_todo, create_recurring_todo, defer_todo, resume_todo, start_todo,
    MaintenanceRunner, MonthlyDay, Priority, RecurrenceRule, Task, TaskStore,
};
use chrono::{NaiveDate, Utc, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

mod state;

#[derive(Parser, Debug)]
#[command(name = "cadence", version, about = "Recurring-task scheduler CLI")]
struct Cli {
    /// Owner id for all task operations
    #[arg(long, global = true, default_value = "local")]
    owner: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a task, optionally with a recurrence rule
    Add {
        title: String,

        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,

        /// Make the task recurring
        #[arg(long, value_enum)]
        every: Option<Every>,

        /// Every N days/weeks/months/years (default: 1)
        #[arg(long, default_value_t = 1)]
        interval: u32,

        /// Weekly only: comma-separated weekdays, e.g. mon,wed,fri
        #[arg(long)]
        days: Option<String>,

        /// Monthly only: day of month 1-31, or "last"
        #[arg(long)]
        monthly_day: Option<String>,

        /// Last date the series may produce occurrences, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,

        #[arg(long, value_enum, default_value_t = CliPriority::Medium)]
        priority: CliPriority,

        /// Estimated minutes
        #[arg(long)]
        estimate: Option<i32>,

        /// Complete this occurrence without generating the next one
        #[arg(long)]
        no_generate_next: bool,
    },

    /// List open tasks (all tasks with --all)
    List {
        #[arg(long)]
        all: bool,
    },

    /// Complete a task; recurring tasks regenerate their next occurrence
    Complete {
        id: String,

        /// Actual minutes spent
        #[arg(long)]
        minutes: Option<i32>,
    },

    /// Mark a task in progress
    Start { id: String },

    /// Cancel a task (drops out of the maintenance sweep)
    Cancel { id: String },

    /// Defer a task to a new due date, YYYY-MM-DD
    Defer { id: String, new_due: String },

    /// Return a deferred or started task to NotStarted (back into the sweep)
    Resume { id: String },

    /// Run one maintenance sweep now
    Sweep,

    /// Run a maintenance sweep on a fixed interval (default: hourly)
    Watch {
        #[arg(long, default_value_t = 60)]
        minutes: u64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Every {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl From<CliPriority> for Priority {
    fn from(p: CliPriority) -> Self {
        match p {
            CliPriority::Low => Priority::Low,
            CliPriority::Medium => Priority::Medium,
            CliPriority::High => Priority::High,
            CliPriority::Urgent => Priority::Urgent,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let owner = cli.owner.clone();

    match cli.command {
        Command::Add {
            title,
            due,
            every,
            interval,
            days,
            monthly_day,
            end,
            priority,
            estimate,
            no_generate_next,
        } => {
            let mut store = state::load_store()?;
            let now = Utc::now();

            let mut task = Task::new(&owner, title, now).with_priority(priority.into());
            if let Some(due) = due {
                task.due_date = Some(parse_date(&due)?);
            }
            task.estimated_minutes = estimate;
            task.generate_next_on_complete = !no_generate_next;

            let stored = match every {
                Some(every) => {
                    if task.due_date.is_none() {
                        bail!("recurring tasks need --due so the sweep knows when to advance them");
                    }
                    let rule = build_rule(every, interval, days, monthly_day, end)?;
                    create_recurring_todo(&mut store, task, rule)?
                }
                None => store.insert_task(task)?,
            };
            state::save_store(&store)?;
            println!("Added {} | {}", stored.id, stored.title);
        }

        Command::List { all } => {
            let store = state::load_store()?;
            let tasks = store.tasks_for_owner(&owner, all);
            if tasks.is_empty() {
                println!("No tasks.");
                return Ok(());
            }
            for t in tasks {
                let due = t
                    .due_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let recurring = if t.rule_id.is_some() { " [recurring]" } else { "" };
                println!("{} | {:?} | due {} | {}{}", t.id, t.status, due, t.title, recurring);
            }
        }

        Command::Complete { id, minutes } => {
            let mut store = state::load_store()?;
            match complete_todo(&mut store, &id, &owner, minutes, Utc::now())? {
                Some(out) => {
                    println!("Completed {}", out.completed.id);
                    if let Some(next) = out.generated {
                        let due = next
                            .due_date
                            .map(|d| d.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        println!("Next occurrence {} due {}", next.id, due);
                    }
                }
                None => bail!("no such task: {id}"),
            }
            state::save_store(&store)?;
        }

        Command::Start { id } => {
            let mut store = state::load_store()?;
            if start_todo(&mut store, &id, &owner)?.is_none() {
                bail!("no such task: {id}");
            }
            state::save_store(&store)?;
            println!("Started {id}");
        }

        Command::Cancel { id } => {
            let mut store = state::load_store()?;
            if cancel_todo(&mut store, &id, &owner)?.is_none() {
                bail!("no such task: {id}");
            }
            state::save_store(&store)?;
            println!("Cancelled {id}");
        }

        Command::Defer { id, new_due } => {
            let new_due = parse_date(&new_due)?;
            let mut store = state::load_store()?;
            if defer_todo(&mut store, &id, &owner, new_due)?.is_none() {
                bail!("no such task: {id}");
            }
            state::save_store(&store)?;
            println!("Deferred {id} to {new_due}");
        }

        Command::Resume { id } => {
            let mut store = state::load_store()?;
            if resume_todo(&mut store, &id, &owner)?.is_none() {
                bail!("no such task: {id}");
            }
            state::save_store(&store)?;
            println!("Resumed {id}");
        }

        Command::Sweep => {
            sweep_once()?;
        }

        Command::Watch { minutes } => {
            if minutes == 0 {
                bail!("--minutes must be at least 1");
            }
            let mut ticker = tokio::time::interval(Duration::from_secs(minutes * 60));
            println!("Watching; sweeping every {minutes} minute(s). Ctrl-C to stop.");
            loop {
                ticker.tick().await;
                if let Err(e) = sweep_once() {
                    eprintln!("sweep failed: {e:#}");
                }
            }
        }
    }

    Ok(())
}

/// One complete sweep: load, run, persist, report. Runs serially, so two
/// sweeps never overlap within one watcher process.
fn sweep_once() -> Result<()> {
    let mut store = state::load_store()?;
    let outcome = MaintenanceRunner::new().run(&mut store, Utc::now());
    state::save_store(&store)?;
    println!("{}", outcome.summary());
    for err in &outcome.errors {
        eprintln!("  {err}");
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("invalid date '{s}' (want YYYY-MM-DD): {e}"))
}

fn parse_days(input: &str) -> Result<Vec<Weekday>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Weekday>()
                .map_err(|_| anyhow::anyhow!("invalid weekday '{s}' (want e.g. mon, tue)"))
        })
        .collect()
}

fn build_rule(
    every: Every,
    interval: u32,
    days: Option<String>,
    monthly_day: Option<String>,
    end: Option<String>,
) -> Result<RecurrenceRule> {
    if interval == 0 {
        bail!("--interval must be at least 1");
    }

    let mut rule = match every {
        Every::Daily => RecurrenceRule::daily(interval),
        Every::Weekly => {
            let days = days.as_deref().map(parse_days).transpose()?.unwrap_or_default();
            RecurrenceRule::weekly(interval, days)
        }
        Every::Monthly => {
            let day = match monthly_day.as_deref() {
                Some("last") => MonthlyDay::Last,
                Some(n) => {
                    let n: u32 = n
                        .parse()
                        .map_err(|_| anyhow::anyhow!("invalid --monthly-day '{n}' (want 1-31 or 'last')"))?;
                    if !(1..=31).contains(&n) {
                        bail!("--monthly-day must be 1-31 or 'last'");
                    }
                    MonthlyDay::Day(n)
                }
                None => bail!("monthly rules need --monthly-day (1-31 or 'last')"),
            };
            RecurrenceRule::monthly(interval, day)
        }
        Every::Yearly => RecurrenceRule::yearly(interval),
    };

    if let Some(end) = end {
        rule = rule.with_end_date(parse_date(&end)?);
    }
    Ok(rule)
}
