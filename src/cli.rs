use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::database::{Database, DatabaseError};
use crate::models::{NewTask, Priority, RemoteTask, StatusFilter, Task, TaskFilter, UnknownPriority};
use crate::remote::{FetchError, RemoteFetcher};
use crate::validation::{validate_task_fields, ValidationError};
use crate::Config;

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Taskdeck - personal tasks in the terminal, with import from a public to-do API")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Database file path (overrides the config file)
    #[arg(long)]
    pub database: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Create a task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(short, long)]
        description: String,
        /// Due date (dd/mm/yyyy)
        #[arg(long)]
        due: String,
        /// high, medium or low
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },
    /// List tasks ordered by due date
    List {
        /// all, pending or completed
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// all, high, medium or low
        #[arg(long, default_value = "all")]
        priority: PriorityFilter,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Change fields of an existing task
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Due date (dd/mm/yyyy)
        #[arg(long)]
        due: Option<String>,
    },
    /// Flip a task between pending and completed
    Toggle { id: i64 },
    /// Delete a task
    Delete { id: i64 },
    /// Browse or import tasks from the remote API
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
}

#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Show the first remote tasks
    List {
        /// Number of tasks to show (defaults to remote_display_limit)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Copy a remote task into local storage
    Import {
        /// ID of the remote task
        remote_id: i64,
    },
}

/// `--priority` of `list`: a priority or "all"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFilter(pub Option<Priority>);

impl FromStr for PriorityFilter {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(PriorityFilter(None))
        } else {
            s.parse().map(|p| PriorityFilter(Some(p)))
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("{}", format_validation_errors(.0))]
    ValidationError(Vec<ValidationError>),
    #[error("{0}")]
    FetchError(#[from] FetchError),
    #[error("Remote task {0} not found")]
    RemoteTaskNotFound(i64),
    #[error("Import due date is out of range ({0} days from today)")]
    ImportDateOutOfRange(u32),
    #[error("Failed to encode output: {0}")]
    OutputError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
}

/// Returns the due date in its stored dd/mm/yyyy form
fn ensure_valid(title: &str, description: &str, due_date: &str, today: NaiveDate) -> Result<String, CliError> {
    validate_task_fields(title, description, due_date, today).map_err(CliError::ValidationError)
}

pub fn format_task_line(task: &Task) -> String {
    format!(
        "[{}] #{} {} ({}, due {}) - {}",
        if task.completed { "x" } else { " " },
        task.id,
        task.title,
        task.priority,
        task.due_date,
        task.description
    )
}

fn format_remote_line(task: &RemoteTask) -> String {
    format!(
        "[{}] #{} {} (user {})",
        if task.completed { "x" } else { " " },
        task.id,
        task.title,
        task.owner_id
    )
}

/// Handle the add command
pub fn handle_add(
    title: String,
    description: String,
    due: String,
    priority: Priority,
    today: NaiveDate,
    db: &Database,
) -> Result<(), CliError> {
    let due_date = ensure_valid(&title, &description, &due, today)?;

    let task = NewTask::new(title.trim().to_string(), description.trim().to_string(), priority, due_date);
    let id = db.insert_task(&task)?;
    info!(id, "task created from cli");
    println!("Task created successfully (ID: {})", id);
    Ok(())
}

/// Handle the list command
pub fn handle_list(filter: TaskFilter, json: bool, db: &Database) -> Result<(), CliError> {
    let tasks = db.get_all_tasks()?;
    let visible = filter.apply(&tasks);

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
    } else if visible.is_empty() {
        println!("No tasks");
    } else {
        for task in visible {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

/// Handle the edit command. Unspecified fields keep their value.
pub fn handle_edit(
    id: i64,
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    today: NaiveDate,
    db: &Database,
) -> Result<(), CliError> {
    let mut task = db.get_task(id)?;
    if let Some(title) = title {
        task.title = title.trim().to_string();
    }
    if let Some(description) = description {
        task.description = description.trim().to_string();
    }
    if let Some(priority) = priority {
        task.priority = priority;
    }
    if let Some(due) = due {
        task.due_date = due.trim().to_string();
    }

    task.due_date = ensure_valid(&task.title, &task.description, &task.due_date, today)?;
    db.update_task(&task)?;
    println!("Task updated (ID: {})", id);
    Ok(())
}

pub fn handle_toggle(id: i64, db: &Database) -> Result<(), CliError> {
    db.toggle_task_completion(id)?;
    let task = db.get_task(id)?;
    let state = if task.completed { "completed" } else { "pending" };
    println!("Task {} marked as {}", id, state);
    Ok(())
}

pub fn handle_delete(id: i64, db: &Database) -> Result<(), CliError> {
    db.delete_task(id)?;
    println!("Task deleted (ID: {})", id);
    Ok(())
}

pub fn handle_remote_list(limit: Option<usize>, config: &Config) -> Result<(), CliError> {
    let tasks = RemoteFetcher::from_config(config).fetch_all()?;
    let limit = limit.unwrap_or(config.remote_display_limit);

    println!("Showing {} of {} remote tasks", tasks.len().min(limit), tasks.len());
    for task in tasks.iter().take(limit) {
        println!("{}", format_remote_line(task));
    }
    Ok(())
}

pub fn handle_remote_import(
    remote_id: i64,
    today: NaiveDate,
    config: &Config,
    db: &Database,
) -> Result<(), CliError> {
    let tasks = RemoteFetcher::from_config(config).fetch_all()?;
    let remote = tasks
        .iter()
        .find(|t| t.id == remote_id)
        .ok_or(CliError::RemoteTaskNotFound(remote_id))?;

    let candidate = remote
        .to_new_task(today, config.import_due_in_days)
        .ok_or(CliError::ImportDateOutOfRange(config.import_due_in_days))?;
    let id = db.insert_task(&candidate)?;
    info!(remote_id, id, "imported remote task");
    println!("Imported remote task {} as task {}", remote_id, id);
    Ok(())
}
