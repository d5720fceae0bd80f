use rusqlite::Connection;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{NewTask, Task, TaskCounts};

/// Bumping this drops and recreates the `tasks` table on next start
pub const SCHEMA_VERSION: i64 = 1;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Task not found (ID: {0})")]
    NotFound(i64),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

impl DatabaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }
}

pub struct Database {
    conn: Connection,
}

const TASK_COLUMNS: &str = "id, title, description, priority, due_date, is_completed";

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        info!(path = %db_path.display(), "opened task database");

        let db = Database { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Create the tasks table, or drop and recreate it when the stored
    /// schema version differs from SCHEMA_VERSION
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let version: i64 = self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version != 0 && version != SCHEMA_VERSION {
            warn!(from = version, to = SCHEMA_VERSION, "schema version changed, recreating tasks table");
            self.conn.execute("DROP TABLE IF EXISTS tasks", [])?;
        }

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                priority        TEXT NOT NULL,
                due_date        TEXT NOT NULL,
                is_completed    INTEGER DEFAULT 0
            )",
            [],
        )?;

        self.conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
    }

    /// Insert a task into the database and return its ID
    pub fn insert_task(&self, task: &NewTask) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO tasks (title, description, priority, due_date, is_completed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                task.title,
                task.description,
                task.priority,
                task.due_date,
                if task.completed { 1 } else { 0 },
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "inserted task");
        Ok(id)
    }

    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            priority: row.get(3)?,
            due_date: row.get(4)?,
            completed: row.get::<_, i64>(5)? != 0,
        })
    }

    /// Get all tasks ordered by due date ASC.
    /// The ordering compares the stored dd/mm/yyyy text, not calendar dates.
    pub fn get_all_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks ORDER BY due_date ASC",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Get a single task by ID
    pub fn get_task(&self, id: i64) -> Result<Task, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS))?;

        match stmt.query_row(rusqlite::params![id], Self::row_to_task) {
            Ok(task) => Ok(task),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(DatabaseError::NotFound(id)),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Replace every mutable field of an existing task
    pub fn update_task(&self, task: &Task) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, priority = ?3,
             due_date = ?4, is_completed = ?5 WHERE id = ?6",
            rusqlite::params![
                task.title,
                task.description,
                task.priority,
                task.due_date,
                if task.completed { 1 } else { 0 },
                task.id
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(task.id));
        }
        tx.commit()?;
        debug!(id = task.id, "updated task");
        Ok(())
    }

    /// Delete a task by ID
    pub fn delete_task(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(id));
        }
        tx.commit()?;
        debug!(id, "deleted task");
        Ok(())
    }

    /// Flip the completion flag in a single statement
    pub fn toggle_task_completion(&self, id: i64) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE tasks SET is_completed = NOT is_completed WHERE id = ?1",
            rusqlite::params![id],
        )?;
        if changed == 0 {
            return Err(DatabaseError::NotFound(id));
        }
        debug!(id, "toggled task completion");
        Ok(())
    }

    pub fn task_counts(&self) -> Result<TaskCounts, DatabaseError> {
        let (total, completed): (i64, Option<i64>) = self.conn.query_row(
            "SELECT COUNT(*), SUM(is_completed != 0) FROM tasks",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let completed = completed.unwrap_or(0);
        Ok(TaskCounts {
            total: total as usize,
            pending: (total - completed) as usize,
            completed: completed as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use pretty_assertions::assert_eq;

    fn new_task(title: &str, due: &str) -> NewTask {
        NewTask::new(title.to_string(), "details".to_string(), Priority::Low, due.to_string())
    }

    #[test]
    fn create_then_list_returns_new_record() {
        let db = Database::open_in_memory().unwrap();
        let candidate = NewTask::new(
            "Buy milk".to_string(),
            "2%".to_string(),
            Priority::Low,
            "01/01/2099".to_string(),
        );
        let id = db.insert_task(&candidate).unwrap();
        assert_eq!(id, 1);

        let tasks = db.get_all_tasks().unwrap();
        assert_eq!(
            tasks,
            vec![Task {
                id: 1,
                title: "Buy milk".to_string(),
                description: "2%".to_string(),
                priority: Priority::Low,
                due_date: "01/01/2099".to_string(),
                completed: false,
            }]
        );
    }

    #[test]
    fn list_is_sorted_by_stored_due_date_text() {
        let db = Database::open_in_memory().unwrap();
        for due in ["15/12/2024", "02/01/2025", "01/06/2030", "02/01/2025", "30/01/2026"] {
            db.insert_task(&new_task("t", due)).unwrap();
        }
        let dates: Vec<String> = db.get_all_tasks().unwrap().into_iter().map(|t| t.due_date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        // text order, not calendar order
        assert_eq!(dates.first().map(String::as_str), Some("01/06/2030"));
    }

    #[test]
    fn empty_store_lists_nothing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_all_tasks().unwrap().is_empty());
    }

    #[test]
    fn toggle_twice_restores_original_value() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_task(&new_task("toggle me", "01/01/2099")).unwrap();

        db.toggle_task_completion(id).unwrap();
        assert!(db.get_task(id).unwrap().completed);
        db.toggle_task_completion(id).unwrap();
        assert!(!db.get_task(id).unwrap().completed);
    }

    #[test]
    fn toggle_missing_task_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.toggle_task_completion(7).unwrap_err().is_not_found());
    }

    #[test]
    fn delete_existing_then_missing() {
        let db = Database::open_in_memory().unwrap();
        let keep = db.insert_task(&new_task("keep", "01/01/2099")).unwrap();
        let gone = db.insert_task(&new_task("gone", "02/01/2099")).unwrap();

        db.delete_task(gone).unwrap();
        let ids: Vec<i64> = db.get_all_tasks().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![keep]);

        assert!(db.delete_task(gone).unwrap_err().is_not_found());
        assert!(db.delete_task(999).unwrap_err().is_not_found());
    }

    #[test]
    fn update_replaces_all_mutable_fields() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_task(&new_task("old", "01/01/2099")).unwrap();

        let updated = Task {
            id,
            title: "new".to_string(),
            description: "changed".to_string(),
            priority: Priority::High,
            due_date: "03/03/2099".to_string(),
            completed: true,
        };
        db.update_task(&updated).unwrap();
        assert_eq!(db.get_task(id).unwrap(), updated);
    }

    #[test]
    fn update_missing_task_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let ghost = Task {
            id: 12,
            title: "ghost".to_string(),
            description: "none".to_string(),
            priority: Priority::Medium,
            due_date: "01/01/2099".to_string(),
            completed: false,
        };
        assert!(db.update_task(&ghost).unwrap_err().is_not_found());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_task(&new_task("a", "01/01/2099")).unwrap();
        db.delete_task(first).unwrap();
        let second = db.insert_task(&new_task("b", "01/01/2099")).unwrap();
        assert!(second > first);
    }

    #[test]
    fn counts_reflect_completion() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.task_counts().unwrap(), TaskCounts::default());

        let a = db.insert_task(&new_task("a", "01/01/2099")).unwrap();
        db.insert_task(&new_task("b", "01/01/2099")).unwrap();
        db.toggle_task_completion(a).unwrap();

        assert_eq!(
            db.task_counts().unwrap(),
            TaskCounts { total: 2, pending: 1, completed: 1 }
        );
    }

    #[test]
    fn unknown_schema_version_recreates_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        let path_str = path.to_str().unwrap();

        {
            let db = Database::new(path_str).unwrap();
            db.insert_task(&new_task("old schema", "01/01/2099")).unwrap();
        }
        Connection::open(path_str).unwrap().pragma_update(None, "user_version", 99).unwrap();

        let db = Database::new(path_str).unwrap();
        assert!(db.get_all_tasks().unwrap().is_empty());
    }

    #[test]
    fn reopening_keeps_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.db");
        let path_str = path.to_str().unwrap();

        {
            let db = Database::new(path_str).unwrap();
            db.insert_task(&new_task("persisted", "01/01/2099")).unwrap();
        }

        let db = Database::new(path_str).unwrap();
        assert_eq!(db.get_all_tasks().unwrap().len(), 1);
    }
}
