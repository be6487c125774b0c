//! Task CRUD and search operations.

use super::Database;
use crate::error::Result;
use crate::types::{Task, TaskId};
use rusqlite::{OptionalExtension, Row, params};
use tracing::{debug, info};

const TASK_COLUMNS: &str = "id, text, completed";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: Some(row.get("id")?),
        text: row.get("text")?,
        completed: row.get("completed")?,
    })
}

/// Escape `LIKE` wildcards so the pattern matches the query literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Database {
    /// Insert a new task and return the id the store assigned.
    ///
    /// Any id already present on `task` is ignored.
    pub fn insert_task(&self, task: &Task) -> Result<TaskId> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (text, completed) VALUES (?1, ?2)",
                params![task.text, task.completed],
            )?;
            let id = conn.last_insert_rowid();
            info!(task_id = id, "Inserted task");
            Ok(id)
        })
    }

    /// Overwrite the row matching `task.id`.
    ///
    /// Returns `false` without touching the store when the task has no id or
    /// no row matches it.
    pub fn update_task(&self, task: &Task) -> Result<bool> {
        let Some(id) = task.id else {
            debug!("Skipping update of unsaved task");
            return Ok(false);
        };

        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET text = ?1, completed = ?2 WHERE id = ?3",
                params![task.text, task.completed, id],
            )?;
            debug!(task_id = id, changed, "Updated task");
            Ok(changed > 0)
        })
    }

    /// Delete the row with the given id. Returns whether a row was removed.
    pub fn delete_task_by_id(&self, id: TaskId) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            if deleted > 0 {
                info!(task_id = id, "Deleted task");
            }
            Ok(deleted > 0)
        })
    }

    /// Delete the row backing `task`, if it has been persisted.
    pub fn delete_task(&self, task: &Task) -> Result<bool> {
        match task.id {
            Some(id) => self.delete_task_by_id(id),
            None => Ok(false),
        }
    }

    /// Get a task by id.
    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let task = conn
                .query_row(
                    &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                    params![id],
                    parse_task_row,
                )
                .optional()?;
            Ok(task)
        })
    }

    /// Check whether a row with the given id exists.
    pub fn task_exists(&self, id: TaskId) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM tasks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// List every task in rowid order.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id"))?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            debug!(count = tasks.len(), "Listed tasks");
            Ok(tasks)
        })
    }

    /// List tasks whose text contains `query`.
    ///
    /// Matching uses SQLite `LIKE`, so it is case-insensitive for ASCII.
    /// Wildcards in `query` are matched literally, and an empty query
    /// matches every row.
    pub fn search_tasks(&self, query: &str) -> Result<Vec<Task>> {
        let pattern = escape_like(query);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE text LIKE '%' || ?1 || '%' ESCAPE '\\'
                 ORDER BY id"
            ))?;
            let tasks = stmt
                .query_map(params![pattern], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            debug!(query, count = tasks.len(), "Searched tasks");
            Ok(tasks)
        })
    }
}
