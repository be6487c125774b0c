//! Data-access interface the controller talks to.

use crate::db::Database;
use crate::error::Result;
use crate::types::{Task, TaskId};

/// Narrow task store interface.
///
/// Operations are synchronous; callers that must not block run them on a
/// blocking worker. Implementations serialize their own access, so a single
/// store can be shared across workers without extra locking.
pub trait TaskStore: Send + Sync + 'static {
    /// Append a new row and return the assigned id.
    fn insert(&self, task: &Task) -> Result<TaskId>;

    /// Overwrite the row matching `task.id`. No-op for a missing or unknown id.
    fn update(&self, task: &Task) -> Result<()>;

    /// Remove the row with `id`. No-op if none exists.
    fn delete_by_id(&self, id: TaskId) -> Result<()>;

    /// Every row, in the store's natural order.
    fn get_all(&self) -> Result<Vec<Task>>;

    /// Rows whose text contains `substring`.
    fn get_filtered(&self, substring: &str) -> Result<Vec<Task>>;

    fn exists_by_id(&self, id: TaskId) -> Result<bool>;

    fn get_by_id(&self, id: TaskId) -> Result<Option<Task>>;
}

impl TaskStore for Database {
    fn insert(&self, task: &Task) -> Result<TaskId> {
        self.insert_task(task)
    }

    fn update(&self, task: &Task) -> Result<()> {
        self.update_task(task).map(|_| ())
    }

    fn delete_by_id(&self, id: TaskId) -> Result<()> {
        self.delete_task_by_id(id).map(|_| ())
    }

    fn get_all(&self) -> Result<Vec<Task>> {
        self.list_tasks()
    }

    fn get_filtered(&self, substring: &str) -> Result<Vec<Task>> {
        self.search_tasks(substring)
    }

    fn exists_by_id(&self, id: TaskId) -> Result<bool> {
        self.task_exists(id)
    }

    fn get_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        self.get_task(id)
    }
}
