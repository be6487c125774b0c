//! Core types for the task list.

use serde::{Deserialize, Serialize};

/// Store-assigned task identifier.
pub type TaskId = i64;

/// A single task in the list.
///
/// `id` is `None` until the task has been inserted; once the store assigns it
/// the value never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<TaskId>,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Create an unsaved, incomplete task.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            completed: false,
        }
    }

    /// Whether this task has ever been written to the store.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Copy of this task with a different completion flag.
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            completed,
            ..self.clone()
        }
    }

    /// Copy of this task with different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// True if the string is empty or only whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Order tasks for display: incomplete first, otherwise keeping store order.
pub fn sort_for_display(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    // sort_by_key is stable, so ties keep the order the store returned.
    sorted.sort_by_key(|t| t.completed);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, text: &str, completed: bool) -> Task {
        Task {
            id: Some(id),
            text: text.to_string(),
            completed,
        }
    }

    #[test]
    fn new_task_is_unsaved_and_incomplete() {
        let t = Task::new("Buy milk");
        assert_eq!(t.id, None);
        assert!(!t.completed);
        assert!(!t.is_persisted());
    }

    #[test]
    fn with_completed_keeps_id_and_text() {
        let t = task(4, "Water plants", false).with_completed(true);
        assert_eq!(t.id, Some(4));
        assert_eq!(t.text, "Water plants");
        assert!(t.completed);
    }

    #[test]
    fn blank_detection_trims_whitespace() {
        assert!(is_blank(""));
        assert!(is_blank("  \t\n"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn display_order_puts_completed_last_and_is_stable() {
        let tasks = vec![
            task(1, "a", true),
            task(2, "b", false),
            task(3, "c", true),
            task(4, "d", false),
        ];

        let ids: Vec<_> = sort_for_display(&tasks)
            .into_iter()
            .map(|t| t.id.unwrap())
            .collect();

        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn completed_defaults_to_false_when_deserializing() {
        let t: Task = serde_json::from_str(r#"{"id": 7, "text": "x"}"#).unwrap();
        assert_eq!(t.id, Some(7));
        assert!(!t.completed);
    }
}
