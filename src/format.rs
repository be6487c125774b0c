//! Output formatting for task lists.

use crate::types::Task;
use serde::{Deserialize, Serialize};

/// Output format for printed task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Format a single task as one line: `[x] 3  Buy milk`.
pub fn format_task_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let id = task
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("[{}] {:<3} {}", check, id, task.text)
}

/// Format tasks as text, with a heading when the list is empty.
pub fn format_tasks_text(tasks: &[Task], query: &str) -> String {
    if tasks.is_empty() {
        return if query.trim().is_empty() {
            "No tasks found!\n".to_string()
        } else {
            format!("No tasks matching \"{}\"\n", query)
        };
    }

    let mut out = String::new();
    for task in tasks {
        out.push_str(&format_task_line(task));
        out.push('\n');
    }
    out
}

/// Render tasks in the requested format.
pub fn render_tasks(
    tasks: &[Task],
    query: &str,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(format_tasks_text(tasks, query)),
        OutputFormat::Json => serde_json::to_string_pretty(tasks).map(|mut s| {
            s.push('\n');
            s
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_line_marks_completed() {
        let done = Task {
            id: Some(3),
            text: "Buy milk".to_string(),
            completed: true,
        };
        let open = Task {
            id: Some(12),
            text: "Call mom".to_string(),
            completed: false,
        };

        assert_eq!(format_task_line(&done), "[x] 3   Buy milk");
        assert_eq!(format_task_line(&open), "[ ] 12  Call mom");
    }

    #[test]
    fn empty_list_has_message() {
        assert_eq!(format_tasks_text(&[], ""), "No tasks found!\n");
        assert_eq!(format_tasks_text(&[], "milk"), "No tasks matching \"milk\"\n");
    }

    #[test]
    fn json_output_is_an_array() {
        let tasks = vec![Task {
            id: Some(1),
            text: "a".to_string(),
            completed: false,
        }];
        let out = render_tasks(&tasks, "", OutputFormat::Json).unwrap();
        let parsed: Vec<Task> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, tasks);
    }

    #[test]
    fn format_names_parse_case_insensitively() {
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("md"), None);
    }
}
