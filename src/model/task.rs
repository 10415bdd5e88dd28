use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest title the input layer accepts, in characters
pub const MAX_TITLE_CHARS: usize = 100;

/// A single to-do item.
///
/// Tasks are values: operations that change a task build a new one
/// rather than editing the stored instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque identifier, fixed at creation
    pub id: String,
    /// Trimmed, non-empty title
    pub title: String,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Create an open task with a freshly generated ID
    pub fn new(title: impl Into<String>) -> Self {
        Task::with_id(new_task_id(), title)
    }

    /// Create an open task with a caller-chosen ID
    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }

    /// Copy of this task with the completion flag flipped
    pub fn toggled(&self) -> Self {
        Task {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this task with a different title
    pub fn retitled(&self, title: impl Into<String>) -> Self {
        Task {
            title: title.into(),
            ..self.clone()
        }
    }
}

/// Generate a task ID: `task-<unix millis>-<random>`.
///
/// The millisecond prefix keeps IDs roughly sortable by creation time;
/// the UUID suffix makes them unique even within the same millisecond.
pub fn new_task_id() -> String {
    format!(
        "task-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}
