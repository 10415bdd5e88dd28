//! Read-only projections of a task list: the filtered and searched list,
//! and aggregate counts.

use serde::Serialize;

use crate::model::filter::StatusFilter;
use crate::model::task::Task;

/// Aggregate counts over a task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl TaskCounts {
    /// Count shown next to a filter selector
    pub fn for_filter(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.total,
            StatusFilter::Active => self.active,
            StatusFilter::Completed => self.completed,
        }
    }
}

pub fn task_counts(tasks: &[Task]) -> TaskCounts {
    let completed = tasks.iter().filter(|t| t.completed).count();
    TaskCounts {
        total: tasks.len(),
        active: tasks.len() - completed,
        completed,
    }
}

/// Lowercased, trimmed form of a search query; `None` matches everything.
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Case-insensitive substring match of a normalized query against the
/// task title. See [`normalize_query`].
pub fn matches_search(task: &Task, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => task.title.to_lowercase().contains(needle),
        None => true,
    }
}

/// Apply the status filter, then the search query.
pub fn filter_and_search(tasks: &[Task], filter: StatusFilter, query: &str) -> Vec<Task> {
    let needle = normalize_query(query);
    tasks
        .iter()
        .filter(|t| filter.admits(t))
        .filter(|t| matches_search(t, needle.as_deref()))
        .cloned()
        .collect()
}
