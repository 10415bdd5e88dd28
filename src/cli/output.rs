use serde::Serialize;

use crate::model::filter::StatusFilter;
use crate::model::task::Task;
use crate::ops::view::TaskCounts;
use crate::util::unicode::truncate_to_width;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub position: usize,
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub filter: StatusFilter,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    pub counts: TaskCounts,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ClearJson {
    pub removed: usize,
    pub counts: TaskCounts,
}

/// JSON for numbered rows
pub fn tasks_to_json(rows: &[(usize, &Task)]) -> Vec<TaskJson> {
    rows.iter()
        .map(|&(position, t)| task_to_json(position, t))
        .collect()
}

/// Number `shown` in display order, from 1
pub fn number_in_order(shown: &[Task]) -> Vec<(usize, &Task)> {
    shown.iter().enumerate().map(|(i, t)| (i + 1, t)).collect()
}

/// Number `shown` by each task's 1-based place in `all`, so a number read
/// off a filtered listing resolves to the same task against `all`.
pub fn number_by_collection<'a>(shown: &'a [Task], all: &[Task]) -> Vec<(usize, &'a Task)> {
    shown
        .iter()
        .filter_map(|t| {
            all.iter()
                .position(|other| other.id == t.id)
                .map(|i| (i + 1, t))
        })
        .collect()
}

pub fn task_to_json(position: usize, task: &Task) -> TaskJson {
    TaskJson {
        position,
        id: task.id.clone(),
        title: task.title.clone(),
        completed: task.completed,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

pub const EMPTY_STATE: [&str; 2] = ["No tasks yet!", "Add your first task to get started."];

pub const NO_MATCHES: &str = "No tasks match.";

fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

/// Format a single task as a one-line summary
pub fn format_task_line(
    position: usize,
    task: &Task,
    show_id: bool,
    width: Option<usize>,
) -> String {
    let title = match width {
        Some(w) => truncate_to_width(&task.title, w),
        None => task.title.clone(),
    };
    if show_id {
        format!("{:>3}. {} {}  ({})", position, checkbox(task), title, task.id)
    } else {
        format!("{:>3}. {} {}", position, checkbox(task), title)
    }
}

/// `3 total | 2 active | 1 completed`
pub fn format_counts(counts: &TaskCounts) -> String {
    format!(
        "{} total | {} active | {} completed",
        counts.total, counts.active, counts.completed
    )
}

/// Filter selectors with their counts, current one bracketed
pub fn format_filter_tabs(current: StatusFilter, counts: &TaskCounts) -> String {
    StatusFilter::ALL
        .iter()
        .map(|&f| {
            let tab = format!("{} {}", f.label(), counts.for_filter(f));
            if f == current {
                format!("[{}]", tab)
            } else {
                format!(" {} ", tab)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full listing for a view: counter line, then the numbered rows.
///
/// `total` is the size of the whole collection, so an empty collection
/// and a view that filters everything out read differently.
pub fn format_listing(
    rows: &[(usize, &Task)],
    counts: &TaskCounts,
    show_ids: bool,
    width: Option<usize>,
) -> Vec<String> {
    if counts.total == 0 {
        return EMPTY_STATE.iter().map(|s| s.to_string()).collect();
    }
    let mut lines = vec![format_counts(counts), String::new()];
    if rows.is_empty() {
        lines.push(NO_MATCHES.to_string());
    } else {
        for &(position, task) in rows {
            lines.push(format_task_line(position, task, show_ids, width));
        }
    }
    lines
}

/// Find a task by exact ID, else by 1-based position in `tasks`
pub fn resolve_task_ref<'a>(tasks: &'a [Task], task_ref: &str) -> Option<&'a Task> {
    let task_ref = task_ref.trim();
    if let Some(task) = tasks.iter().find(|t| t.id == task_ref) {
        return Some(task);
    }
    match task_ref.trim_start_matches('#').parse::<usize>() {
        Ok(pos) if pos >= 1 => tasks.get(pos - 1),
        _ => None,
    }
}

/// Parse a filter name into a StatusFilter
pub fn parse_status_filter(s: &str) -> Result<StatusFilter, String> {
    StatusFilter::parse_filter(s).ok_or_else(|| {
        format!(
            "unknown filter '{}' (expected: all, active, completed)",
            s
        )
    })
}
