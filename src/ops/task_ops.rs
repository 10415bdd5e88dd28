//! Pure transformations of a task list.
//!
//! Every function takes the current list by reference and returns the
//! next one. Tasks are never edited in place; a changed task is a new
//! value built from the old one. Unknown IDs leave the list as it was.

use crate::model::task::Task;

/// Prepend a task (newest first).
pub fn add_task(tasks: &[Task], task: Task) -> Vec<Task> {
    let mut next = Vec::with_capacity(tasks.len() + 1);
    next.push(task);
    next.extend_from_slice(tasks);
    next
}

/// Flip the completion flag of the task with `task_id`.
pub fn toggle_task(tasks: &[Task], task_id: &str) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| if t.id == task_id { t.toggled() } else { t.clone() })
        .collect()
}

/// Remove the task with `task_id`.
pub fn delete_task(tasks: &[Task], task_id: &str) -> Vec<Task> {
    tasks.iter().filter(|t| t.id != task_id).cloned().collect()
}

/// Replace the title of the task with `task_id`.
pub fn edit_title(tasks: &[Task], task_id: &str, new_title: &str) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            if t.id == task_id {
                t.retitled(new_title)
            } else {
                t.clone()
            }
        })
        .collect()
}

/// Remove every completed task.
pub fn clear_completed(tasks: &[Task]) -> Vec<Task> {
    tasks.iter().filter(|t| !t.completed).cloned().collect()
}

/// Find a task by ID.
pub fn find_task<'a>(tasks: &'a [Task], task_id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == task_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::with_id("t3", "Walk dog"),
            Task::with_id("t2", "Pay rent").toggled(),
            Task::with_id("t1", "Buy milk"),
        ]
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_add_prepends() {
        let tasks = add_task(&sample_tasks(), Task::with_id("t4", "Call mom"));
        assert_eq!(
            titles(&tasks),
            vec!["Call mom", "Walk dog", "Pay rent", "Buy milk"]
        );
    }

    #[test]
    fn test_add_to_empty() {
        let tasks = add_task(&[], Task::with_id("t1", "Buy milk"));
        assert_eq!(tasks, vec![Task::with_id("t1", "Buy milk")]);
    }

    #[test]
    fn test_toggle_in_place() {
        let before = sample_tasks();
        let after = toggle_task(&before, "t1");
        assert!(after[2].completed);
        assert_eq!(titles(&after), titles(&before));
        // Source list untouched
        assert!(!before[2].completed);
    }

    #[test]
    fn test_toggle_unknown_is_noop() {
        let before = sample_tasks();
        assert_eq!(toggle_task(&before, "nope"), before);
    }

    #[test]
    fn test_delete() {
        let after = delete_task(&sample_tasks(), "t2");
        assert_eq!(titles(&after), vec!["Walk dog", "Buy milk"]);
        assert_eq!(delete_task(&after, "t2"), after);
    }

    #[test]
    fn test_edit_title_keeps_position_and_state() {
        let after = edit_title(&sample_tasks(), "t2", "Pay the rent");
        assert_eq!(after[1].title, "Pay the rent");
        assert_eq!(after[1].id, "t2");
        assert!(after[1].completed);
        assert_eq!(after.len(), 3);
    }

    #[test]
    fn test_edit_unknown_is_noop() {
        let before = sample_tasks();
        assert_eq!(edit_title(&before, "nope", "x"), before);
    }

    #[test]
    fn test_clear_completed() {
        let after = clear_completed(&sample_tasks());
        assert_eq!(titles(&after), vec!["Walk dog", "Buy milk"]);
        assert_eq!(clear_completed(&after), after);
    }

    #[test]
    fn test_find_task() {
        let tasks = sample_tasks();
        assert_eq!(find_task(&tasks, "t2").map(|t| t.title.as_str()), Some("Pay rent"));
        assert!(find_task(&tasks, "t9").is_none());
    }
}
