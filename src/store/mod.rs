//! The task collection store.
//!
//! [`TaskStore`] exclusively owns the task list and the transient view
//! selectors (status filter, search query). Front ends read through the
//! accessors and change state only through the mutation methods. Each
//! mutation that changes the list goes through [`TaskStore::commit`],
//! which writes the new list to the durable slot and then recomputes the
//! derived views.

use log::{debug, info};

use crate::io::kv::KeyValueStore;
use crate::io::slot::PersistentSlot;
use crate::model::filter::StatusFilter;
use crate::model::task::Task;
use crate::ops::task_ops;
use crate::ops::view::{self, TaskCounts};

pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    filter: StatusFilter,
    search: String,
    slot: PersistentSlot<S>,
    /// Filtered and searched list for the current selectors
    visible: Vec<Task>,
    counts: TaskCounts,
    last_persisted: bool,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load the task list from `slot` (empty when absent or unreadable)
    /// and write it back once.
    pub fn open(slot: PersistentSlot<S>) -> Self {
        let tasks: Vec<Task> = slot.load(Vec::new());
        info!(
            "event=store_open module=store status=ok key={} tasks={}",
            slot.key(),
            tasks.len()
        );
        let mut store = TaskStore {
            tasks,
            filter: StatusFilter::default(),
            search: String::new(),
            slot,
            visible: Vec::new(),
            counts: TaskCounts::default(),
            last_persisted: false,
        };
        store.last_persisted = store.slot.on_change(&store.tasks);
        store.refresh_views();
        store
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create an open task with a fresh ID and prepend it. The title is
    /// taken as given; validation belongs to the caller.
    pub fn add(&mut self, title: impl Into<String>) -> Task {
        let task = Task::new(title);
        self.add_task(task.clone());
        task
    }

    /// Prepend a caller-built task.
    pub fn add_task(&mut self, task: Task) {
        let next = task_ops::add_task(&self.tasks, task);
        self.commit(next);
    }

    /// Flip a task's completion flag. Returns false if no task has `id`.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        let next = task_ops::toggle_task(&self.tasks, id);
        self.commit(next);
        true
    }

    /// Remove a task. Returns false if no task has `id`.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        let next = task_ops::delete_task(&self.tasks, id);
        self.commit(next);
        true
    }

    /// Retitle a task. Skipped (returns false) when no task has `id`, or
    /// when the trimmed title is empty or equal to the current one.
    pub fn edit(&mut self, id: &str, new_title: &str) -> bool {
        let new_title = new_title.trim();
        match self.find(id) {
            Some(task) if !new_title.is_empty() && task.title != new_title => {}
            _ => return false,
        }
        let next = task_ops::edit_title(&self.tasks, id, new_title);
        self.commit(next);
        true
    }

    /// Remove every completed task. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let removed = self.counts.completed;
        if removed == 0 {
            return 0;
        }
        let next = task_ops::clear_completed(&self.tasks);
        self.commit(next);
        removed
    }

    // -----------------------------------------------------------------------
    // Transient selectors (never persisted)
    // -----------------------------------------------------------------------

    pub fn set_filter(&mut self, filter: StatusFilter) {
        if self.filter != filter {
            self.filter = filter;
            self.refresh_views();
        }
    }

    pub fn set_search(&mut self, query: &str) {
        if self.search != query {
            self.search = query.to_string();
            self.refresh_views();
        }
    }

    pub fn clear_search(&mut self) {
        self.set_search("");
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// The full collection, newest first
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks passing the current filter and search query
    pub fn visible(&self) -> &[Task] {
        &self.visible
    }

    pub fn counts(&self) -> TaskCounts {
        self.counts
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        task_ops::find_task(&self.tasks, id)
    }

    /// Whether the most recent write reached durable storage
    pub fn last_persisted(&self) -> bool {
        self.last_persisted
    }

    pub fn slot(&self) -> &PersistentSlot<S> {
        &self.slot
    }

    // -----------------------------------------------------------------------
    // Commit
    // -----------------------------------------------------------------------

    /// Install `next` as the collection, write it to the slot, then
    /// recompute views. A failed write is logged by the slot and leaves
    /// the in-memory list in place.
    fn commit(&mut self, next: Vec<Task>) {
        self.tasks = next;
        self.last_persisted = self.slot.on_change(&self.tasks);
        debug!(
            "event=store_commit module=store tasks={} persisted={}",
            self.tasks.len(),
            self.last_persisted
        );
        self.refresh_views();
    }

    fn refresh_views(&mut self) {
        self.visible = view::filter_and_search(&self.tasks, self.filter, &self.search);
        self.counts = view::task_counts(&self.tasks);
    }
}
