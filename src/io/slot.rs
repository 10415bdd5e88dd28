//! Binding of one value to one named slot of a [`KeyValueStore`].
//!
//! Loading never fails: an empty, unreadable, or undecodable slot yields
//! the caller's default. Writing never fails either: errors are logged and
//! reported as `false`, and the caller's in-memory value stays the source
//! of truth.

use log::{debug, error, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::kv::{KeyValueStore, StorageError};
use crate::model::task::Task;

/// A named slot in a key-value store
#[derive(Debug)]
pub struct PersistentSlot<S> {
    key: String,
    store: S,
}

impl<S: KeyValueStore> PersistentSlot<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        PersistentSlot {
            key: key.into(),
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Read and decode the slot, falling back to `default`.
    pub fn load<T: DeserializeOwned>(&self, default: T) -> T {
        match self.store.get_item(&self.key) {
            Ok(None) => {
                debug!("event=slot_load module=slot status=empty key={}", self.key);
                default
            }
            Ok(Some(raw)) => match decode(&raw) {
                Ok(value) => {
                    debug!("event=slot_load module=slot status=ok key={}", self.key);
                    value
                }
                Err(e) => {
                    warn!(
                        "event=slot_load module=slot status=fallback key={} reason=decode error={}",
                        self.key, e
                    );
                    default
                }
            },
            Err(e) => {
                warn!(
                    "event=slot_load module=slot status=fallback key={} reason=store error={}",
                    self.key, e
                );
                default
            }
        }
    }

    /// Encode and write `value` to the slot. Returns whether the write
    /// reached the store.
    pub fn on_change<T: Serialize + ?Sized>(&mut self, value: &T) -> bool {
        match self.try_write(value) {
            Ok(()) => {
                debug!("event=slot_write module=slot status=ok key={}", self.key);
                true
            }
            Err(e) => {
                error!(
                    "event=slot_write module=slot status=error key={} error={}",
                    self.key, e
                );
                false
            }
        }
    }

    fn try_write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), StorageError> {
        let encoded = encode(value)?;
        self.store.set_item(&self.key, &encoded)
    }
}

/// Slot format: compact JSON
fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Encode a task list exactly as [`PersistentSlot::on_change`] writes it
pub fn encode_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    encode(tasks)
}

/// Decode a task list exactly as [`PersistentSlot::load`] reads it
pub fn decode_tasks(raw: &str) -> Result<Vec<Task>, serde_json::Error> {
    decode(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::kv::MemoryStore;

    fn slot_with(raw: Option<&str>) -> PersistentSlot<MemoryStore> {
        let mut store = MemoryStore::new();
        if let Some(raw) = raw {
            store.set_item("tasks", raw).unwrap();
        }
        PersistentSlot::new(store, "tasks")
    }

    #[test]
    fn load_empty_slot_returns_default() {
        let slot = slot_with(None);
        let tasks: Vec<Task> = slot.load(Vec::new());
        assert!(tasks.is_empty());
    }

    #[test]
    fn load_malformed_slot_returns_default() {
        let slot = slot_with(Some("[{\"id\": 1,"));
        let tasks: Vec<Task> = slot.load(vec![Task::with_id("d", "default")]);
        assert_eq!(tasks, vec![Task::with_id("d", "default")]);
    }

    #[test]
    fn load_wrong_shape_returns_default() {
        let slot = slot_with(Some(r#"{"tasks": []}"#));
        let tasks: Vec<Task> = slot.load(Vec::new());
        assert!(tasks.is_empty());
    }

    #[test]
    fn on_change_then_load_round_trips() {
        let mut slot = slot_with(None);
        let tasks = vec![Task::with_id("a", "one"), Task::with_id("b", "two").toggled()];
        assert!(slot.on_change(&tasks));
        let loaded: Vec<Task> = slot.load(Vec::new());
        assert_eq!(loaded, tasks);
    }

    #[test]
    fn on_change_reports_quota_failure() {
        let mut slot = PersistentSlot::new(MemoryStore::with_quota(16), "tasks");
        let tasks = vec![Task::with_id("a", "a title long enough to overflow")];
        assert!(!slot.on_change(&tasks));
        assert_eq!(slot.store().get_item("tasks").unwrap(), None);
    }

    #[test]
    fn on_change_writes_encode_tasks_output() {
        let mut slot = slot_with(None);
        let tasks = vec![
            Task::with_id("b", "Walk \"the\" dog").toggled(),
            Task::with_id("a", "Ölwechsel"),
        ];
        assert!(slot.on_change(&tasks));
        let raw = slot.store().get_item("tasks").unwrap().unwrap();
        assert_eq!(raw, encode_tasks(&tasks).unwrap());
        assert_eq!(decode_tasks(&raw).unwrap(), tasks);
    }

    #[test]
    fn slot_encoding_uses_plain_field_names() {
        let raw = encode_tasks(&[Task::with_id("a", "Buy milk")]).unwrap();
        assert_eq!(raw, r#"[{"id":"a","title":"Buy milk","completed":false}]"#);
        assert_eq!(decode_tasks(&raw).unwrap()[0].title, "Buy milk");
    }
}
