//! TaskHive: a task list held in one durable key-value slot, with
//! status filtering, title search, and counts.
//!
//! [`store::TaskStore`] owns the list; [`io::slot::PersistentSlot`]
//! binds it to a [`io::kv::KeyValueStore`]; [`ops`] holds the pure list
//! transformations, view derivation, and title validation that the
//! store and front ends share.

pub mod cli;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod store;
pub mod util;
