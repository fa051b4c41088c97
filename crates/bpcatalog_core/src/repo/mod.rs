//! Repository layer for persisted local state.
//!
//! # Responsibility
//! - Define the key/value contract that replaces browser storage.
//! - Isolate SQLite query details from the store.
//!
//! # Invariants
//! - One value per key; writes replace the previous value.

pub mod local_state;
