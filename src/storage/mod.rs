//! Storage layer for the persisted score history.
//!
//! The store is the one shared mutable resource in the system. It is scoped by a
//! single storage key, validates the persisted shape on every read, and announces
//! each successful write on the injected [`ChangeNotifier`](crate::notifier::ChangeNotifier).
//!
//! # Modules
//!
//! - `backend`: [`RecordStore`] trait and the fail-soft [`LoadOutcome`]
//! - `json`: JSON file implementation with atomic writes
//! - `models`: Persisted entry shape and schema validation

pub mod backend;
pub mod json;
pub mod models;

pub use backend::{LoadOutcome, RecordStore};
pub use json::{JsonRecordStore, DEFAULT_STORAGE_KEY};
pub use models::{validate_entry, EntryRejection, StoredEntry};
