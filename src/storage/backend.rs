//! Record store abstraction.
//!
//! This module defines the [`RecordStore`] trait that abstracts over persistence
//! backends for the score history. The trait is deliberately small: it mirrors
//! the three operations the rest of the system needs (load, append, clear) and
//! nothing more.

use crate::domain::error::{EcoBrowseError, Result};
use crate::domain::ScoreRecord;

/// Result of a fail-soft load.
///
/// `records` is always usable. When the persisted payload could not be read or
/// parsed, `records` is empty and `error` describes what went wrong so the caller
/// can tell the user without treating it as fatal.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Persisted records, newest-first by timestamp.
    pub records: Vec<ScoreRecord>,

    /// Recoverable problem encountered while loading, if any.
    pub error: Option<EcoBrowseError>,
}

impl LoadOutcome {
    /// A clean load.
    #[must_use]
    pub const fn ok(records: Vec<ScoreRecord>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    /// A failed load, degraded to an empty collection.
    #[must_use]
    pub const fn degraded(error: EcoBrowseError) -> Self {
        Self {
            records: Vec::new(),
            error: Some(error),
        }
    }

    /// Returns the records, discarding any recoverable error after logging it.
    #[must_use]
    pub fn into_records(self) -> Vec<ScoreRecord> {
        if let Some(error) = &self.error {
            tracing::warn!(error = %error, "using empty record set after load failure");
        }
        self.records
    }
}

/// Abstraction over persistent score-history backends.
///
/// Implementations own the persisted collection exclusively and publish a change
/// event after every successful write.
///
/// # Implementations
///
/// - [`JsonRecordStore`](crate::storage::JsonRecordStore): one JSON file per
///   storage key, written atomically
///
/// # Examples
///
/// ```no_run
/// use ecobrowse::notifier::ChangeNotifier;
/// use ecobrowse::storage::{JsonRecordStore, RecordStore};
/// use ecobrowse::ScoreRecord;
///
/// let notifier = ChangeNotifier::default();
/// let store = JsonRecordStore::new("/tmp/ecobrowse", notifier.clone())?;
/// store.append(&ScoreRecord::now("https://example.com", 0.7)?)?;
/// let history = store.load().into_records();
/// # Ok::<(), ecobrowse::EcoBrowseError>(())
/// ```
pub trait RecordStore: Send {
    /// Reads the full persisted collection, newest-first.
    ///
    /// Never fails: absence of data yields an empty collection, and unreadable or
    /// malformed data yields an empty collection with [`LoadOutcome::error`] set.
    fn load(&self) -> LoadOutcome;

    /// Appends one record by rewriting the full collection.
    ///
    /// Concurrent writers race with last-writer-wins semantics. On success an
    /// `Updated` change is published.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is invalid, the existing payload cannot be
    /// parsed, or the write fails. Nothing is published on failure.
    fn append(&self, record: &ScoreRecord) -> Result<()>;

    /// Removes every persisted record.
    ///
    /// On success a `Cleared` change is published.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted entry exists but cannot be removed.
    fn clear(&self) -> Result<()>;

    /// Storage key scoping this collection.
    fn key(&self) -> &str;
}
