//! Polling bridge that turns external writes into local change events.
//!
//! Processes share nothing but the persisted file, so a view in one process
//! cannot see another process's publications directly. [`StoreWatcher`] checks
//! the file's metadata on each poll and republishes any difference on the local
//! [`ChangeNotifier`].

use super::hub::ChangeNotifier;
use super::messages::ChangeKind;
use crate::domain::error::Result;
use crate::storage::RecordStore;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Observable fingerprint of the persisted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileState {
    Absent,
    Present { len: u64, modified: Option<SystemTime> },
}

impl FileState {
    fn read(path: &Path) -> Self {
        std::fs::metadata(path).map_or(Self::Absent, |metadata| Self::Present {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

/// Detects changes to a store's backing file between polls.
#[derive(Debug)]
pub struct StoreWatcher {
    path: PathBuf,
    last: FileState,
}

impl StoreWatcher {
    /// Starts watching `path`, treating its current state as already seen.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last = FileState::read(&path);
        Self { path, last }
    }

    /// Checks the file once; on change, reloads `store` and publishes the result.
    ///
    /// A vanished file is published as [`ChangeKind::Cleared`]; anything else as
    /// [`ChangeKind::Updated`] carrying the freshly loaded snapshot. Returns
    /// whether a change was published.
    ///
    /// # Errors
    ///
    /// Returns the load error when the changed file cannot be read. Nothing is
    /// published and the change stays pending, so the next poll retries.
    pub fn poll(&mut self, store: &dyn RecordStore, notifier: &ChangeNotifier) -> Result<bool> {
        let current = FileState::read(&self.path);
        if current == self.last {
            return Ok(false);
        }

        let _span = tracing::debug_span!("store_watch_change", path = ?self.path).entered();

        let kind = match current {
            FileState::Absent => ChangeKind::Cleared,
            FileState::Present { .. } => {
                let outcome = store.load();
                if let Some(error) = outcome.error {
                    tracing::warn!(error = %error, "changed store could not be read");
                    return Err(error);
                }
                ChangeKind::Updated {
                    snapshot: outcome.records,
                }
            }
        };
        self.last = current;
        notifier.publish(kind);
        Ok(true)
    }
}
