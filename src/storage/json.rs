//! JSON file-based record store.
//!
//! The collection lives in a single file named after the storage key
//! (`<data_dir>/<key>.json`). Writes go to a temporary sibling first and are
//! renamed into place so a crash never leaves a half-written array behind.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(n) - parses the whole array on every load
//! - **Write**: O(n) - re-reads and rewrites the whole array per append
//! - **Best for**: personal history sizes (thousands of records)

use crate::domain::error::{EcoBrowseError, Result};
use crate::domain::{sort_newest_first, ScoreRecord};
use crate::notifier::{ChangeKind, ChangeNotifier};
use crate::storage::backend::{LoadOutcome, RecordStore};
use crate::storage::models::{validate_entry, StoredEntry};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Default storage key for the visit history.
pub const DEFAULT_STORAGE_KEY: &str = "ecoBrowseReports";

/// JSON file record store.
///
/// Holds no in-memory copy: every operation goes to disk, so several stores
/// (in different processes) pointing at the same file observe each other's
/// writes on their next load.
///
/// # File Format
///
/// ```json
/// [
///   { "timestamp": 1721577600000, "websiteUrl": "https://a.com", "carbonScore": 0.9 },
///   { "timestamp": 1721581200000, "websiteUrl": "https://b.com", "carbonScore": 0.3 }
/// ]
/// ```
#[derive(Debug)]
pub struct JsonRecordStore {
    /// Storage key; also the file stem.
    key: String,

    /// Path to the JSON file on disk.
    file_path: PathBuf,

    /// Channel on which successful writes are announced.
    notifier: ChangeNotifier,
}

impl JsonRecordStore {
    /// Opens the default-keyed store inside `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(data_dir: impl AsRef<Path>, notifier: ChangeNotifier) -> Result<Self> {
        Self::with_key(data_dir, DEFAULT_STORAGE_KEY, notifier)
    }

    /// Opens a store scoped by `key` inside `data_dir`.
    ///
    /// The data directory is created if missing; the file itself is only created
    /// by the first append.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unusable as a file name or the data
    /// directory cannot be created.
    pub fn with_key(
        data_dir: impl AsRef<Path>,
        key: impl Into<String>,
        notifier: ChangeNotifier,
    ) -> Result<Self> {
        let key = key.into();
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(EcoBrowseError::Config(format!("invalid storage key: {key:?}")));
        }

        let data_dir = data_dir.as_ref();
        tracing::debug!(path = ?data_dir, key = %key, "initializing JSON record store");
        std::fs::create_dir_all(data_dir)?;

        Ok(Self {
            file_path: data_dir.join(format!("{key}.json")),
            key,
            notifier,
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Reads and validates the persisted array.
    ///
    /// Returns `Ok(None)` when no file exists. Entries that do not match the
    /// persisted shape are dropped and logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array.
    fn read_entries(&self) -> Result<Option<Vec<StoredEntry>>> {
        let contents = match std::fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }

        let values: Vec<serde_json::Value> = serde_json::from_str(&contents)
            .map_err(|e| EcoBrowseError::Storage(format!("failed to parse JSON: {e}")))?;

        let total = values.len();
        let entries: Vec<StoredEntry> = values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match validate_entry(value) {
                Ok(entry) => Some(entry),
                Err(reason) => {
                    tracing::warn!(index, reason = %reason, "dropping non-conforming entry");
                    None
                }
            })
            .collect();

        tracing::debug!(total, kept = entries.len(), "read persisted entries");
        Ok(Some(entries))
    }

    /// Writes the full collection atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, the temporary write, or the rename fails.
    fn write_entries(&self, entries: &[StoredEntry]) -> Result<()> {
        let json = serde_json::to_string(entries)
            .map_err(|e| EcoBrowseError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.temp_path();

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;

        tracing::trace!("renaming temporary file to final location");
        if let Err(e) = std::fs::rename(&tmp_path, &self.file_path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Temporary sibling, unique per process and write.
    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.file_path
            .with_extension(format!("json.{}.{seq}.tmp", std::process::id()))
    }
}

/// Converts persisted entries to newest-first domain records.
fn into_sorted_records(entries: Vec<StoredEntry>) -> Vec<ScoreRecord> {
    let mut records: Vec<ScoreRecord> = entries.into_iter().map(ScoreRecord::from).collect();
    sort_newest_first(&mut records);
    records
}

impl RecordStore for JsonRecordStore {
    fn load(&self) -> LoadOutcome {
        let _span = tracing::debug_span!("json_load", key = %self.key).entered();

        match self.read_entries() {
            Ok(Some(entries)) => {
                let records = into_sorted_records(entries);
                tracing::debug!(record_count = records.len(), "records loaded");
                LoadOutcome::ok(records)
            }
            Ok(None) => {
                tracing::debug!("no persisted entry, starting empty");
                LoadOutcome::ok(Vec::new())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load records");
                LoadOutcome::degraded(e)
            }
        }
    }

    fn append(&self, record: &ScoreRecord) -> Result<()> {
        let _span = tracing::debug_span!("json_append",
            key = %self.key,
            website_url = %record.website_url,
            timestamp = record.timestamp
        )
        .entered();

        if !record.is_valid() {
            return Err(EcoBrowseError::InvalidRecord(format!(
                "refusing to persist {} with score {}",
                record.website_url, record.score
            )));
        }

        let mut entries = self.read_entries()?.unwrap_or_default();
        entries.push(StoredEntry::from(record));
        self.write_entries(&entries)?;

        let snapshot = into_sorted_records(entries);
        tracing::debug!(record_count = snapshot.len(), "record appended");
        self.notifier.publish(ChangeKind::Updated { snapshot });
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let _span = tracing::debug_span!("json_clear", key = %self.key).entered();

        match std::fs::remove_file(&self.file_path) {
            Ok(()) => tracing::debug!("persisted entry removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("nothing to clear");
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to clear records");
                return Err(e.into());
            }
        }

        self.notifier.publish(ChangeKind::Cleared);
        Ok(())
    }

    fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> (JsonRecordStore, ChangeNotifier) {
        let notifier = ChangeNotifier::default();
        let store = JsonRecordStore::new(dir.path(), notifier.clone()).unwrap();
        (store, notifier)
    }

    #[test]
    fn missing_file_loads_empty_without_error() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store(&dir);
        let outcome = store.load();
        assert!(outcome.records.is_empty());
        assert!(outcome.error.is_none());
    }

    #[test]
    fn file_is_named_after_key() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store(&dir);
        assert_eq!(store.file_path(), dir.path().join("ecoBrowseReports.json"));
    }

    #[test]
    fn malformed_payload_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store(&dir);
        std::fs::write(store.file_path(), "{not json").unwrap();

        let outcome = store.load();
        assert!(outcome.records.is_empty());
        assert!(matches!(outcome.error, Some(EcoBrowseError::Storage(_))));
    }

    #[test]
    fn non_array_payload_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store(&dir);
        std::fs::write(store.file_path(), r#"{"timestamp": 1}"#).unwrap();

        let outcome = store.load();
        assert!(outcome.records.is_empty());
        assert!(outcome.error.is_some());
    }

    #[test]
    fn drops_non_conforming_entries() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store(&dir);
        std::fs::write(
            store.file_path(),
            r#"[
                {"timestamp": 2, "websiteUrl": "https://ok.com", "carbonScore": 0.4},
                {"timestamp": 3, "websiteUrl": 17, "carbonScore": 0.4},
                {"timestamp": 4, "carbonScore": 0.4},
                "garbage"
            ]"#,
        )
        .unwrap();

        let outcome = store.load();
        assert!(outcome.error.is_none());
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].website_url, "https://ok.com");
    }

    #[test]
    fn append_refuses_to_overwrite_malformed_payload() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store(&dir);
        std::fs::write(store.file_path(), "oops").unwrap();

        let record = ScoreRecord::new(1, "https://a.com", 0.5).unwrap();
        assert!(store.append(&record).is_err());
        assert_eq!(std::fs::read_to_string(store.file_path()).unwrap(), "oops");
    }

    #[test]
    fn append_rejects_invalid_record() {
        let dir = TempDir::new().unwrap();
        let (store, notifier) = store(&dir);
        let mut subscription = notifier.subscribe();

        let record = ScoreRecord {
            timestamp: 1,
            website_url: "https://a.com".to_string(),
            score: 3.0,
        };
        assert!(matches!(store.append(&record), Err(EcoBrowseError::InvalidRecord(_))));
        assert!(!store.file_path().exists());
        assert!(subscription.try_next().is_none());
    }

    #[test]
    fn append_publishes_newest_first_snapshot() {
        let dir = TempDir::new().unwrap();
        let (store, notifier) = store(&dir);
        let mut subscription = notifier.subscribe();

        store.append(&ScoreRecord::new(10, "https://old.com", 0.2).unwrap()).unwrap();
        store.append(&ScoreRecord::new(20, "https://new.com", 0.8).unwrap()).unwrap();

        let events = subscription.drain();
        assert_eq!(events.len(), 2);
        let snapshot = events[1].kind.snapshot().unwrap();
        assert_eq!(snapshot[0].website_url, "https://new.com");
        assert_eq!(snapshot[1].website_url, "https://old.com");
    }

    #[test]
    fn no_temporary_file_left_after_write() {
        let dir = TempDir::new().unwrap();
        let (store, _) = store(&dir);
        store.append(&ScoreRecord::new(1, "https://a.com", 0.5).unwrap()).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["ecoBrowseReports.json"]);
    }

    #[test]
    fn concurrent_writers_never_fail_on_rename() {
        let dir = TempDir::new().unwrap();
        let writers: Vec<_> = (0..4)
            .map(|_| JsonRecordStore::new(dir.path(), ChangeNotifier::default()).unwrap())
            .collect();

        std::thread::scope(|scope| {
            for (i, store) in writers.iter().enumerate() {
                scope.spawn(move || {
                    for n in 0..25 {
                        let record = ScoreRecord::new(n, format!("https://w{i}.com"), 0.5).unwrap();
                        store.append(&record).unwrap();
                    }
                });
            }
        });

        // Last writer wins: records may be lost, but the file stays readable.
        let outcome = writers[0].load();
        assert!(outcome.error.is_none());
        assert!(!outcome.records.is_empty());
    }

    #[test]
    fn clear_on_missing_file_still_publishes() {
        let dir = TempDir::new().unwrap();
        let (store, notifier) = store(&dir);
        let mut subscription = notifier.subscribe();

        store.clear().unwrap();
        let event = subscription.try_next().unwrap();
        assert!(event.kind.is_cleared());
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let notifier = ChangeNotifier::default();
        assert!(JsonRecordStore::with_key(dir.path(), "../escape", notifier.clone()).is_err());
        assert!(JsonRecordStore::with_key(dir.path(), "", notifier).is_err());
    }
}
