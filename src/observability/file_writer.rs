//! Size-rotated line writer for exported trace batches.
//!
//! The live file is `<path>`; rotated generations are `<path>.1` (newest) up to
//! `<path>.<backups>` (oldest). Rotation shifts every generation up by one and
//! drops whatever falls off the end.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Default size of the live file before it is rotated (10 MiB).
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated generations kept.
pub const DEFAULT_BACKUPS: usize = 3;

/// When to rotate and how many generations to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            backups: DEFAULT_BACKUPS,
        }
    }
}

/// Thread-safe append-only writer with size-based rotation.
///
/// The file handle is opened lazily so constructing a writer for an unwritable
/// location does not fail until something is actually exported.
pub struct RotatingFileWriter {
    path: PathBuf,
    policy: RotationPolicy,
    file: Mutex<Option<File>>,
}

impl RotatingFileWriter {
    #[must_use]
    pub const fn new(path: PathBuf, policy: RotationPolicy) -> Self {
        Self {
            path,
            policy,
            file: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline, rotating first if the live file is full.
    ///
    /// # Errors
    ///
    /// Returns an error if rotation, opening, or writing fails.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);

        let full = fs::metadata(&self.path).is_ok_and(|m| m.len() >= self.policy.max_bytes);
        if full {
            *file = None;
            self.rotate()?;
        }

        if file.is_none() {
            *file = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        let Some(handle) = file.as_mut() else {
            return Err(io::Error::other("trace file unavailable"));
        };

        writeln!(handle, "{line}")?;
        handle.flush()
    }

    fn generation(&self, n: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{n}"));
        PathBuf::from(name)
    }

    fn rotate(&self) -> io::Result<()> {
        if self.policy.backups == 0 {
            return remove_if_exists(&self.path);
        }

        remove_if_exists(&self.generation(self.policy.backups))?;
        for n in (1..self.policy.backups).rev() {
            let from = self.generation(n);
            if from.exists() {
                fs::rename(&from, self.generation(n + 1))?;
            }
        }
        if self.path.exists() {
            fs::rename(&self.path, self.generation(1))?;
        }
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

impl std::fmt::Debug for RotatingFileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileWriter")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn appends_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.json");
        let writer = RotatingFileWriter::new(path.clone(), RotationPolicy::default());

        writer.write_line("one").unwrap();
        writer.write_line("two").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn rotates_and_keeps_bounded_generations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.json");
        let policy = RotationPolicy {
            max_bytes: 4,
            backups: 2,
        };
        let writer = RotatingFileWriter::new(path.clone(), policy);

        for line in ["aaaa", "bbbb", "cccc", "dddd"] {
            writer.write_line(line).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "dddd\n");
        assert_eq!(fs::read_to_string(dir.path().join("trace.json.1")).unwrap(), "cccc\n");
        assert_eq!(fs::read_to_string(dir.path().join("trace.json.2")).unwrap(), "bbbb\n");
        assert!(!dir.path().join("trace.json.3").exists());
    }

    #[test]
    fn zero_backups_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.json");
        let writer = RotatingFileWriter::new(
            path.clone(),
            RotationPolicy {
                max_bytes: 1,
                backups: 0,
            },
        );
        writer.write_line("first").unwrap();
        writer.write_line("second").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "second\n");
    }
}
