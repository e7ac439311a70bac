//! Durable storage for the configured refresh rate.
//!
//! The interval is persisted as a single human-editable TOML record:
//!
//! ```toml
//! refresh-rate = "10:00"
//! ```
//!
//! Missing or malformed content is never an error on load — it reads as
//! absent, and [`IntervalStore::load_or_init`] falls back to the default
//! and writes it back.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SaveTickError;
use crate::interval::SaveInterval;

#[derive(Debug, Serialize, Deserialize)]
struct RefreshRecord {
    #[serde(rename = "refresh-rate")]
    refresh_rate: String,
}

/// File-backed read/write of the single [`SaveInterval`] value.
#[derive(Debug, Clone)]
pub struct IntervalStore {
    path: PathBuf,
}

impl IntervalStore {
    /// Create a store backed by the given file path.
    ///
    /// The file is not touched until [`load`](Self::load) or
    /// [`save`](Self::save) is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored interval.
    ///
    /// Returns `None` on a missing file, missing record, or malformed
    /// content — malformed input is logged and treated identically to
    /// absent, never surfaced as an error.
    pub fn load(&self) -> Option<SaveInterval> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read refresh-rate store");
                return None;
            }
        };

        let record: RefreshRecord = match toml::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "malformed refresh-rate store; treating as absent"
                );
                return None;
            }
        };

        match record.refresh_rate.parse::<SaveInterval>() {
            Ok(interval) => Some(interval),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unparseable refresh rate; treating as absent"
                );
                None
            }
        }
    }

    /// Persist the interval in canonical `M:SS` form.
    ///
    /// # Errors
    ///
    /// Returns [`SaveTickError::Store`] when the parent directory cannot be
    /// created or the file cannot be written.
    pub fn save(&self, interval: &SaveInterval) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SaveTickError::Store(format!("cannot create store dir: {e}")))?;
        }

        let record = RefreshRecord {
            refresh_rate: interval.to_string(),
        };
        let body = toml::to_string(&record)
            .map_err(|e| SaveTickError::Store(format!("cannot serialize refresh rate: {e}")))?;

        std::fs::write(&self.path, body)
            .map_err(|e| SaveTickError::Store(format!("cannot write refresh-rate store: {e}")))?;

        Ok(())
    }

    /// Stored interval, or the default (written back) when absent/corrupt.
    ///
    /// A failed write-back is a soft warning — the caller keeps operating on
    /// the in-memory default for the rest of the process lifetime.
    pub fn load_or_init(&self) -> SaveInterval {
        if let Some(interval) = self.load() {
            return interval;
        }

        let fallback = SaveInterval::default();
        if let Err(e) = self.save(&fallback) {
            warn!(error = %e, "cannot write default refresh rate; continuing with in-memory default");
        }
        fallback
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> IntervalStore {
        IntervalStore::new(dir.path().join("refresh.toml"))
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        store.save(&SaveInterval::new(2, 5)).expect("save");
        assert_eq!(store.load(), Some(SaveInterval::new(2, 5)));
    }

    #[test]
    fn stored_form_is_canonical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        store.save(&SaveInterval::new(0, 125)).expect("save");
        let raw = std::fs::read_to_string(store.path()).expect("read back");
        assert!(raw.contains("\"2:05\""), "raw content was: {raw}");
    }

    #[test]
    fn missing_file_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn malformed_toml_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(store.path(), "not toml at all [").expect("write");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn missing_record_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(store.path(), "other-key = \"1:00\"\n").expect("write");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn unparseable_rate_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(store.path(), "refresh-rate = \"a:b\"\n").expect("write");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn load_or_init_writes_back_the_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);

        assert_eq!(store.load_or_init(), SaveInterval::default());
        // The fallback must now be durable.
        assert_eq!(store.load(), Some(SaveInterval::default()));
    }

    #[test]
    fn load_or_init_replaces_corrupt_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        std::fs::write(store.path(), "refresh-rate = \"nonsense\"\n").expect("write");

        assert_eq!(store.load_or_init(), SaveInterval::default());
        assert_eq!(store.load(), Some(SaveInterval::default()));
    }

    #[test]
    fn save_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = IntervalStore::new(dir.path().join("nested/deeper/refresh.toml"));

        store.save(&SaveInterval::new(1, 30)).expect("save");
        assert_eq!(store.load(), Some(SaveInterval::new(1, 30)));
    }
}
