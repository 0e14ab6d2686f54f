pub mod diff;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use atomic_write_file::AtomicWriteFile;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics::MetricsRecord;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to write snapshot file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One user's persisted result set from a previous run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// RFC 3339 timestamp of the run that produced `data`
    pub timestamp: String,
    /// The records as displayed by that run, in display order
    pub data: Vec<MetricsRecord>,
}

/// The whole snapshot document: one entry per user. Loaded once at the
/// start of a run and written back once at the end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    users: BTreeMap<String, Snapshot>,
}

impl History {
    pub fn get(&self, user: &str) -> Option<&Snapshot> {
        self.users.get(user)
    }

    /// Replace `user`'s snapshot with `records`, stamped with the current
    /// time. Other users' entries are untouched.
    pub fn record(&mut self, user: &str, records: Vec<MetricsRecord>) {
        self.users.insert(
            user.to_string(),
            Snapshot {
                timestamp: Utc::now().to_rfc3339(),
                data: records,
            },
        );
    }
}

/// File-backed store for the snapshot document. The store owns the on-disk
/// representation; nothing else reads or writes the file.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the snapshot document. A missing file is an empty history; a
    /// present but malformed file is logged and treated as empty rather
    /// than failing the run.
    pub fn load(&self) -> History {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return History::default(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "could not read snapshot file, starting with empty history");
                return History::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(history) => history,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "snapshot file is not valid JSON, starting with empty history");
                History::default()
            }
        }
    }

    /// Write the snapshot document atomically, so a crash mid-write never
    /// leaves a corrupted file behind.
    pub fn save(&self, history: &History) -> Result<(), HistoryError> {
        let mut file = AtomicWriteFile::open(&self.path)?;
        serde_json::to_writer_pretty(&mut file, history)?;
        file.commit()?;
        debug!(path = %self.path.display(), users = history.users.len(), "saved snapshot file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(number: u64, comments: u64) -> MetricsRecord {
        MetricsRecord {
            number,
            title: format!("PR {number}"),
            days_open: 4,
            files_changed: 2,
            commits: 1,
            file_types: "rs".to_string(),
            comments,
        }
    }

    fn temp_store(name: &str) -> SnapshotStore {
        let path = std::env::temp_dir().join(name);
        let _ = fs::remove_file(&path);
        SnapshotStore::new(path)
    }

    #[test]
    fn test_load_missing_file_returns_empty() {
        let store = temp_store("pr_pulse_test_missing.json");
        let history = store.load();
        assert!(history.get("alice").is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let store = temp_store("pr_pulse_test_roundtrip.json");

        let mut history = store.load();
        history.record("alice", vec![record(1, 2), record(2, 0)]);
        store.save(&history).unwrap();

        let loaded = store.load();
        let snapshot = loaded.get("alice").unwrap();
        assert_eq!(snapshot.data, vec![record(1, 2), record(2, 0)]);
        assert!(!snapshot.timestamp.is_empty());

        let _ = fs::remove_file(std::env::temp_dir().join("pr_pulse_test_roundtrip.json"));
    }

    #[test]
    fn test_save_preserves_other_users() {
        let store = temp_store("pr_pulse_test_other_users.json");

        let mut history = store.load();
        history.record("alice", vec![record(1, 2)]);
        store.save(&history).unwrap();

        let mut history = store.load();
        history.record("bob", vec![record(9, 5)]);
        store.save(&history).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.get("alice").unwrap().data, vec![record(1, 2)]);
        assert_eq!(loaded.get("bob").unwrap().data, vec![record(9, 5)]);

        let _ = fs::remove_file(std::env::temp_dir().join("pr_pulse_test_other_users.json"));
    }

    #[test]
    fn test_record_replaces_previous_snapshot() {
        let mut history = History::default();
        history.record("alice", vec![record(1, 2)]);
        history.record("alice", vec![record(3, 0)]);
        assert_eq!(history.get("alice").unwrap().data, vec![record(3, 0)]);
    }

    #[test]
    fn test_malformed_file_treated_as_empty() {
        let path = std::env::temp_dir().join("pr_pulse_test_malformed.json");
        fs::write(&path, "{not json").unwrap();

        let store = SnapshotStore::new(&path);
        let history = store.load();
        assert!(history.get("alice").is_none());

        let _ = fs::remove_file(&path);
    }
}
