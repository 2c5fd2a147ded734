//! JSON array file store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, error, info};

use super::{write_atomic, HistoryStore, LockGuard};
use crate::error::{Error, Result};
use crate::evaluation::EvaluationResult;
use crate::export;

/// History kept as one pretty-printed JSON array.
///
/// Every append reads the whole file, pushes the new result and writes the
/// whole file back. The cycle runs while holding `<file>.lock`, and the write
/// is an atomic rename, so concurrent writers queue up instead of dropping
/// each other's results and readers never see a half-written file.
#[derive(Debug)]
pub struct JsonFileStore {
    /// Path to the history file.
    path: PathBuf,
    /// Path to the lock file guarding appends.
    lock_path: PathBuf,
    /// How long an append waits for the lock.
    lock_timeout: Duration,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file is created on first append.
    #[must_use]
    pub fn new(path: impl AsRef<Path>, lock_timeout: Duration) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut lock_name = path.as_os_str().to_owned();
        lock_name.push(".lock");
        Self {
            lock_path: PathBuf::from(lock_name),
            path,
            lock_timeout,
        }
    }

    /// Get the path to the history file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the path to the lock file.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    fn read_history(&self) -> Result<Vec<EvaluationResult>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No history at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        // `null` is what an empty history serialized by older writers looks like.
        match serde_json::from_slice::<Option<Vec<EvaluationResult>>>(&bytes) {
            Ok(history) => Ok(history.unwrap_or_default()),
            Err(source) => {
                error!(
                    "Result history at {} is unreadable: {}",
                    self.path.display(),
                    source
                );
                Err(Error::CorruptHistory {
                    path: self.path.clone(),
                    source,
                })
            }
        }
    }
}

impl HistoryStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json"
    }

    fn append(&self, result: &EvaluationResult) -> Result<()> {
        let _guard = LockGuard::acquire(&self.lock_path, self.lock_timeout)?;

        let mut history = self.read_history()?;
        history.push(result.clone());
        write_atomic(&self.path, &export::to_json(&history)?)?;

        info!(
            "Recorded evaluation #{} in {}",
            history.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<EvaluationResult>> {
        self.read_history()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::survey::SurveyResponse;

    fn create_test_store(dir: &Path) -> JsonFileStore {
        JsonFileStore::new(dir.join("sus_results.json"), Duration::from_secs(5))
    }

    fn create_test_result(answer: i32) -> EvaluationResult {
        EvaluationResult::record(SurveyResponse::unchecked([answer; 10]))
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_test_store(dir.path());

        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_append_and_load_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_test_store(dir.path());

        for answer in 1..=5 {
            store.append(&create_test_result(answer)).unwrap();
        }

        let history = store.load_all().unwrap();
        assert_eq!(history.len(), 5);
        for (index, result) in history.iter().enumerate() {
            let expected = i32::try_from(index).unwrap() + 1;
            assert_eq!(result.responses.get(1), Some(expected));
        }
        assert!(!store.lock_path().exists());
    }

    #[test]
    fn test_file_is_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_test_store(dir.path());
        store.append(&create_test_result(3)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["score"], 50.0);
        assert_eq!(entries[0]["responses"]["q4"], 3);
    }

    #[test]
    fn test_empty_and_null_files_are_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_test_store(dir.path());

        std::fs::write(store.path(), "").unwrap();
        assert!(store.load_all().unwrap().is_empty());

        std::fs::write(store.path(), "null").unwrap();
        assert!(store.load_all().unwrap().is_empty());

        store.append(&create_test_result(4)).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = create_test_store(dir.path());
        std::fs::write(store.path(), "[{\"timestamp\": ").unwrap();

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, Error::CorruptHistory { .. }));

        let err = store.append(&create_test_result(3)).unwrap_err();
        assert!(matches!(err, Error::CorruptHistory { .. }));
        // The corrupt file is left untouched for inspection.
        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            "[{\"timestamp\": "
        );
    }

    #[test]
    fn test_append_times_out_when_locked() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("h.json"), Duration::from_millis(50));
        let _held = LockGuard::acquire(store.lock_path(), Duration::from_millis(50)).unwrap();

        let err = store.append(&create_test_result(3)).unwrap_err();
        assert!(matches!(err, Error::LockTimeout { .. }));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_lock_left_by_exited_process_does_not_block_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("h.json"), Duration::from_millis(200));

        let mut child = std::process::Command::new("true").spawn().unwrap();
        let exited = child.id();
        child.wait().unwrap();
        std::fs::write(store.lock_path(), format!("{exited}\n")).unwrap();

        store.append(&create_test_result(3)).unwrap();
        store.append(&create_test_result(4)).unwrap();

        assert_eq!(store.count().unwrap(), 2);
        assert!(!store.lock_path().exists());
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = Arc::new(dir.path().join("sus_results.json"));

        let writers: Vec<_> = (0..8)
            .map(|n| {
                let path = Arc::clone(&path);
                thread::spawn(move || {
                    let store = JsonFileStore::new(path.as_path(), Duration::from_secs(10));
                    for _ in 0..5 {
                        assert!(store.append(&create_test_result(n % 5 + 1)).is_ok());
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = JsonFileStore::new(path.as_path(), Duration::from_secs(1));
        assert_eq!(store.count().unwrap(), 40);
    }

    #[test]
    fn test_lock_path_is_sibling() {
        let store = JsonFileStore::new("/data/sus_results.json", Duration::from_secs(1));
        assert_eq!(store.lock_path(), Path::new("/data/sus_results.json.lock"));
    }
}
