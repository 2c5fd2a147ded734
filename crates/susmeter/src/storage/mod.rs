//! Storage layer for susmeter.
//!
//! The result history is append-only and insertion-ordered. Three stores
//! implement [`HistoryStore`]:
//!
//! - [`JsonFileStore`]: a JSON array file, rewritten atomically under a lock
//!   file on every append.
//! - [`SqliteStore`]: a `SQLite` database, one row per result.
//! - [`MemoryStore`]: an in-process store for tests and embedding.

mod json;
mod lock;
mod memory;
pub mod schema;
mod sqlite;

use std::fmt;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::config::{Config, StorageBackend};
use crate::error::{Error, Result};
use crate::evaluation::EvaluationResult;

pub use json::JsonFileStore;
pub use lock::LockGuard;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Durable, append-only result history.
pub trait HistoryStore: fmt::Debug {
    /// Short backend name for logging.
    fn name(&self) -> &'static str;

    /// Append one result to the end of the history.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read or written.
    fn append(&self, result: &EvaluationResult) -> Result<()>;

    /// Load the full history in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read or parsed.
    fn load_all(&self) -> Result<Vec<EvaluationResult>>;

    /// Number of stored results.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read.
    fn count(&self) -> Result<usize> {
        Ok(self.load_all()?.len())
    }
}

impl<S: HistoryStore + ?Sized> HistoryStore for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn append(&self, result: &EvaluationResult) -> Result<()> {
        (**self).append(result)
    }

    fn load_all(&self) -> Result<Vec<EvaluationResult>> {
        (**self).load_all()
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }
}

/// Open the store selected by `config.storage.backend`.
///
/// # Errors
///
/// Returns an error if the backing database cannot be opened.
pub fn open(config: &Config) -> Result<Box<dyn HistoryStore>> {
    let store: Box<dyn HistoryStore> = match config.storage.backend {
        StorageBackend::Json => Box::new(JsonFileStore::new(
            config.history_path(),
            config.lock_timeout(),
        )),
        StorageBackend::Sqlite => Box::new(SqliteStore::open(
            config.database_path(),
            config.lock_timeout(),
        )?),
    };
    debug!("Using {} history store", store.name());
    Ok(store)
}

/// Create the parent directory of `path` if it does not exist yet.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Replace the contents of `path` in one step.
///
/// Writes to a hidden sibling, syncs it and renames it over the target, so a
/// reader sees either the old or the new file, never a partial one.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::internal(format!("not a file path: {}", path.display())))?;
    let tmp = path.with_file_name(format!(".{file_name}.tmp.{}", std::process::id()));

    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err.into());
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
