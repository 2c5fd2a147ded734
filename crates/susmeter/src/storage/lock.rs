//! Exclusive lock files guarding read-modify-write cycles.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use sysinfo::{Pid, System};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Pause between attempts while another process holds the lock.
const RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// A lock file untouched for this long is abandoned even if its PID is alive
/// (the PID may have been reused).
const STALE_AFTER: Duration = Duration::from_secs(600);

/// An acquired lock file. The file is removed when the guard is dropped.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    /// Create `path` exclusively, retrying until `timeout` elapses.
    ///
    /// The lock file holds the owner's process id. A lock whose owner is no
    /// longer running, or which is older than ten minutes, is removed and the
    /// attempt repeated. This is checked on first contention and once more
    /// when the timeout expires.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if a live lock still exists after
    /// `timeout`, or an I/O error if the file cannot be created for another
    /// reason.
    pub fn acquire(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        super::ensure_parent_dir(&path)?;

        let started = Instant::now();
        let mut first_contention = true;
        let mut final_check = true;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let _ = writeln!(file, "{}", std::process::id());
                    debug!("Acquired lock {}", path.display());
                    return Ok(Self { path });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    if first_contention {
                        first_contention = false;
                        if break_stale(&path)? {
                            continue;
                        }
                    }
                    let waited = started.elapsed();
                    if waited >= timeout {
                        if final_check {
                            final_check = false;
                            if break_stale(&path)? {
                                continue;
                            }
                        }
                        return Err(Error::LockTimeout { path, waited });
                    }
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Released lock {}", self.path.display()),
            Err(err) => warn!("Failed to remove lock {}: {}", self.path.display(), err),
        }
    }
}

/// Remove the lock at `path` if it is abandoned. Returns whether the lock is
/// gone, so the caller can try to create it again.
fn break_stale(path: &Path) -> Result<bool> {
    let Some(owner) = stale_contents(path)? else {
        return Ok(false);
    };

    // Move the lock aside first so two waiters cannot both delete it.
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let aside = path.with_file_name(format!(".{file_name}.stale.{}", std::process::id()));
    match std::fs::rename(path, &aside) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(true),
        Err(err) => return Err(err.into()),
    }

    let moved = std::fs::read_to_string(&aside).unwrap_or_default();
    if moved != owner {
        // Another waiter replaced the stale lock before we moved it.
        let _ = std::fs::hard_link(&aside, path);
        let _ = std::fs::remove_file(&aside);
        return Ok(false);
    }

    std::fs::remove_file(&aside)?;
    warn!("Removed abandoned lock {} (owner: {})", path.display(), owner.trim());
    Ok(true)
}

/// Contents of the lock file if it is abandoned, `None` if it is live or gone.
fn stale_contents(path: &Path) -> Result<Option<String>> {
    let (contents, modified) = match (std::fs::read_to_string(path), std::fs::metadata(path)) {
        (Ok(contents), Ok(meta)) => (contents, meta.modified()?),
        (Err(err), _) | (_, Err(err)) if err.kind() == ErrorKind::NotFound => return Ok(None),
        (Err(err), _) | (_, Err(err)) => return Err(err.into()),
    };

    let aged = modified.elapsed().is_ok_and(|age| age >= STALE_AFTER);
    // An empty or partial file belongs to a writer that has not written its
    // PID yet; only age can make it stale.
    let owner_gone = contents
        .trim()
        .parse::<u32>()
        .is_ok_and(|pid| !process_alive(pid));

    Ok((aged || owner_gone).then_some(contents))
}

fn process_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_processes();
    system.process(Pid::from_u32(pid)).is_some()
}
