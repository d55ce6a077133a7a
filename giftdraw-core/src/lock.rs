//! Per-event lock file guarding one read-modify-write pass.
//!
//! The lock is a `.lock` file created with `create_new`, so at most one
//! process on the host holds it. The guard removes the file on drop.
//!
//! A lock left behind by a crashed process is stale: its recorded pid is
//! no longer running, or the file is older than [`STALE_AFTER`]. A stale
//! lock is removed and the acquire retried.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, SystemTime};

use crate::error::RegistryError;

pub const LOCK_FILE: &str = ".lock";

const RETRY_ATTEMPTS: u32 = 50;
const RETRY_DELAY: Duration = Duration::from_millis(20);

/// No pass holds the lock for anywhere near this long.
pub const STALE_AFTER: Duration = Duration::from_secs(30);

/// Held lock on an event directory.
#[derive(Debug)]
pub struct EventLock {
    path: PathBuf,
}

impl EventLock {
    /// Acquire the lock in `event_dir`, retrying briefly before giving up
    /// with [`RegistryError::Locked`].
    pub fn acquire(event_dir: &Path) -> Result<Self, RegistryError> {
        Self::acquire_with(event_dir, STALE_AFTER)
    }

    pub(crate) fn acquire_with(event_dir: &Path, stale_after: Duration) -> Result<Self, RegistryError> {
        let path = event_dir.join(LOCK_FILE);
        for attempt in 0..RETRY_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    // read back by is_stale
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if is_stale(&path, stale_after) {
                        tracing::warn!("removing stale lock {}", path.display());
                        match std::fs::remove_file(&path) {
                            Ok(()) => continue,
                            // another process got there first
                            Err(e) if e.kind() == ErrorKind::NotFound => continue,
                            Err(e) => return Err(RegistryError::Io(e)),
                        }
                    }
                    tracing::debug!(attempt, "event lock busy: {}", path.display());
                    sleep(RETRY_DELAY);
                }
                Err(e) => return Err(RegistryError::Io(e)),
            }
        }
        Err(RegistryError::Locked { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn is_stale(path: &Path, stale_after: Duration) -> bool {
    let age = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| SystemTime::now().duration_since(t).ok());
    if age.is_some_and(|age| age >= stale_after) {
        return true;
    }
    std::fs::read_to_string(path)
        .ok()
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .is_some_and(|pid| !pid_alive(pid))
}

/// Only answers "dead" where the process table can be read.
fn pid_alive(pid: u32) -> bool {
    let proc_root = Path::new("/proc");
    if !proc_root.join("self").exists() {
        return true;
    }
    proc_root.join(pid.to_string()).exists()
}

impl Drop for EventLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("failed to release lock {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lock_file_exists_while_held_and_is_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let lock = EventLock::acquire(dir.path()).expect("acquire");
        assert!(lock.path().exists());
        let path = lock.path().to_path_buf();
        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn second_acquire_reports_locked() {
        let dir = TempDir::new().unwrap();
        let _held = EventLock::acquire(dir.path()).expect("acquire");
        let err = EventLock::acquire(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Locked { .. }), "got: {err}");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn lock_of_dead_process_is_recovered() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCK_FILE);
        // above the default pid_max, so never a live process
        std::fs::write(&path, "4999999\n").unwrap();

        let lock = EventLock::acquire(dir.path()).expect("stale lock is replaced");
        let owner = std::fs::read_to_string(lock.path()).unwrap();
        assert_eq!(owner.trim(), std::process::id().to_string());
    }

    #[test]
    fn old_lock_is_recovered_even_with_live_pid() {
        let dir = TempDir::new().unwrap();
        let held = EventLock::acquire(dir.path()).expect("acquire");
        // leaked guard: the file stays behind like after a crash
        std::mem::forget(held);

        let lock = EventLock::acquire_with(dir.path(), Duration::ZERO).expect("old lock is replaced");
        assert!(lock.path().exists());
    }

    #[test]
    fn unreadable_pid_in_fresh_lock_still_blocks() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LOCK_FILE), "").unwrap();
        let err = EventLock::acquire(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Locked { .. }), "got: {err}");
    }
}
