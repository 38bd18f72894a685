//! RAII lock guard implementation.

use crate::error::Result;
use crate::lockfile;
use std::path::{Path, PathBuf};

/// RAII guard for an acquired lock.
///
/// When dropped, the lock is automatically released. If the release fails
/// during drop, a warning is printed but no panic occurs.
#[derive(Debug)]
pub struct LockGuard {
    /// Path to the lock file.
    path: PathBuf,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    /// Acquire `lock_path` on behalf of the calling process and wrap it in
    /// a guard.
    pub fn acquire(lock_path: &Path, retries: u32) -> Result<Self> {
        lockfile::acquire(lock_path, std::process::id(), retries)?;
        Ok(Self {
            path: lock_path.to_path_buf(),
            released: false,
        })
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Manually release the lock.
    ///
    /// This is useful when you want to release before the guard goes out of
    /// scope and handle errors explicitly.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        lockfile::release(&self.path)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = lockfile::release(&self.path)
        {
            eprintln!(
                "Warning: failed to release lock '{}': {}",
                self.path.display(),
                e
            );
        }
    }
}
