//! Cooperative, hard-link based file locking.
//!
//! This module implements mutual exclusion between independent processes,
//! including processes on different hosts sharing a network filesystem,
//! through the existence of a well-known lock file.
//!
//! # Protocol
//!
//! A contender writes its pid into a uniquely named temp file next to the
//! lock path, then tries to hard-link the temp file onto the lock path.
//! Whether the link "worked" is decided by comparing the (device, inode)
//! identity of both paths afterwards, never by the link call's return
//! value, which network filesystems are allowed to get wrong. Locks left
//! behind by dead or hung owners are detected (signal-0 probe of the
//! recorded pid, or file age when no pid is readable) and reclaimed.
//!
//! # Lock Files
//!
//! The lock file contains the decimal owner pid followed by a newline,
//! nothing else. The per-attempt temp file appends `.lk`, the zero-padded
//! pid, and a time nibble to the lock path, and never survives the
//! acquisition call that created it.
//!
//! # Entry Points
//!
//! [`acquire`]/[`release`] are the plain synchronous interface;
//! [`acquire_with`] takes a caller-supplied [`Clock`] and [`ProcessProbe`]
//! so the retry loop can be exercised without real sleeps or processes.
//! [`LockGuard`] wraps acquire/release in RAII for in-process use, and
//! [`inspect`] reads an existing lock for reporting.

mod claim;
mod guard;
mod probe;
mod stale;
mod temp;

#[cfg(test)]
mod test_support;

// Re-export public API
pub use guard::LockGuard;
pub use probe::{Clock, Liveness, ProcessProbe, SignalProbe, SystemClock};

use crate::error::{LockError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

/// Acquire the lock at `lock_path`, recording `owner_pid` as the holder.
///
/// `retries` is the number of extra attempts beyond the first and must be
/// at least 1. The call blocks, sleeping between attempts, until the lock
/// is claimed or the budget runs out. Uses the system clock and the
/// signal-0 liveness probe.
pub fn acquire(lock_path: &Path, owner_pid: u32, retries: u32) -> Result<()> {
    acquire_with(lock_path, owner_pid, retries, &SystemClock, &SignalProbe)
}

/// Acquire with caller-supplied clock and liveness probe.
pub fn acquire_with<C: Clock, P: ProcessProbe>(
    lock_path: &Path,
    owner_pid: u32,
    retries: u32,
    clock: &C,
    probe: &P,
) -> Result<()> {
    if lock_path.as_os_str().is_empty() {
        return Err(LockError::InvalidRequest("lock path is empty".to_string()));
    }
    if retries == 0 {
        return Err(LockError::InvalidRequest(
            "retries must be at least 1".to_string(),
        ));
    }

    let temp = temp::TempClaim::create(lock_path, owner_pid, clock.now())?;
    claim::run(lock_path, &temp, retries, clock, probe)
    // temp drops here on every path, removing the claim file.
}

/// Release the lock at `lock_path`.
///
/// Removing a lock that is already absent is success. No ownership check is
/// performed; the caller is responsible for not releasing a lock it does
/// not hold.
pub fn release(lock_path: &Path) -> Result<()> {
    if lock_path.as_os_str().is_empty() {
        return Err(LockError::Release {
            path: lock_path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "lock path is empty"),
        });
    }
    match fs::remove_file(lock_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LockError::Release {
            path: lock_path.to_path_buf(),
            source,
        }),
    }
}

/// A point-in-time view of an existing lock file, for reporting.
#[derive(Debug, Clone)]
pub struct LockStatus {
    /// Owner pid parsed out of the lock content, if any.
    pub owner_pid: Option<u32>,

    /// Probe result for the owner pid; `None` when no pid was recorded.
    pub liveness: Option<Liveness>,

    /// Last modification time of the lock file.
    pub modified: Option<SystemTime>,
}

/// Read the lock at `lock_path` for display purposes.
///
/// Returns `Ok(None)` when no lock exists. This is an observation only; the
/// lock may change hands at any moment after the call.
pub fn inspect<P: ProcessProbe>(lock_path: &Path, probe: &P) -> Result<Option<LockStatus>> {
    let meta = match fs::metadata(lock_path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LockError::InvalidRequest(format!(
                "failed to read lock '{}': {}",
                lock_path.display(),
                e
            )));
        }
    };

    let content = fs::read(lock_path).unwrap_or_default();
    let owner_pid = stale::parse_pid(&content);
    let liveness = owner_pid.map(|pid| probe.probe(pid));

    Ok(Some(LockStatus {
        owner_pid,
        liveness,
        modified: meta.modified().ok(),
    }))
}
