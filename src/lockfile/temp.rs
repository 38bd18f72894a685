//! Temp claim file naming and creation.

use crate::error::{LockError, Result};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Extension inserted between the lock path and the per-attempt suffix.
const TMPLOCK_EXT: &str = ".lk";

/// Derive the candidate temp path for one acquisition call.
///
/// The layout is `<lock_path>.lk<pid, zero-padded to 5 digits><low nibble of
/// the current time, 1 hex digit>`. The nibble only lowers the collision odds
/// between rapid repeated attempts by the same process; it carries no
/// staleness meaning.
pub(crate) fn temp_claim_path(lock_path: &Path, pid: u32, now: SystemTime) -> Result<PathBuf> {
    if lock_path.as_os_str().is_empty() {
        return Err(LockError::InvalidRequest("lock path is empty".to_string()));
    }

    let nibble = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        & 0xf;

    let mut name = OsString::from(lock_path.as_os_str());
    name.push(format!("{TMPLOCK_EXT}{pid:05}{nibble:x}"));
    Ok(PathBuf::from(name))
}

/// The per-attempt temp claim file.
///
/// Holds the candidate that the claim loop tries to hard-link onto the lock
/// path. Dropping the value unlinks the file, so no exit path of an
/// acquisition can leave it behind.
#[derive(Debug)]
pub(crate) struct TempClaim {
    path: PathBuf,
}

impl TempClaim {
    /// Exclusively create the temp file and record `pid` in it.
    ///
    /// The file must not already exist. It is created with mode `0o644`
    /// (owner read/write, group/other read) and holds the decimal pid
    /// followed by a newline.
    pub(crate) fn create(lock_path: &Path, pid: u32, now: SystemTime) -> Result<Self> {
        let path = temp_claim_path(lock_path, pid, now)?;

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o644);

        let mut file = options.open(&path).map_err(|source| LockError::TempCreate {
            path: path.clone(),
            source,
        })?;

        // The file exists from here on; the claim's drop removes it again
        // if the write below fails.
        let claim = Self { path };
        if let Err(source) = write_owner_record(&mut file, pid) {
            return Err(LockError::TempWrite {
                path: claim.path.clone(),
                source,
            });
        }
        Ok(claim)
    }

    /// Path of the temp claim file.
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

fn write_owner_record(file: &mut File, pid: u32) -> std::io::Result<()> {
    file.write_all(format!("{pid}\n").as_bytes())?;
    file.sync_all()
}

impl Drop for TempClaim {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
