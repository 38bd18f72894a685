//! Staleness evaluation for an existing lock.
//!
//! A lock that lost the race to someone else is not necessarily held: its
//! owner may have died or the file may be a leftover. The check here decides
//! whether the claim loop may unlink it and try again.

use crate::lockfile::probe::{Clock, Liveness, ProcessProbe};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// A lock with no readable owner pid stays valid for this long after its
/// last modification.
pub(crate) const NO_PID_MAX_AGE: Duration = Duration::from_secs(300);

/// Longest owner-pid prefix read out of a lock file.
const PID_READ_LIMIT: usize = 16;

/// Decide whether the lock at `lock_path` is still valid.
///
/// Returns `false` when the lock may be reclaimed: its recorded owner is
/// confirmed gone, or it records no owner and is older than
/// [`NO_PID_MAX_AGE`]. A lock that cannot be stat'ed at all is
/// indistinguishable from a leftover and reads as not valid.
///
/// "Now" is taken from the filesystem itself where possible: reading the
/// file moves its access time, and the post-read atime is the fileserver's
/// clock, immune to skew between hosts sharing the mount. When the read
/// does not move the atime (noatime mounts, coarse timestamps) the injected
/// clock decides instead.
pub(crate) fn lock_is_valid<C: Clock, P: ProcessProbe>(
    lock_path: &Path,
    clock: &C,
    probe: &P,
) -> bool {
    let Ok(meta) = fs::metadata(lock_path) else {
        return false;
    };

    let mut now = clock.now();
    let mut mtime = meta.modified().ok();
    let mut owner_pid = None;

    if let Ok(file) = File::open(lock_path) {
        let before = file.metadata();
        let mut buf = [0u8; PID_READ_LIMIT];
        let len = (&file).read(&mut buf).unwrap_or(0);
        let after = file.metadata();

        if let (Ok(st), Ok(st2)) = (before, after) {
            #[cfg(unix)]
            if st.atime() != st2.atime() {
                now = UNIX_EPOCH + Duration::from_secs(st2.atime().max(0) as u64);
            }
            mtime = st2.modified().ok().or(mtime);
        }

        owner_pid = parse_pid(&buf[..len]);
    }

    if let Some(pid) = owner_pid {
        // A recorded owner decides on its own; age is only a fallback for
        // locks that never got a pid written.
        return match probe.probe(pid) {
            Liveness::Alive | Liveness::Unknown => true,
            Liveness::Dead => false,
        };
    }

    match mtime {
        Some(mtime) => now < mtime + NO_PID_MAX_AGE,
        None => false,
    }
}

/// Parse the leading decimal integer out of lock-file content: optional
/// whitespace, then digits; anything after the digits is ignored. Zero and
/// unparseable values mean "no owner recorded".
pub(crate) fn parse_pid(buf: &[u8]) -> Option<u32> {
    let digits: Vec<u8> = buf
        .iter()
        .copied()
        .skip_while(u8::is_ascii_whitespace)
        .take_while(u8::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    let pid: u32 = std::str::from_utf8(&digits).ok()?.parse().ok()?;
    (pid > 0).then_some(pid)
}
