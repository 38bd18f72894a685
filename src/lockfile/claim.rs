//! The claim loop: link, verify by identity, reclaim stale locks, back off.
//!
//! The loop's one load-bearing invariant: success is never read off the
//! hard-link call. Networked filesystems are allowed to report a failure
//! for a link that happened, or the reverse, so every attempt re-derives
//! the outcome from independently observable state: the (device, inode)
//! identity of the temp claim file versus the lock path. The link call is
//! only the mechanism that may or may not have moved that state.

use crate::error::{LockError, Result};
use crate::lockfile::probe::{Clock, ProcessProbe};
use crate::lockfile::stale;
use crate::lockfile::temp::TempClaim;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Backoff growth per retry iteration.
const BACKOFF_STEP: Duration = Duration::from_secs(5);

/// Longest sleep between attempts.
const BACKOFF_CAP: Duration = Duration::from_secs(60);

/// Consecutive failures to stat the lock path tolerated before giving up.
/// Normally either we or another process hold the lock, so the stat can
/// only keep failing if the filesystem is persistently inconsistent.
const MAX_STAT_MISSES: u32 = 5;

/// One iteration's view of the world after the link attempt.
enum Attempt {
    /// The lock path carries our temp file's identity: the lock is ours.
    Acquired,
    /// The lock path resolves to somebody else's file.
    HeldByOther,
    /// The lock path could not be stat'ed at all.
    LockUnreadable,
}

/// Loop state, advanced once per iteration. Fatal conditions leave the
/// loop through `Err` instead of a state.
enum State {
    /// Wait out the backoff delay, then attempt.
    Sleeping(Duration),
    /// Link and verify, without sleeping first.
    Attempting,
    /// A stale lock was just unlinked; attempt again immediately.
    Reclaimed,
    /// The lock is ours.
    Acquired,
    /// Every permitted attempt was used.
    Exhausted,
}

/// Attempt budget and backoff schedule for one acquisition call.
struct Budget {
    /// Attempts not yet started, including the next one.
    remaining: u32,
    /// Sleep preceding the next rescheduled attempt.
    delay: Duration,
}

impl Budget {
    /// `retries` is the number of extra tries beyond the first.
    fn new(retries: u32) -> Self {
        Self {
            remaining: retries + 1,
            delay: Duration::ZERO,
        }
    }

    /// Account for the attempt that just failed and schedule the next one.
    /// The delay starts at zero and grows by [`BACKOFF_STEP`] per iteration
    /// up to [`BACKOFF_CAP`].
    fn reschedule(&mut self) -> State {
        self.remaining -= 1;
        if self.remaining == 0 {
            return State::Exhausted;
        }
        let delay = self.delay;
        self.delay = (self.delay + BACKOFF_STEP).min(BACKOFF_CAP);
        State::Sleeping(delay)
    }

    /// Account for an attempt that ended in a stale reclaim. Removing
    /// somebody's leftover must not eat the caller's budget: the next
    /// attempt runs at once, and one extra try is granted if this was the
    /// last one.
    fn note_reclaim(&mut self) -> State {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = 1;
        }
        State::Attempting
    }
}

/// Drive link attempts against `lock_path` until the lock is ours, the
/// budget runs out, or a fatal condition surfaces.
pub(crate) fn run<C: Clock, P: ProcessProbe>(
    lock_path: &Path,
    temp: &TempClaim,
    retries: u32,
    clock: &C,
    probe: &P,
) -> Result<()> {
    let mut budget = Budget::new(retries);
    let mut stat_misses = 0u32;
    let mut state = State::Attempting;

    loop {
        state = match state {
            State::Sleeping(delay) => {
                clock.sleep(delay);
                State::Attempting
            }
            State::Attempting => match attempt(lock_path, temp)? {
                Attempt::Acquired => State::Acquired,
                Attempt::LockUnreadable => {
                    stat_misses += 1;
                    if stat_misses > MAX_STAT_MISSES {
                        return Err(LockError::RetriesExhausted(lock_path.to_path_buf()));
                    }
                    budget.reschedule()
                }
                Attempt::HeldByOther => {
                    stat_misses = 0;
                    if stale::lock_is_valid(lock_path, clock, probe) {
                        budget.reschedule()
                    } else {
                        remove_stale(lock_path)?;
                        State::Reclaimed
                    }
                }
            },
            State::Reclaimed => budget.note_reclaim(),
            State::Acquired => return Ok(()),
            State::Exhausted => return Err(LockError::RetriesExhausted(lock_path.to_path_buf())),
        };
    }
}

/// Run one link-and-verify round.
///
/// The hard link's own result is discarded on purpose; only the identity
/// tuples read back afterwards decide. Losing the ability to stat our own
/// temp file is an invariant violation (nothing else may remove it) and
/// fails the whole acquisition.
fn attempt(lock_path: &Path, temp: &TempClaim) -> Result<Attempt> {
    let _ = fs::hard_link(temp.path(), lock_path);

    let ours = fs::symlink_metadata(temp.path()).map_err(|_| LockError::ClaimInvariant {
        path: lock_path.to_path_buf(),
        reason: format!("temp claim file '{}' disappeared", temp.path().display()),
    })?;

    let lock = match fs::symlink_metadata(lock_path) {
        Ok(meta) => meta,
        Err(_) => return Ok(Attempt::LockUnreadable),
    };

    if lock.dev() == ours.dev() && lock.ino() == ours.ino() {
        Ok(Attempt::Acquired)
    } else {
        Ok(Attempt::HeldByOther)
    }
}

/// Unlink a lock judged stale. "Already gone" means another contender beat
/// us to the removal, which is fine; any other failure is fatal because we
/// cannot tell who is racing on the leftover.
fn remove_stale(lock_path: &Path) -> Result<()> {
    match fs::remove_file(lock_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(LockError::RemoveStale {
            path: lock_path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delays_until_exhausted(budget: &mut Budget) -> Vec<Duration> {
        let mut delays = Vec::new();
        loop {
            match budget.reschedule() {
                State::Sleeping(d) => delays.push(d),
                State::Exhausted => return delays,
                _ => unreachable!("reschedule only sleeps or exhausts"),
            }
        }
    }

    #[test]
    fn budget_allows_retries_plus_one_attempts() {
        // retries = 2 means three attempts and two sleeps between them.
        let mut budget = Budget::new(2);
        let delays = delays_until_exhausted(&mut budget);
        assert_eq!(delays.len(), 2);
    }

    #[test]
    fn backoff_starts_at_zero_and_grows_by_step() {
        let mut budget = Budget::new(4);
        let delays = delays_until_exhausted(&mut budget);
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_secs(5),
                Duration::from_secs(10),
                Duration::from_secs(15),
            ]
        );
    }

    #[test]
    fn backoff_caps_at_sixty_seconds() {
        let mut budget = Budget::new(20);
        let delays = delays_until_exhausted(&mut budget);
        assert_eq!(delays.last(), Some(&Duration::from_secs(60)));
        assert!(delays.iter().all(|d| *d <= Duration::from_secs(60)));
    }

    #[test]
    fn reclaim_on_last_attempt_grants_an_extra_try() {
        let mut budget = Budget::new(1);
        // First attempt fails over to a sleep.
        assert!(matches!(budget.reschedule(), State::Sleeping(_)));
        // Second (final) attempt ends in a reclaim: one more try appears.
        assert!(matches!(budget.note_reclaim(), State::Attempting));
        assert!(matches!(budget.reschedule(), State::Exhausted));
    }

    #[test]
    fn reclaim_mid_budget_retries_without_sleeping() {
        let mut budget = Budget::new(3);
        // The reclaim's own attempt is spent, but the follow-up attempt
        // starts immediately instead of entering a sleep.
        assert!(matches!(budget.note_reclaim(), State::Attempting));
        let delays = delays_until_exhausted(&mut budget);
        assert_eq!(delays.len(), 2);
    }

    #[test]
    fn reclaim_does_not_advance_the_backoff() {
        let mut budget = Budget::new(5);
        assert!(matches!(budget.reschedule(), State::Sleeping(d) if d == Duration::ZERO));
        budget.note_reclaim();
        // Next reschedule picks up where the backoff left off.
        assert!(matches!(
            budget.reschedule(),
            State::Sleeping(d) if d == Duration::from_secs(5)
        ));
    }
}
