//! Stable numeric result codes for lock operations.
//!
//! These values are kept bit-for-bit compatible with the liblockfile-derived
//! code space, so callers that already branch on them keep working:
//! - 0: Success
//! - 2: Temp claim file could not be created
//! - 3: Temp claim file could not be written
//! - 4: Retries exhausted without acquiring
//! - 5: Generic / invalid-argument failure
//! - 7: Orphaned lock (reserved, never produced)
//! - 8: Failed to remove a stale lock
//! - -1: Release failed
//!
//! The gaps (1, 6) are unassigned in the historical code space and stay
//! unassigned here.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// The temp claim file could not be created.
pub const TMPLOCK_FAILED: i32 = 2;

/// The temp claim file could not be fully written and closed.
pub const TMPWRITE_FAILED: i32 = 3;

/// All permitted attempts were used without acquiring the lock.
pub const RETRIES_EXHAUSTED: i32 = 4;

/// Generic failure: bad arguments or a violated claim invariant.
pub const GENERIC_FAILURE: i32 = 5;

/// Orphaned lock. Reserved in the code space; no operation produces it.
pub const ORPHANED_LOCK: i32 = 7;

/// A lock judged stale could not be removed.
pub const STALE_REMOVE_FAILED: i32 = 8;

/// The lock could not be released.
pub const RELEASE_FAILED: i32 = -1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            SUCCESS,
            TMPLOCK_FAILED,
            TMPWRITE_FAILED,
            RETRIES_EXHAUSTED,
            GENERIC_FAILURE,
            ORPHANED_LOCK,
            STALE_REMOVE_FAILED,
            RELEASE_FAILED,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Result codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn codes_match_historical_values() {
        assert_eq!(SUCCESS, 0);
        assert_eq!(TMPLOCK_FAILED, 2);
        assert_eq!(TMPWRITE_FAILED, 3);
        assert_eq!(RETRIES_EXHAUSTED, 4);
        assert_eq!(GENERIC_FAILURE, 5);
        assert_eq!(ORPHANED_LOCK, 7);
        assert_eq!(STALE_REMOVE_FAILED, 8);
        assert_eq!(RELEASE_FAILED, -1);
    }
}
