//! Error types for linklock.
//!
//! Uses thiserror for derive macros. Every variant maps to one of the stable
//! numeric result codes in [`crate::exit_codes`]; callers match on the
//! variant, the number exists for wire/exit-code compatibility only.

use crate::exit_codes;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// Bad arguments detected before touching the filesystem: an empty lock
    /// path, a zero retry count, or an unusable config file.
    #[error("{0}")]
    InvalidRequest(String),

    /// The temp claim file could not be created exclusively.
    #[error("failed to create temp claim file '{}': {source}", path.display())]
    TempCreate { path: PathBuf, source: io::Error },

    /// The temp claim file could not be fully written and closed.
    #[error("failed to write temp claim file '{}': {source}", path.display())]
    TempWrite { path: PathBuf, source: io::Error },

    /// Every permitted attempt was used without acquiring the lock.
    #[error("could not acquire lock '{}': retries exhausted", .0.display())]
    RetriesExhausted(PathBuf),

    /// A state the algorithm relies on stopped holding, e.g. our own temp
    /// claim file vanished mid-attempt.
    #[error("lock attempt on '{}' failed: {reason}", path.display())]
    ClaimInvariant { path: PathBuf, reason: String },

    /// Orphaned lock. Reserved for code-space compatibility; no current
    /// operation constructs this variant.
    #[error("orphaned lock '{}'", .0.display())]
    Orphaned(PathBuf),

    /// A lock judged stale could not be removed.
    #[error("failed to remove stale lock '{}': {source}", path.display())]
    RemoveStale { path: PathBuf, source: io::Error },

    /// The lock could not be released.
    #[error("failed to release lock '{}': {source}", path.display())]
    Release { path: PathBuf, source: io::Error },
}

impl LockError {
    /// Returns the stable numeric result code for this error.
    pub fn code(&self) -> i32 {
        match self {
            LockError::InvalidRequest(_) => exit_codes::GENERIC_FAILURE,
            LockError::TempCreate { .. } => exit_codes::TMPLOCK_FAILED,
            LockError::TempWrite { .. } => exit_codes::TMPWRITE_FAILED,
            LockError::RetriesExhausted(_) => exit_codes::RETRIES_EXHAUSTED,
            LockError::ClaimInvariant { .. } => exit_codes::GENERIC_FAILURE,
            LockError::Orphaned(_) => exit_codes::ORPHANED_LOCK,
            LockError::RemoveStale { .. } => exit_codes::STALE_REMOVE_FAILED,
            LockError::Release { .. } => exit_codes::RELEASE_FAILED,
        }
    }
}

/// Result type alias for lock operations.
pub type Result<T> = std::result::Result<T, LockError>;
