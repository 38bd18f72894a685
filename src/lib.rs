//! Linklock: cooperative hard-link file locking for shared filesystems.
//!
//! A lock is the existence of a well-known file path. Ownership is taken by
//! hard-linking a uniquely named temp file onto that path, and proven by
//! comparing the filesystem identity (device, inode) of both names, a
//! check that stays correct on network mounts where the link call's own
//! return value cannot be trusted. Locks abandoned by dead or hung owners
//! are detected and reclaimed.
//!
//! The [`lockfile`] module is the library surface; the `linklock` binary
//! wraps it for shell callers.

pub mod config;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod lockfile;

pub use error::{LockError, Result};
pub use lockfile::{LockGuard, acquire, acquire_with, release};
