//! CLI argument parsing for linklock.
//!
//! Uses clap derive macros for declarative argument definitions. This module
//! defines the command structure; actual implementations are in the
//! `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Linklock: cooperative hard-link file locking for shared filesystems.
///
/// A lock is the existence of a file path. Claiming it hard-links a
/// uniquely named temp file onto the path and verifies the result by
/// filesystem identity, so the lock works between processes on different
/// hosts sharing a network mount.
#[derive(Parser, Debug)]
#[command(name = "linklock")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a YAML config file (default: $LINKLOCK_CONFIG if set).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for linklock.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Acquire a lock.
    ///
    /// Blocks through the retry schedule until the lock is claimed or the
    /// attempt budget runs out. Exits with the stable numeric result codes
    /// (4: retries exhausted, 5: bad arguments, ...).
    Acquire(AcquireArgs),

    /// Release a lock.
    ///
    /// Removing a lock that is already gone counts as success. No
    /// ownership check is performed; only release locks you hold.
    Release(ReleaseArgs),

    /// Show who holds a lock.
    ///
    /// Reads the owner pid out of the lock file and reports its liveness
    /// and the lock's age.
    Status(StatusArgs),
}

/// Arguments for the `acquire` command.
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Path of the lock file to claim.
    pub path: PathBuf,

    /// Extra attempts beyond the first (must be at least 1).
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Record this pid as the owner instead of the calling process.
    #[arg(long)]
    pub pid: Option<u32>,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Path of the lock file to remove.
    pub path: PathBuf,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Path of the lock file to inspect.
    pub path: PathBuf,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
