//! Linklock: cooperative hard-link file locking for shared filesystems.
//!
//! This is the main entry point for the `linklock` CLI. It parses
//! arguments, dispatches to the appropriate command handler, and exits
//! with the stable numeric result codes.

mod cli;
mod commands;

use cli::Cli;
use linklock::exit_codes;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {err}");

            // The numeric result code is the process exit code; -1 wraps
            // to 255 as usual.
            ExitCode::from(err.code() as u8)
        }
    }
}
