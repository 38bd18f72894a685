//! Command implementations for linklock.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each handler wraps a library entry point and, when an
//! events log is configured, appends an audit record best-effort.

use crate::cli::{AcquireArgs, Cli, Command, ReleaseArgs, StatusArgs};
use chrono::{DateTime, Utc};
use linklock::config::Config;
use linklock::error::Result;
use linklock::events::{Event, EventAction, append_event};
use linklock::lockfile::{self, Liveness, SignalProbe};
use serde_json::json;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Command::Acquire(args) => cmd_acquire(args, &config),
        Command::Release(args) => cmd_release(args, &config),
        Command::Status(args) => cmd_status(args),
    }
}

fn cmd_acquire(args: AcquireArgs, config: &Config) -> Result<()> {
    let pid = args.pid.unwrap_or_else(std::process::id);
    let retries = args.retries.unwrap_or(config.retries);

    lockfile::acquire(&args.path, pid, retries)?;

    println!("Acquired lock: {}", args.path.display());

    if let Some(log) = &config.events_log {
        let event = Event::new(EventAction::Acquire, &args.path)
            .with_details(json!({ "pid": pid, "retries": retries }));
        if let Err(e) = append_event(log, &event) {
            eprintln!("Warning: failed to log acquire event: {e}");
        }
    }

    Ok(())
}

fn cmd_release(args: ReleaseArgs, config: &Config) -> Result<()> {
    lockfile::release(&args.path)?;

    println!("Released lock: {}", args.path.display());

    if let Some(log) = &config.events_log {
        let event = Event::new(EventAction::Release, &args.path);
        if let Err(e) = append_event(log, &event) {
            eprintln!("Warning: failed to log release event: {e}");
        }
    }

    Ok(())
}

fn cmd_status(args: StatusArgs) -> Result<()> {
    let Some(status) = lockfile::inspect(&args.path, &SignalProbe)? else {
        println!("Not locked: {}", args.path.display());
        return Ok(());
    };

    println!("Lock: {}", args.path.display());
    match status.owner_pid {
        Some(pid) => {
            let liveness = match status.liveness {
                Some(Liveness::Alive) => "alive",
                Some(Liveness::Dead) => "dead",
                _ => "unknown",
            };
            println!("  Owner pid:  {pid} ({liveness})");
        }
        None => println!("  Owner pid:  none recorded"),
    }
    if let Some(modified) = status.modified {
        let modified: DateTime<Utc> = modified.into();
        println!(
            "  Modified:   {}",
            modified.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("  Age:        {}", age_string(modified));
    }

    Ok(())
}

/// Format the time since `then` as a human-readable age.
fn age_string(then: DateTime<Utc>) -> String {
    let age = Utc::now().signed_duration_since(then);
    let minutes = age.num_minutes();
    let hours = age.num_hours();
    let days = age.num_days();

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}
