//! Append-only audit events for lock operations.
//!
//! When an events log is configured, the CLI appends one JSON object per
//! line (NDJSON) for every acquire and release it performs, so operators
//! can reconstruct who serialized on a resource and when, across machines
//! sharing the lock directory.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: the operation performed (acquire/release)
//! - `actor`: the owner string (e.g., `user@HOST`)
//! - `lock`: the lock path
//! - `details`: freeform object with operation-specific details

use crate::error::{LockError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Operations that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Lock acquired.
    Acquire,
    /// Lock released.
    Release,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Acquire => write!(f, "acquire"),
            EventAction::Release => write!(f, "release"),
        }
    }
}

/// An event record for the audit log.
///
/// Events are serialized as single-line JSON objects and appended to the
/// configured events file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The operation that was performed.
    pub action: EventAction,

    /// The actor who performed it (e.g., `user@HOST`).
    pub actor: String,

    /// The lock path operated on.
    pub lock: String,

    /// Freeform details object with operation-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action and lock path.
    ///
    /// The timestamp is set to the current time and the actor is determined
    /// from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction, lock: &Path) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: actor_string(),
            lock: lock.display().to_string(),
            details: Value::Null,
        }
    }

    /// Attach operation-specific details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }
}

/// Append a single event to the log at `log_path`.
///
/// The file is created on first use. Each event occupies exactly one line.
pub fn append_event(log_path: &Path, event: &Event) -> Result<()> {
    let line = serde_json::to_string(event)
        .map_err(|e| LockError::InvalidRequest(format!("failed to serialize event: {e}")))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| {
            LockError::InvalidRequest(format!(
                "failed to open events log '{}': {}",
                log_path.display(),
                e
            ))
        })?;

    writeln!(file, "{line}").map_err(|e| {
        LockError::InvalidRequest(format!(
            "failed to append to events log '{}': {}",
            log_path.display(),
            e
        ))
    })
}

/// Get the `user@host` identity for the audit trail.
pub(crate) fn actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{user}@{host}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn event_serializes_action_as_snake_case() {
        let event = Event::new(EventAction::Acquire, Path::new("/run/lock/ap.lock"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"action\":\"acquire\""));
        assert!(json.contains("/run/lock/ap.lock"));
    }

    #[test]
    fn append_event_writes_one_line_per_event() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("events.ndjson");

        let first = Event::new(EventAction::Acquire, Path::new("/tmp/a.lock"))
            .with_details(json!({"pid": 42, "retries": 5}));
        let second = Event::new(EventAction::Release, Path::new("/tmp/a.lock"));

        append_event(&log, &first).unwrap();
        append_event(&log, &second).unwrap();

        let content = std::fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: Event = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.action, EventAction::Acquire);
        assert_eq!(parsed.details["pid"], 42);

        let parsed: Event = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.action, EventAction::Release);
    }

    #[test]
    fn actor_string_has_user_and_host() {
        let actor = actor_string();
        assert!(actor.contains('@'));
        assert!(!actor.is_empty());
    }
}
