//! Injected clock and process-liveness capabilities.
//!
//! The claim loop never reads the wall clock, sleeps, or signals processes
//! directly; those effects arrive through these traits so the loop can be
//! driven deterministically in tests, without real sleeps or real processes.

use std::time::{Duration, SystemTime};

/// Source of time and of delay between attempts.
pub trait Clock {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Production clock backed by `SystemTime` and `thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Outcome of probing a recorded owner pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The process exists, or exists but is not ours to signal.
    Alive,
    /// No such process.
    Dead,
    /// The probe could not decide. Callers treat this as alive.
    Unknown,
}

/// Capability to ask whether a process is still around.
pub trait ProcessProbe {
    /// Probe `pid` without disturbing it.
    fn probe(&self, pid: u32) -> Liveness;
}

/// Liveness probe using `kill(pid, 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalProbe;

impl ProcessProbe for SignalProbe {
    #[cfg(unix)]
    fn probe(&self, pid: u32) -> Liveness {
        // Signal 0 runs the existence and permission checks without
        // delivering anything.
        let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
        if rc == 0 {
            return Liveness::Alive;
        }
        match std::io::Error::last_os_error().raw_os_error() {
            // EPERM still proves the pid exists.
            Some(libc::EPERM) => Liveness::Alive,
            Some(libc::ESRCH) => Liveness::Dead,
            _ => Liveness::Unknown,
        }
    }

    #[cfg(not(unix))]
    fn probe(&self, _pid: u32) -> Liveness {
        // No portable probe here; never report a process dead on guesswork.
        Liveness::Unknown
    }
}
