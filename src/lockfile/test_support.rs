//! Shared fakes for lockfile tests.

use crate::lockfile::probe::{Clock, Liveness, ProcessProbe};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Clock with a fixed "now" that records sleeps instead of performing them.
#[derive(Debug)]
pub(crate) struct FakeClock {
    now: SystemTime,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub(crate) fn at(now: SystemTime) -> Self {
        Self {
            now,
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Every delay passed to `sleep`, in order.
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::at(SystemTime::now())
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        self.now
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// Probe that answers the same liveness for every pid.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FakeProbe(pub(crate) Liveness);

impl ProcessProbe for FakeProbe {
    fn probe(&self, _pid: u32) -> Liveness {
        self.0
    }
}
