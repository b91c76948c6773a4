//! Wall-clock measurement around a run

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;

/// Start/stop timer measured against a [`Clock`]
pub struct RunTimer<'a, C: Clock + ?Sized> {
    clock: &'a C,
    start: Duration,
}

impl<'a, C: Clock + ?Sized> RunTimer<'a, C> {
    /// Start timing
    pub fn start(clock: &'a C) -> Self {
        let start = clock.now();
        debug!(start_ms = start.as_millis() as u64, "RunTimer::start: called");
        Self { clock, start }
    }

    /// Clock offset the timer started at
    pub fn started_at(&self) -> Duration {
        self.start
    }

    /// Elapsed duration without stopping
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.start)
    }

    /// Stop timing and return the elapsed duration
    pub fn stop(self) -> Duration {
        let elapsed = self.elapsed();
        debug!(elapsed_ms = elapsed.as_millis() as u64, "RunTimer::stop: called");
        elapsed
    }
}

/// Run `f` and report how long it took on `clock`
pub fn measure<C, T>(clock: &C, f: impl FnOnce() -> T) -> (T, Duration)
where
    C: Clock + ?Sized,
{
    let timer = RunTimer::start(clock);
    let value = f();
    (value, timer.stop())
}

/// Absolute slack for comparing measured against expected durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tolerance {
    pub slack: Duration,
}

impl Tolerance {
    pub const EXACT: Tolerance = Tolerance { slack: Duration::ZERO };

    pub fn from_millis(ms: u64) -> Self {
        Self {
            slack: Duration::from_millis(ms),
        }
    }

    /// True if `actual` is within the slack of `expected`, in either direction
    pub fn approx(&self, actual: Duration, expected: Duration) -> bool {
        let diff = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        diff <= self.slack
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::from_millis(100)
    }
}
