//! Time sources for the scheduler
//!
//! The scheduler never reads `Instant::now()` directly. It asks a [`Clock`]
//! for the current offset and asks it to wait, so the same loop can run
//! against the wall clock or against simulated time.

use std::cell::Cell;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A monotonic time source measured as an offset from the clock's origin
pub trait Clock {
    /// Current offset from the clock's origin
    fn now(&self) -> Duration;

    /// Idle until `deadline`. Returns immediately if it has already passed.
    fn sleep_until(&self, deadline: Duration);

    /// Occupy the calling thread for `duration`
    fn block(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep_until(&self, deadline: Duration) {
        (**self).sleep_until(deadline)
    }

    fn block(&self, duration: Duration) {
        (**self).block(duration)
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn sleep_until(&self, deadline: Duration) {
        (**self).sleep_until(deadline)
    }

    fn block(&self, duration: Duration) {
        (**self).block(duration)
    }
}

/// Wall-clock time backed by `Instant` and `std::thread::sleep`
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            debug!(wait_ms = (deadline - now).as_millis() as u64, "SystemClock::sleep_until: sleeping");
            std::thread::sleep(deadline - now);
        }
    }

    fn block(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated time that only moves when the scheduler waits or a task blocks
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<Duration>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without waiting
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep_until(&self, deadline: Duration) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }

    fn block(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Which clock a scheduler should be built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClockMode {
    #[default]
    System,
    Virtual,
}

impl ClockMode {
    /// Construct a fresh clock for this mode
    pub fn build(self) -> Box<dyn Clock> {
        match self {
            ClockMode::System => Box::new(SystemClock::new()),
            ClockMode::Virtual => Box::new(VirtualClock::new()),
        }
    }
}

impl std::fmt::Display for ClockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::Virtual => write!(f, "virtual"),
        }
    }
}

impl std::str::FromStr for ClockMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" | "real" => Ok(Self::System),
            "virtual" | "simulated" => Ok(Self::Virtual),
            _ => Err(format!("Unknown clock mode: {}", s)),
        }
    }
}
