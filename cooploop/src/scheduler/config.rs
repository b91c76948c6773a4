//! Scheduler configuration

use serde::{Deserialize, Serialize};

use crate::clock::ClockMode;

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Time source used by `Scheduler::from_config`
    #[serde(default)]
    pub clock: ClockMode,

    /// Record an execution trace for each run
    #[serde(default = "default_trace")]
    pub trace: bool,
}

fn default_trace() -> bool {
    true
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            clock: ClockMode::System,
            trace: default_trace(),
        }
    }
}

impl SchedulerConfig {
    /// Same settings on simulated time
    pub fn virtual_time(self) -> Self {
        Self {
            clock: ClockMode::Virtual,
            ..self
        }
    }
}
