//! Cooperative scheduler
//!
//! Drives a fixed set of tasks to completion on one thread, interleaving them
//! at their suspension points.

mod config;
mod core;
mod queue;

pub use config::SchedulerConfig;
pub use self::core::{RunReport, Scheduler};
pub use queue::SchedulerStats;
