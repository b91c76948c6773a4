//! Queue types for the scheduler

use std::cmp::Ordering;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// A task waiting to run
///
/// `due` is when the task became (or becomes) runnable, relative to the start
/// of the run. Ordering is reversed so the suspended `BinaryHeap` pops the
/// earliest `due` first, then the lowest registration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QueuedTask {
    pub due: Duration,
    pub task: TaskId,
}

impl QueuedTask {
    pub fn new(due: Duration, task: TaskId) -> Self {
        Self { due, task }
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier due first, then earlier registration
        other.due.cmp(&self.due).then_with(|| other.task.cmp(&self.task))
    }
}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Statistics for one run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub total_steps: u64,
    pub total_suspensions: u64,
    pub total_blocking_steps: u64,
    pub total_blocked_ms: u64,
    pub peak_ready: usize,
    pub peak_suspended: usize,
}
