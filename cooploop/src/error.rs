//! Error types for tasks and the scheduler

use thiserror::Error;

use crate::task::TaskId;

/// Errors a task can raise from a step
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task step failed: {0}")]
    Fault(String),

    #[error("Task '{name}' stepped after it already completed")]
    AlreadyComplete { name: String },
}

impl TaskError {
    /// Build a fault from any displayable message
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }
}

/// Errors surfaced by `Scheduler::run`
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Task {task} ('{name}') failed")]
    TaskFailure {
        task: TaskId,
        name: String,
        #[source]
        source: TaskError,
    },
}

impl SchedulerError {
    /// Id of the task that stopped the run
    pub fn task_id(&self) -> TaskId {
        match self {
            SchedulerError::TaskFailure { task, .. } => *task,
        }
    }
}
