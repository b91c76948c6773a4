//! Tasks driven by the scheduler
//!
//! A task is an explicit state machine. Each call to [`Task::step`] advances it
//! by one stage and reports whether it suspended, blocked, or finished.

mod func;
mod scripted;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::Clock;
use crate::error::TaskError;
use crate::trace::{Trace, TraceKind};

pub use func::FnTask;
pub use scripted::{ScriptedTask, Stage};

/// Registration index of a task within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a registered task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Suspended,
    Done,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Suspended => write!(f, "suspended"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<O> {
    /// Yield to the scheduler; resume no earlier than this long from now
    Suspend(Duration),
    /// The step occupied the thread for this long without yielding
    Blocked(Duration),
    /// The task finished with a result
    Done(O),
}

/// A unit of cooperative work
pub trait Task {
    type Output;

    /// Human-readable label used in traces and logs
    fn name(&self) -> &str;

    /// Advance by one stage
    ///
    /// Blocking work must run inside this call through [`StepContext::block`]
    /// before `Step::Blocked` is returned.
    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<Step<Self::Output>, TaskError>;
}

impl<T: Task + ?Sized> Task for Box<T> {
    type Output = T::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<Step<Self::Output>, TaskError> {
        (**self).step(ctx)
    }
}

/// What a task can see and do while it is being stepped
pub struct StepContext<'a> {
    id: TaskId,
    name: &'a str,
    clock: &'a dyn Clock,
    origin: Duration,
    trace: &'a mut Trace,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(
        id: TaskId,
        name: &'a str,
        clock: &'a dyn Clock,
        origin: Duration,
        trace: &'a mut Trace,
    ) -> Self {
        Self {
            id,
            name,
            clock,
            origin,
            trace,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Time since the current run started
    pub fn now(&self) -> Duration {
        self.clock.now().saturating_sub(self.origin)
    }

    /// Record an observable side-effect
    pub fn emit(&mut self, message: impl Into<String>) {
        let message = message.into();
        let at = self.now();
        info!(task = %self.id, name = self.name, at_ms = at.as_millis() as u64, "{}", message);
        self.trace.record(at, self.id, self.name, TraceKind::Emitted { message });
    }

    /// Occupy the loop for `duration` without yielding
    pub fn block(&mut self, duration: Duration) {
        let at = self.now();
        self.trace.record(at, self.id, self.name, TraceKind::Blocked { duration });
        self.clock.block(duration);
    }
}
