//! Scheduler implementation

use std::collections::{BinaryHeap, VecDeque};
use std::time::Duration;

use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::error::SchedulerError;
use crate::task::{Step, StepContext, Task, TaskId, TaskStatus};
use crate::timing::RunTimer;
use crate::trace::{Trace, TraceKind};

use super::config::SchedulerConfig;
use super::queue::{QueuedTask, SchedulerStats};

/// Bookkeeping for one registered task
struct Slot<T: Task> {
    name: String,
    /// Dropped once the task is done; only the result is kept
    task: Option<T>,
    status: TaskStatus,
    result: Option<T::Output>,
}

/// State owned by a single call to `Scheduler::run`
struct RunState<T: Task> {
    slots: Vec<Slot<T>>,
    /// FIFO in the order tasks became runnable
    ready: VecDeque<QueuedTask>,
    suspended: BinaryHeap<QueuedTask>,
    trace: Trace,
    stats: SchedulerStats,
}

impl<T: Task> RunState<T> {
    fn new(tasks: impl IntoIterator<Item = T>, trace: bool) -> Self {
        let slots: Vec<_> = tasks
            .into_iter()
            .map(|task| Slot {
                name: task.name().to_string(),
                task: Some(task),
                status: TaskStatus::Pending,
                result: None,
            })
            .collect();

        let ready: VecDeque<_> = (0..slots.len())
            .map(|i| QueuedTask::new(Duration::ZERO, TaskId(i)))
            .collect();

        let stats = SchedulerStats {
            peak_ready: ready.len(),
            ..Default::default()
        };

        Self {
            slots,
            ready,
            suspended: BinaryHeap::new(),
            trace: Trace::new(trace),
            stats,
        }
    }

    /// Move every suspended task whose resume time has passed to the ready queue
    fn wake_due(&mut self, now: Duration) {
        while self.suspended.peek().is_some_and(|next| next.due <= now) {
            if let Some(entry) = self.suspended.pop() {
                debug!(task = %entry.task, due_ms = entry.due.as_millis() as u64, "RunState::wake_due: ready");
                self.ready.push_back(entry);
            }
        }
        self.stats.peak_ready = self.stats.peak_ready.max(self.ready.len());
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunReport<O> {
    /// One result per task, in registration order
    pub results: Vec<O>,
    /// Span from the start of `run` to completion of the last task
    pub elapsed: Duration,
    pub stats: SchedulerStats,
    pub trace: Trace,
}

impl<O> RunReport<O> {
    /// Results and elapsed time, dropping trace and stats
    pub fn into_parts(self) -> (Vec<O>, Duration) {
        (self.results, self.elapsed)
    }

    pub fn start_order(&self) -> Vec<TaskId> {
        self.trace.start_order()
    }

    pub fn completion_order(&self) -> Vec<TaskId> {
        self.trace.completion_order()
    }
}

/// Single-threaded cooperative scheduler
///
/// Tasks are stepped one at a time. A task that suspends is parked until its
/// resume time; a task that blocks keeps the loop until it suspends or
/// finishes. When nothing is ready the scheduler waits on its clock for the
/// earliest resume time.
pub struct Scheduler<C: Clock> {
    config: SchedulerConfig,
    clock: C,
}

impl Scheduler<Box<dyn Clock>> {
    /// Build a scheduler with the clock named in the config
    pub fn from_config(config: SchedulerConfig) -> Self {
        let clock = config.clock.build();
        Self::new(config, clock)
    }
}

impl<C: Clock> Scheduler<C> {
    /// Create a new scheduler with the given configuration and clock
    pub fn new(config: SchedulerConfig, clock: C) -> Self {
        debug!(?config, "Scheduler::new: called");
        Self { config, clock }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Drive `tasks` to completion
    ///
    /// Results come back in registration order regardless of completion order.
    /// The first failing step aborts the run.
    pub fn run<T, I>(&self, tasks: I) -> Result<RunReport<T::Output>, SchedulerError>
    where
        T: Task,
        I: IntoIterator<Item = T>,
    {
        let timer = RunTimer::start(&self.clock);
        let origin = timer.started_at();
        let mut state = RunState::new(tasks, self.config.trace);
        info!(tasks = state.slots.len(), clock = %self.config.clock, "Scheduler::run: starting");

        loop {
            state.wake_due(self.since(origin));

            let Some(next) = state.ready.pop_front() else {
                match state.suspended.peek() {
                    Some(sleeper) => {
                        debug!(
                            task = %sleeper.task,
                            resume_at_ms = sleeper.due.as_millis() as u64,
                            "Scheduler::run: idle until next resume"
                        );
                        self.clock.sleep_until(origin.saturating_add(sleeper.due));
                        continue;
                    }
                    None => {
                        debug!("Scheduler::run: nothing ready or suspended, finished");
                        break;
                    }
                }
            };

            self.drive(&mut state, next.task, origin)?;
        }

        let elapsed = timer.stop();
        let RunState { slots, trace, stats, .. } = state;
        let total = slots.len();
        let results: Vec<_> = slots.into_iter().filter_map(|slot| slot.result).collect();
        debug_assert_eq!(results.len(), total, "every task must finish before the loop exits");

        info!(
            tasks = total,
            elapsed_ms = elapsed.as_millis() as u64,
            steps = stats.total_steps,
            "Scheduler::run: complete"
        );

        Ok(RunReport {
            results,
            elapsed,
            stats,
            trace,
        })
    }

    /// Step one task until it suspends, finishes, or fails
    fn drive<T: Task>(&self, state: &mut RunState<T>, id: TaskId, origin: Duration) -> Result<(), SchedulerError> {
        let RunState {
            slots,
            suspended,
            trace,
            stats,
            ..
        } = state;
        let slot = &mut slots[id.index()];

        debug_assert!(slot.task.is_some(), "task {id} queued after it finished");
        let Some(task) = slot.task.as_mut() else {
            return Ok(());
        };

        let entered = if slot.status == TaskStatus::Suspended {
            TraceKind::Resumed
        } else {
            TraceKind::Started
        };
        debug!(task = %id, name = %slot.name, status = %slot.status, "Scheduler::drive: stepping");
        slot.status = TaskStatus::Running;
        trace.record(self.since(origin), id, &slot.name, entered);

        loop {
            stats.total_steps += 1;
            let mut ctx = StepContext::new(id, &slot.name, &self.clock, origin, trace);
            let outcome = task.step(&mut ctx);
            let now = self.since(origin);

            match outcome {
                Ok(Step::Suspend(delay)) => {
                    let resume_at = now.saturating_add(delay);
                    debug!(task = %id, resume_at_ms = resume_at.as_millis() as u64, "Scheduler::drive: suspended");
                    slot.status = TaskStatus::Suspended;
                    trace.record(now, id, &slot.name, TraceKind::Suspended { resume_at });
                    suspended.push(QueuedTask::new(resume_at, id));
                    stats.total_suspensions += 1;
                    stats.peak_suspended = stats.peak_suspended.max(suspended.len());
                    return Ok(());
                }
                Ok(Step::Blocked(duration)) => {
                    // No suspension point: keep stepping the same task
                    debug!(task = %id, blocked_ms = duration.as_millis() as u64, "Scheduler::drive: blocked");
                    stats.total_blocking_steps += 1;
                    let blocked_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                    stats.total_blocked_ms = stats.total_blocked_ms.saturating_add(blocked_ms);
                }
                Ok(Step::Done(output)) => {
                    debug!(task = %id, "Scheduler::drive: done");
                    slot.status = TaskStatus::Done;
                    slot.result = Some(output);
                    slot.task = None;
                    trace.record(now, id, &slot.name, TraceKind::Completed);
                    return Ok(());
                }
                Err(source) => {
                    error!(task = %id, name = %slot.name, error = %source, "Scheduler::drive: task failed");
                    return Err(SchedulerError::TaskFailure {
                        task: id,
                        name: slot.name.clone(),
                        source,
                    });
                }
            }
        }
    }

    fn since(&self, origin: Duration) -> Duration {
        self.clock.now().saturating_sub(origin)
    }
}
