//! cooploop - single-threaded cooperative task scheduler
//!
//! Tasks are explicit state machines stepped by one loop. A task either
//! suspends for a duration (the loop runs other tasks meanwhile), blocks the
//! loop for a duration, or finishes with a result. The same loop runs on
//! wall-clock time or on simulated time.
//!
//! # Modules
//!
//! - [`scheduler`] - the event loop and its run report
//! - [`task`] - the `Task` trait, scripted and closure-backed tasks
//! - [`clock`] - system and virtual clocks
//! - [`timing`] - run timer and tolerance checks
//! - [`trace`] - per-run execution trace
//! - [`scenario`] - YAML task sets and the built-in demos
//! - [`report`] - text and JSON summaries
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use cooploop::{ScriptedTask, Scheduler, SchedulerConfig, VirtualClock};
//!
//! let scheduler = Scheduler::new(SchedulerConfig::default(), VirtualClock::new());
//! let report = scheduler
//!     .run(vec![
//!         ScriptedTask::new("boil water", "hot water").sleep(Duration::from_secs(3)),
//!         ScriptedTask::new("grind beans", "ground coffee").sleep(Duration::from_secs(1)),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(report.results, vec!["hot water", "ground coffee"]);
//! assert_eq!(report.elapsed, Duration::from_secs(3));
//! ```

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod report;
pub mod scenario;
pub mod scheduler;
pub mod task;
pub mod timing;
pub mod trace;

pub use clock::{Clock, ClockMode, SystemClock, VirtualClock};
pub use config::{Config, ScenarioConfig};
pub use error::{SchedulerError, TaskError};
pub use report::{Comparison, RunSummary};
pub use scenario::{Scenario, ScenarioError};
pub use scheduler::{RunReport, Scheduler, SchedulerConfig, SchedulerStats};
pub use task::{FnTask, ScriptedTask, Stage, Step, StepContext, Task, TaskId, TaskStatus};
pub use timing::{RunTimer, Tolerance, measure};
pub use trace::{Trace, TraceEvent, TraceKind};
