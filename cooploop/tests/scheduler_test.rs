//! Integration tests for the cooperative scheduler
//!
//! Virtual-clock tests assert exact timings; system-clock tests use a short
//! time unit and a tolerance.

use std::time::Duration;

use cooploop::{
    Clock, Scenario, ScriptedTask, Scheduler, SchedulerConfig, SchedulerError, SystemClock, TaskId, Tolerance,
    VirtualClock,
};
use proptest::prelude::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn virtual_scheduler() -> Scheduler<VirtualClock> {
    Scheduler::new(SchedulerConfig::default().virtual_time(), VirtualClock::new())
}

fn sleeper(i: usize, wait: Duration) -> ScriptedTask<usize> {
    ScriptedTask::new(format!("sleeper-{i}"), i).sleep(wait)
}

// =============================================================================
// Scenario tests (virtual clock)
// =============================================================================

#[test]
fn test_scenario_a_two_sleeps() {
    let scenario = Scenario::builtin("a").unwrap();
    let report = virtual_scheduler()
        .run(scenario.tasks(Duration::from_secs(1)).unwrap())
        .unwrap();

    assert_eq!(report.elapsed, Duration::from_secs(2));
    assert_eq!(report.results, vec!["task1 result", "task2 result"]);
}

#[test]
fn test_scenario_b_block_then_sleep() {
    let scenario = Scenario::builtin("b").unwrap();
    let report = virtual_scheduler()
        .run(scenario.tasks(Duration::from_secs(1)).unwrap())
        .unwrap();

    assert_eq!(report.elapsed, Duration::from_secs(3));
    assert_eq!(report.results, vec!["task1 result", "task2 result"]);
    assert_eq!(
        report.trace.messages(),
        vec!["task1 started", "task1 finished", "task2 started", "task2 finished"]
    );
}

#[test]
fn test_scenario_c_completion_by_duration() {
    let scenario = Scenario::builtin("c").unwrap();
    let report = virtual_scheduler()
        .run(scenario.tasks(Duration::from_secs(1)).unwrap())
        .unwrap();

    assert_eq!(report.elapsed, Duration::from_secs(4));
    assert_eq!(report.start_order(), vec![TaskId(0), TaskId(1), TaskId(2)]);
    assert_eq!(report.completion_order(), vec![TaskId(2), TaskId(0), TaskId(1)]);
}

#[test]
fn test_blocking_is_slower_than_sleeping() {
    let unit = Duration::from_secs(1);
    let scenario = Scenario::builtin("a").unwrap();

    let cooperative = virtual_scheduler().run(scenario.tasks(unit).unwrap()).unwrap();
    let blocking = virtual_scheduler()
        .run(scenario.blocking().tasks(unit).unwrap())
        .unwrap();

    assert!(blocking.elapsed > cooperative.elapsed);
    assert_eq!(blocking.elapsed, Duration::from_secs(3));
}

#[test]
fn test_failing_task_surfaces_error() {
    let yaml = r#"
name: burnt
tasks:
  - name: toast
    stages:
      - kind: sleep
        units: 1
      - kind: fail
        message: toast burnt
  - name: coffee
    stages:
      - kind: sleep
        units: 5
"#;
    let scenario = Scenario::from_yaml(yaml).unwrap();
    let scheduler = virtual_scheduler();
    let err = scheduler
        .run(scenario.tasks(Duration::from_secs(1)).unwrap())
        .unwrap_err();

    let SchedulerError::TaskFailure { task, name, source } = err;
    assert_eq!(task, TaskId(0));
    assert_eq!(name, "toast");
    assert!(source.to_string().contains("toast burnt"));
    // coffee never got to finish its wait
    assert_eq!(scheduler.clock().now(), Duration::from_secs(1));
}

// =============================================================================
// Wall-clock tests
// =============================================================================

#[test]
fn test_system_clock_sleeps_overlap() {
    let scheduler = Scheduler::new(SchedulerConfig::default(), SystemClock::new());
    let report = scheduler.run(vec![sleeper(0, ms(50)), sleeper(1, ms(100))]).unwrap();

    assert!(report.elapsed >= ms(100));
    assert!(Tolerance::from_millis(45).approx(report.elapsed, ms(100)), "{:?}", report.elapsed);
    assert_eq!(report.results, vec![0, 1]);
}

#[test]
fn test_system_clock_block_serializes() {
    let scheduler = Scheduler::new(SchedulerConfig::default(), SystemClock::new());
    let tasks = vec![
        ScriptedTask::new("blocker", 0).block(ms(50)),
        ScriptedTask::new("sleeper", 1).sleep(ms(100)),
    ];
    let report = scheduler.run(tasks).unwrap();

    assert!(report.elapsed >= ms(150));
    assert!(Tolerance::from_millis(45).approx(report.elapsed, ms(150)), "{:?}", report.elapsed);
}

// =============================================================================
// Properties (virtual clock)
// =============================================================================

proptest! {
    #[test]
    fn prop_sleeps_take_the_longest_wait(waits in prop::collection::vec(0u64..1000, 1..8)) {
        let tasks: Vec<_> = waits.iter().enumerate().map(|(i, w)| sleeper(i, ms(*w))).collect();
        let report = virtual_scheduler().run(tasks).unwrap();

        let longest = waits.iter().copied().max().unwrap_or(0);
        prop_assert_eq!(report.elapsed, ms(longest));
        prop_assert_eq!(report.results, (0..waits.len()).collect::<Vec<_>>());
    }

    #[test]
    fn prop_completion_order_sorted_by_wait(waits in prop::collection::vec(0u64..1000, 1..8)) {
        let tasks: Vec<_> = waits.iter().enumerate().map(|(i, w)| sleeper(i, ms(*w))).collect();
        let report = virtual_scheduler().run(tasks).unwrap();

        let mut expected: Vec<_> = (0..waits.len()).collect();
        expected.sort_by_key(|&i| (waits[i], i));
        let expected: Vec<_> = expected.into_iter().map(TaskId).collect();
        prop_assert_eq!(report.completion_order(), expected);
    }

    #[test]
    fn prop_leading_block_adds_to_longest_wait(
        block in 1u64..1000,
        waits in prop::collection::vec(0u64..1000, 0..6),
    ) {
        let mut tasks = vec![ScriptedTask::new("blocker".to_string(), 0usize).block(ms(block))];
        tasks.extend(waits.iter().enumerate().map(|(i, w)| sleeper(i + 1, ms(*w))));
        let report = virtual_scheduler().run(tasks).unwrap();

        let longest = waits.iter().copied().max().unwrap_or(0);
        prop_assert_eq!(report.elapsed, ms(block + longest));
        prop_assert!(report.elapsed > ms(longest));
    }

    #[test]
    fn prop_runs_are_repeatable(waits in prop::collection::vec(0u64..500, 1..6)) {
        let build = || waits.iter().enumerate().map(|(i, w)| sleeper(i, ms(*w))).collect::<Vec<_>>();
        let scheduler = virtual_scheduler();
        let first = scheduler.run(build()).unwrap();
        let second = scheduler.run(build()).unwrap();

        prop_assert_eq!(first.results, second.results);
        prop_assert_eq!(first.elapsed, second.elapsed);
        prop_assert_eq!(first.trace.events(), second.trace.events());
    }
}
