//! Declarative task sets
//!
//! A scenario is a named list of tasks, each a list of stages, with waits
//! expressed in abstract time units. The CLI loads scenarios from YAML files
//! or from the built-in set; `tasks()` turns one into scripted tasks.
//!
//! ```yaml
//! name: breakfast
//! expect-elapsed: 3
//! tasks:
//!   - name: boil water
//!     result: hot water
//!     stages:
//!       - kind: emit
//!         message: put the kettle on
//!       - kind: sleep
//!         units: 3
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::task::{ScriptedTask, Stage};

/// Built-in scenarios, by name
const BUILTINS: &[(&str, &str)] = &[
    ("a", include_str!("../scenarios/a.yml")),
    ("b", include_str!("../scenarios/b.yml")),
    ("c", include_str!("../scenarios/c.yml")),
    ("breakfast", include_str!("../scenarios/breakfast.yml")),
];

/// Errors loading or validating a scenario
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Scenario '{scenario}' has no tasks")]
    NoTasks { scenario: String },

    #[error("Task '{task}' has no stages")]
    EmptyTask { task: String },

    #[error("Task '{task}' has an invalid duration of {units} units")]
    InvalidDuration { task: String, units: f64 },

    #[error("Unknown built-in scenario '{name}' (available: {available})")]
    UnknownBuiltin { name: String, available: String },
}

/// One stage as written in a scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StageSpec {
    Emit { message: String },
    Sleep { units: f64 },
    Block { units: f64 },
    Fail { message: String },
}

/// One task as written in a scenario file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub name: String,

    /// Result value; defaults to the task name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,

    pub stages: Vec<StageSpec>,
}

/// A named set of tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Expected elapsed time in units, if the author knows it
    #[serde(default, rename = "expect-elapsed", skip_serializing_if = "Option::is_none")]
    pub expect_elapsed: Option<f64>,

    pub tasks: Vec<TaskSpec>,
}

impl Scenario {
    /// Parse and validate a scenario from YAML text
    pub fn from_yaml(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Scenario::load: called");
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Look up a built-in scenario by name
    pub fn builtin(name: &str) -> Result<Self, ScenarioError> {
        let key = name.to_lowercase();
        match BUILTINS.iter().find(|(builtin, _)| *builtin == key) {
            Some((_, text)) => Self::from_yaml(text),
            None => Err(ScenarioError::UnknownBuiltin {
                name: name.to_string(),
                available: Self::builtin_names().join(", "),
            }),
        }
    }

    pub fn builtin_names() -> Vec<&'static str> {
        BUILTINS.iter().map(|(name, _)| *name).collect()
    }

    /// Resolve `target` as a built-in name first, then as a file path
    pub fn resolve(target: &str) -> Result<Self, ScenarioError> {
        match Self::builtin(target) {
            Err(ScenarioError::UnknownBuiltin { .. }) => Self::load(target),
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.tasks.is_empty() {
            return Err(ScenarioError::NoTasks {
                scenario: self.name.clone(),
            });
        }

        for task in &self.tasks {
            if task.stages.is_empty() {
                return Err(ScenarioError::EmptyTask {
                    task: task.name.clone(),
                });
            }
            for stage in &task.stages {
                if let StageSpec::Sleep { units } | StageSpec::Block { units } = stage
                    && (!units.is_finite() || *units < 0.0)
                {
                    return Err(ScenarioError::InvalidDuration {
                        task: task.name.clone(),
                        units: *units,
                    });
                }
            }
        }

        Ok(())
    }

    /// Copy of this scenario with every sleep turned into a block
    pub fn blocking(&self) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|task| TaskSpec {
                stages: task
                    .stages
                    .iter()
                    .map(|stage| match stage {
                        StageSpec::Sleep { units } => StageSpec::Block { units: *units },
                        other => other.clone(),
                    })
                    .collect(),
                ..task.clone()
            })
            .collect();

        Self {
            name: format!("{} (blocking)", self.name),
            description: self.description.clone(),
            expect_elapsed: None,
            tasks,
        }
    }

    /// Build scripted tasks, converting units with `unit`
    pub fn tasks(&self, unit: Duration) -> Result<Vec<ScriptedTask<String>>, ScenarioError> {
        self.validate()?;
        let tasks = self
            .tasks
            .iter()
            .map(|spec| -> Result<ScriptedTask<String>, ScenarioError> {
                let stages = spec
                    .stages
                    .iter()
                    .map(|stage| stage.to_stage(&spec.name, unit))
                    .collect::<Result<Vec<_>, _>>()?;
                let result = spec.result.clone().unwrap_or_else(|| spec.name.clone());
                Ok(ScriptedTask::with_stages(spec.name.clone(), stages, result))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Expected elapsed time, if declared
    ///
    /// An expectation too large to represent saturates at `Duration::MAX`.
    pub fn expected_elapsed(&self, unit: Duration) -> Option<Duration> {
        self.expect_elapsed
            .map(|units| units_to_duration(units, unit).unwrap_or(Duration::MAX))
    }
}

impl StageSpec {
    fn to_stage(&self, task: &str, unit: Duration) -> Result<Stage, ScenarioError> {
        let convert = |units: f64| {
            units_to_duration(units, unit).ok_or_else(|| ScenarioError::InvalidDuration {
                task: task.to_string(),
                units,
            })
        };
        Ok(match self {
            StageSpec::Emit { message } => Stage::Emit(message.clone()),
            StageSpec::Sleep { units } => Stage::Sleep(convert(*units)?),
            StageSpec::Block { units } => Stage::Block(convert(*units)?),
            StageSpec::Fail { message } => Stage::Fail(message.clone()),
        })
    }
}

/// None when the product does not fit in a `Duration`
fn units_to_duration(units: f64, unit: Duration) -> Option<Duration> {
    Duration::try_from_secs_f64(units.max(0.0) * unit.as_secs_f64()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use crate::scheduler::{Scheduler, SchedulerConfig};
    use crate::task::TaskId;
    use tempfile::TempDir;

    fn run_virtual(scenario: &Scenario) -> crate::scheduler::RunReport<String> {
        let scheduler = Scheduler::new(SchedulerConfig::default().virtual_time(), VirtualClock::new());
        scheduler.run(scenario.tasks(Duration::from_secs(1)).unwrap()).unwrap()
    }

    #[test]
    fn test_builtins_meet_their_expectations() {
        for name in Scenario::builtin_names() {
            let scenario = Scenario::builtin(name).unwrap();
            let report = run_virtual(&scenario);
            assert_eq!(
                Some(report.elapsed),
                scenario.expected_elapsed(Duration::from_secs(1)),
                "scenario {name}"
            );
        }
    }

    #[test]
    fn test_builtin_c_completion_order() {
        let report = run_virtual(&Scenario::builtin("c").unwrap());
        assert_eq!(report.completion_order(), vec![TaskId(2), TaskId(0), TaskId(1)]);
        assert_eq!(report.results, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unknown_builtin() {
        let err = Scenario::builtin("lunch").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("lunch"));
        assert!(msg.contains("breakfast"));
    }

    #[test]
    fn test_blocking_variant_is_sequential() {
        let scenario = Scenario::builtin("breakfast").unwrap();
        let blocking = scenario.blocking();
        assert!(blocking.name.ends_with("(blocking)"));
        assert!(blocking.expect_elapsed.is_none());

        let cooperative = run_virtual(&scenario);
        let sequential = run_virtual(&blocking);
        assert_eq!(cooperative.elapsed, Duration::from_secs(3));
        assert_eq!(sequential.elapsed, Duration::from_secs(6));
        assert_eq!(cooperative.results, sequential.results);
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = Scenario::from_yaml("name: nothing\ntasks: []\n").unwrap_err();
        assert!(matches!(err, ScenarioError::NoTasks { .. }));

        let yaml = "name: x\ntasks:\n  - name: idle\n    stages: []\n";
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ScenarioError::EmptyTask { ref task } if task == "idle"));
    }

    #[test]
    fn test_validate_rejects_negative_duration() {
        let yaml = "name: x\ntasks:\n  - name: t\n    stages:\n      - kind: sleep\n        units: -1\n";
        let err = Scenario::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidDuration { .. }));
    }

    #[test]
    fn test_oversized_duration_is_invalid() {
        let yaml = "name: x\ntasks:\n  - name: t\n    stages:\n      - kind: sleep\n        units: 1e30\n";
        let scenario = Scenario::from_yaml(yaml).unwrap();
        let err = scenario.tasks(Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidDuration { ref task, .. } if task == "t"));
    }

    #[test]
    fn test_oversized_unit_is_invalid() {
        let scenario = Scenario::builtin("a").unwrap();
        let err = scenario.tasks(Duration::MAX).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidDuration { .. }));
        assert_eq!(scenario.expected_elapsed(Duration::MAX), Some(Duration::MAX));
    }

    #[test]
    fn test_unknown_stage_kind_is_parse_error() {
        let yaml = "name: x\ntasks:\n  - name: t\n    stages:\n      - kind: nap\n        units: 1\n";
        assert!(matches!(Scenario::from_yaml(yaml), Err(ScenarioError::Parse(_))));
    }

    #[test]
    fn test_load_and_resolve_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lunch.yml");
        let yaml = "name: lunch\ntasks:\n  - name: soup\n    stages:\n      - kind: block\n        units: 0.5\n";
        std::fs::write(&path, yaml).unwrap();

        let scenario = Scenario::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(scenario.name, "lunch");
        let tasks = scenario.tasks(Duration::from_secs(2)).unwrap();
        assert_eq!(tasks[0].stages(), &[Stage::Block(Duration::from_secs(1))]);

        let missing = Scenario::load(temp.path().join("missing.yml")).unwrap_err();
        assert!(matches!(missing, ScenarioError::Io { .. }));
    }

    #[test]
    fn test_fail_stage_round_trips_to_task() {
        let yaml = "name: x\ntasks:\n  - name: t\n    stages:\n      - kind: fail\n        message: nope\n";
        let scenario = Scenario::from_yaml(yaml).unwrap();
        let tasks = scenario.tasks(Duration::from_secs(1)).unwrap();
        assert_eq!(tasks[0].stages(), &[Stage::Fail("nope".to_string())]);
    }
}
