//! Tasks assembled from a fixed list of stages

use std::time::Duration;

use tracing::debug;

use super::{Step, StepContext, Task};
use crate::error::TaskError;

/// One stage of a scripted task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Log a message; does not end the step
    Emit(String),
    /// Non-blocking wait
    Sleep(Duration),
    /// Blocking wait; the loop is held for the full duration
    Block(Duration),
    /// Fault with a message
    Fail(String),
}

/// A task that walks its stages in order and then returns its result
#[derive(Debug, Clone)]
pub struct ScriptedTask<O> {
    name: String,
    stages: Vec<Stage>,
    cursor: usize,
    result: Option<O>,
}

impl<O> ScriptedTask<O> {
    pub fn new(name: impl Into<String>, result: O) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            cursor: 0,
            result: Some(result),
        }
    }

    pub fn with_stages(name: impl Into<String>, stages: Vec<Stage>, result: O) -> Self {
        Self {
            stages,
            ..Self::new(name, result)
        }
    }

    pub fn emit(mut self, message: impl Into<String>) -> Self {
        self.stages.push(Stage::Emit(message.into()));
        self
    }

    pub fn sleep(mut self, duration: Duration) -> Self {
        self.stages.push(Stage::Sleep(duration));
        self
    }

    pub fn block(mut self, duration: Duration) -> Self {
        self.stages.push(Stage::Block(duration));
        self
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.stages.push(Stage::Fail(message.into()));
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_none()
    }
}

impl<O> Task for ScriptedTask<O> {
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<Step<O>, TaskError> {
        while let Some(stage) = self.stages.get(self.cursor) {
            self.cursor += 1;
            match stage {
                Stage::Emit(message) => ctx.emit(message.clone()),
                Stage::Sleep(duration) => return Ok(Step::Suspend(*duration)),
                Stage::Block(duration) => {
                    ctx.block(*duration);
                    return Ok(Step::Blocked(*duration));
                }
                Stage::Fail(message) => {
                    debug!(task = %ctx.id(), %message, "ScriptedTask::step: fail stage");
                    self.cursor = self.stages.len();
                    self.result = None;
                    return Err(TaskError::fault(message.clone()));
                }
            }
        }

        match self.result.take() {
            Some(result) => Ok(Step::Done(result)),
            None => Err(TaskError::AlreadyComplete {
                name: self.name.clone(),
            }),
        }
    }
}
