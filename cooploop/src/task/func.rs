//! Closure-backed tasks

use std::marker::PhantomData;

use super::{Step, StepContext, Task};
use crate::error::TaskError;

/// A task whose steps are produced by a closure
///
/// The closure owns whatever state it needs and is called once per step.
pub struct FnTask<F, O> {
    name: String,
    step_fn: F,
    _output: PhantomData<fn() -> O>,
}

impl<F, O> FnTask<F, O>
where
    F: FnMut(&mut StepContext<'_>) -> Result<Step<O>, TaskError>,
{
    pub fn new(name: impl Into<String>, step_fn: F) -> Self {
        Self {
            name: name.into(),
            step_fn,
            _output: PhantomData,
        }
    }
}

impl<F, O> Task for FnTask<F, O>
where
    F: FnMut(&mut StepContext<'_>) -> Result<Step<O>, TaskError>,
{
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, ctx: &mut StepContext<'_>) -> Result<Step<O>, TaskError> {
        (self.step_fn)(ctx)
    }
}

impl<F, O> std::fmt::Debug for FnTask<F, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTask").field("name", &self.name).finish_non_exhaustive()
    }
}
