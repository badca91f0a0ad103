//! The execution-step tree.

use crate::processor::{Condition, Processor};
use std::sync::Arc;

/// A node of the step tree.
#[derive(Debug, Clone)]
pub enum ExecutionStep {
    /// Runs one processor.
    Processor(ProcessorStep),
    /// Chooses a branch based on a condition.
    Conditional(ConditionalStep),
}

impl ExecutionStep {
    /// Returns the number of processor steps in this subtree, on-failure
    /// steps included.
    #[must_use]
    pub fn processor_count(&self) -> usize {
        match self {
            Self::Processor(step) => {
                1 + step.on_failure().map_or(0, <[ProcessorStep]>::len)
            }
            Self::Conditional(step) => step
                .on_true()
                .iter()
                .chain(step.on_false())
                .map(Self::processor_count)
                .sum(),
        }
    }
}

impl From<ProcessorStep> for ExecutionStep {
    fn from(step: ProcessorStep) -> Self {
        Self::Processor(step)
    }
}

impl From<ConditionalStep> for ExecutionStep {
    fn from(step: ConditionalStep) -> Self {
        Self::Conditional(step)
    }
}

/// A processor together with its display name and on-failure handlers.
#[derive(Debug, Clone)]
pub struct ProcessorStep {
    name: String,
    processor: Arc<dyn Processor>,
    on_failure: Option<Vec<ProcessorStep>>,
}

impl ProcessorStep {
    /// Creates a processor step without on-failure handlers.
    #[must_use]
    pub fn new(name: impl Into<String>, processor: Arc<dyn Processor>) -> Self {
        Self {
            name: name.into(),
            processor,
            on_failure: None,
        }
    }

    /// Sets the steps run when this step's processor fails.
    #[must_use]
    pub fn with_on_failure(mut self, steps: Vec<Self>) -> Self {
        self.on_failure = Some(steps);
        self
    }

    /// The step's display name, used in logs and metrics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The processor.
    #[must_use]
    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }

    /// The processor's type.
    #[must_use]
    pub fn processor_type(&self) -> &str {
        self.processor.processor_type()
    }

    /// The on-failure handlers, if configured.
    #[must_use]
    pub fn on_failure(&self) -> Option<&[Self]> {
        self.on_failure.as_deref()
    }
}

/// A condition with the steps to run when it holds or not.
#[derive(Debug, Clone)]
pub struct ConditionalStep {
    condition: Arc<dyn Condition>,
    on_true: Vec<ExecutionStep>,
    on_false: Vec<ExecutionStep>,
}

impl ConditionalStep {
    /// Creates a conditional step with an empty `else` branch.
    #[must_use]
    pub fn new(condition: Arc<dyn Condition>, on_true: Vec<ExecutionStep>) -> Self {
        Self {
            condition,
            on_true,
            on_false: Vec::new(),
        }
    }

    /// Sets the `else` branch.
    #[must_use]
    pub fn with_on_false(mut self, on_false: Vec<ExecutionStep>) -> Self {
        self.on_false = on_false;
        self
    }

    /// The condition.
    #[must_use]
    pub fn condition(&self) -> &dyn Condition {
        self.condition.as_ref()
    }

    /// Steps run when the condition holds.
    #[must_use]
    pub fn on_true(&self) -> &[ExecutionStep] {
        &self.on_true
    }

    /// Steps run otherwise.
    #[must_use]
    pub fn on_false(&self) -> &[ExecutionStep] {
        &self.on_false
    }
}
