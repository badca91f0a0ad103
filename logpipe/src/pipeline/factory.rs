//! Turns pipeline definitions into executable pipelines.

use super::definition::{ConditionalDefinition, PipelineDefinition, ProcessorDefinition, StepDefinition};
use super::registry::{ConditionRegistry, ProcessorRegistry};
use super::{ConditionalStep, ExecutionStep, Pipeline, ProcessorStep};
use crate::errors::PipelineError;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Builds [`Pipeline`]s from definitions using the registered processor and
/// condition factories.
#[derive(Debug, Clone)]
pub struct PipelineFactory {
    processors: Arc<ProcessorRegistry>,
    conditions: Arc<ConditionRegistry>,
}

impl PipelineFactory {
    /// Creates a factory over the given registries.
    #[must_use]
    pub fn new(processors: Arc<ProcessorRegistry>, conditions: Arc<ConditionRegistry>) -> Self {
        Self {
            processors,
            conditions,
        }
    }

    /// The processor registry.
    #[must_use]
    pub fn processors(&self) -> &ProcessorRegistry {
        &self.processors
    }

    /// The condition registry.
    #[must_use]
    pub fn conditions(&self) -> &ConditionRegistry {
        &self.conditions
    }

    /// Creates a pipeline from JSON definition text.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank, the text is not a valid
    /// definition, or a step cannot be built.
    pub fn create(&self, id: &str, definition: &str) -> Result<Pipeline, PipelineError> {
        ensure_id(id)?;
        let definition: PipelineDefinition = serde_json::from_str(definition)?;
        self.create_from_definition(id, definition)
    }

    /// Creates a pipeline from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_from_value(&self, id: &str, definition: Value) -> Result<Pipeline, PipelineError> {
        ensure_id(id)?;
        let definition: PipelineDefinition = serde_json::from_value(definition)?;
        self.create_from_definition(id, definition)
    }

    /// Creates a pipeline from a JSON definition file.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create); also fails if the file cannot be read.
    pub fn create_from_file(
        &self,
        id: &str,
        path: impl AsRef<Path>,
    ) -> Result<Pipeline, PipelineError> {
        ensure_id(id)?;
        let text = std::fs::read_to_string(path)?;
        self.create(id, &text)
    }

    /// Creates a pipeline from a definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank, there are no steps, a processor
    /// or condition type is unknown, a factory fails, or a conditional step
    /// appears in an on-failure list.
    pub fn create_from_definition(
        &self,
        id: &str,
        definition: PipelineDefinition,
    ) -> Result<Pipeline, PipelineError> {
        ensure_id(id)?;
        if definition.steps.is_empty() {
            return Err(PipelineError::NoSteps {
                pipeline: id.to_string(),
            });
        }

        let mut parser = StepsParser::new(&self.processors, &self.conditions);
        let steps = parser.parse_steps(&definition.steps)?;

        let mut pipeline = Pipeline::new(id, steps)?
            .with_ignore_failure(definition.ignore_failure);
        if let Some(name) = definition.name {
            pipeline = pipeline.with_name(name);
        }
        if let Some(description) = definition.description {
            pipeline = pipeline.with_description(description);
        }

        debug!(
            pipeline_id = id,
            processors = parser.count,
            "Created pipeline"
        );
        Ok(pipeline)
    }
}

fn ensure_id(id: &str) -> Result<(), PipelineError> {
    if id.trim().is_empty() {
        Err(PipelineError::EmptyId)
    } else {
        Ok(())
    }
}

/// One parse of a definition tree. Owns the ordinal counter shared by every
/// processor step of the tree.
struct StepsParser<'a> {
    processors: &'a ProcessorRegistry,
    conditions: &'a ConditionRegistry,
    count: usize,
}

impl<'a> StepsParser<'a> {
    fn new(processors: &'a ProcessorRegistry, conditions: &'a ConditionRegistry) -> Self {
        Self {
            processors,
            conditions,
            count: 0,
        }
    }

    fn parse_steps(&mut self, steps: &[StepDefinition]) -> Result<Vec<ExecutionStep>, PipelineError> {
        steps.iter().map(|step| self.parse_step(step)).collect()
    }

    fn parse_step(&mut self, step: &StepDefinition) -> Result<ExecutionStep, PipelineError> {
        match step {
            StepDefinition::Processor(def) => Ok(self.parse_processor(def)?.into()),
            StepDefinition::Conditional(def) => Ok(self.parse_conditional(def)?.into()),
        }
    }

    fn parse_processor(&mut self, def: &ProcessorDefinition) -> Result<ProcessorStep, PipelineError> {
        self.count += 1;
        let name = format!(
            "[{}{}]{}",
            def.processor_type,
            self.count,
            def.name.as_deref().unwrap_or_default()
        );
        let processor = self.processors.create(&def.processor_type, &def.config)?;
        let mut step = ProcessorStep::new(name, processor);

        if let Some(on_failure) = &def.on_failure {
            let handlers = on_failure
                .iter()
                .map(|handler| match handler {
                    StepDefinition::Processor(def) => self.parse_processor(def),
                    StepDefinition::Conditional(_) => Err(PipelineError::definition(format!(
                        "on failure steps of {} may only contain processors",
                        step.name()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            step = step.with_on_failure(handlers);
        }

        Ok(step)
    }

    fn parse_conditional(
        &mut self,
        def: &ConditionalDefinition,
    ) -> Result<ConditionalStep, PipelineError> {
        let condition = self.conditions.resolve(&def.condition)?;
        let on_true = self.parse_steps(&def.on_true)?;
        let on_false = self.parse_steps(&def.on_false)?;
        Ok(ConditionalStep::new(condition, on_true).with_on_false(on_false))
    }
}
