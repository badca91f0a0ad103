//! The immutable pipeline value.

use super::ExecutionStep;
use crate::errors::PipelineError;

/// A named, identified step tree with its failure policy.
///
/// Built once and shared read-only (usually behind an `Arc`) by every
/// concurrent execution.
#[derive(Debug, Clone)]
pub struct Pipeline {
    id: String,
    name: String,
    description: Option<String>,
    steps: Vec<ExecutionStep>,
    ignore_failure: bool,
}

impl Pipeline {
    /// Creates a pipeline named after its id, failing fast on failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is blank or there are no steps.
    pub fn new(id: impl Into<String>, steps: Vec<ExecutionStep>) -> Result<Self, PipelineError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PipelineError::EmptyId);
        }
        if steps.is_empty() {
            return Err(PipelineError::NoSteps { pipeline: id });
        }

        Ok(Self {
            name: id.clone(),
            id,
            description: None,
            steps,
            ignore_failure: false,
        })
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets whether unhandled processor failures are ignored.
    #[must_use]
    pub const fn with_ignore_failure(mut self, ignore_failure: bool) -> Self {
        self.ignore_failure = ignore_failure;
        self
    }

    /// The pipeline id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The root steps.
    #[must_use]
    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    /// Whether unhandled processor failures are ignored.
    #[must_use]
    pub const fn ignore_failure(&self) -> bool {
        self.ignore_failure
    }

    /// Total number of processor steps in the tree.
    #[must_use]
    pub fn processor_count(&self) -> usize {
        self.steps.iter().map(ExecutionStep::processor_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ProcessorStep;
    use crate::testing::AddFieldProcessor;
    use std::sync::Arc;

    fn one_step() -> Vec<ExecutionStep> {
        vec![ProcessorStep::new("[addField1]", Arc::new(AddFieldProcessor::new("x", "v"))).into()]
    }

    #[test]
    fn test_pipeline_creation() {
        let pipeline = Pipeline::new("nginx", one_step())
            .unwrap()
            .with_description("nginx access logs")
            .with_ignore_failure(true);

        assert_eq!(pipeline.id(), "nginx");
        assert_eq!(pipeline.name(), "nginx");
        assert_eq!(pipeline.description(), Some("nginx access logs"));
        assert!(pipeline.ignore_failure());
        assert_eq!(pipeline.processor_count(), 1);
    }

    #[test]
    fn test_pipeline_empty_id() {
        assert!(matches!(Pipeline::new("", one_step()), Err(PipelineError::EmptyId)));
        assert!(matches!(Pipeline::new("   ", one_step()), Err(PipelineError::EmptyId)));
    }

    #[test]
    fn test_pipeline_without_steps() {
        assert!(matches!(
            Pipeline::new("p", Vec::new()),
            Err(PipelineError::NoSteps { .. })
        ));
    }
}
