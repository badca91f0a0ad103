//! Pipeline model and construction.
//!
//! This module provides:
//! - The execution-step tree and the immutable [`Pipeline`]
//! - Serializable pipeline definitions
//! - Processor and condition registries
//! - The [`PipelineFactory`] turning definitions into pipelines

mod definition;
mod factory;
mod model;
mod registry;
mod step;

pub use definition::{
    ConditionalDefinition, PipelineDefinition, ProcessorDefinition, StepDefinition,
    CONDITIONAL_KEY,
};
pub use factory::PipelineFactory;
pub use model::Pipeline;
pub use registry::{ConditionFactory, ConditionRegistry, ProcessorFactory, ProcessorRegistry};
pub use step::{ConditionalStep, ExecutionStep, ProcessorStep};

#[cfg(test)]
mod factory_tests;
