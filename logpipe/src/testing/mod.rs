//! Testing utilities for logpipe pipelines.
//!
//! This module provides:
//! - Mock processors and conditions
//! - A recording metrics tracker
//! - Registries and a factory wired with the mocks

mod fixtures;
mod mocks;
mod recording;

pub use fixtures::{
    test_condition_registry, test_document, test_factory, test_processor_registry,
};
pub use mocks::{
    AddFieldProcessor, DropProcessor, FailingProcessor, FaultingProcessor, FieldExistsCondition,
    FixedCondition, PanickingProcessor, RecordedOutcome, RecordingProcessor, SleepingProcessor,
};
pub use recording::{MetricEvent, RecordingMetricsTracker};
