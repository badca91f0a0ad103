//! # Logpipe
//!
//! Execution engine for log/event transformation pipelines.
//!
//! A [`Document`](document::Document) (a nested JSON object) enters a
//! pipeline and passes through a tree of processors, leaving mutated,
//! dropped, failed or expired. Logpipe provides:
//!
//! - **Documents**: path-addressed field access with escaped dots
//! - **Step trees**: processor steps with on-failure handlers, conditional
//!   branches, built from JSON definitions against explicit registries
//! - **Execution**: a synchronous tree walker with a failure policy and
//!   per-processor timing
//! - **Supervision**: a watchdog that flags long runs and expires stuck ones
//! - **Metrics**: pluggable trackers for every outcome
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use logpipe::prelude::*;
//!
//! let factory = PipelineFactory::new(Arc::new(processors), Arc::new(conditions));
//! let pipeline = factory.create("nginx", r#"{"steps": [{"addField": {...}}]}"#)?;
//!
//! let metrics: Arc<dyn MetricsTracker> = Arc::new(InMemoryMetricsTracker::new());
//! let watchdog = ExecutionTimeWatchdog::with_metrics(WatchdogConfig::default(), metrics.clone())?;
//! let executor = PipelineExecutor::new(watchdog, metrics);
//!
//! let mut doc = Document::from_value(json!({"message": "GET /"}))?;
//! match executor.execute(&pipeline, &mut doc)? {
//!     ExecutionResult::Success => ship(doc),
//!     ExecutionResult::Dropped => {}
//!     other => warn!("{other}"),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod config;
pub mod document;
pub mod errors;
pub mod executor;
pub mod metrics;
pub mod observability;
pub mod pipeline;
pub mod processor;
pub mod testing;
pub mod watchdog;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::{EngineConfig, LogFormat, LoggingConfig};
    pub use crate::document::{Document, FieldPath, ValueKind};
    pub use crate::errors::{
        ConfigError, DocumentError, LogpipeError, PipelineError, PipelineExecutionError,
        WatchdogError,
    };
    pub use crate::executor::{ExecutionFailure, ExecutionResult, PipelineExecutor};
    pub use crate::metrics::{
        InMemoryMetricsTracker, LoggingMetricsTracker, MetricsTracker, NoOpMetricsTracker,
    };
    pub use crate::observability::init_tracing;
    pub use crate::pipeline::{
        ConditionRegistry, ConditionalStep, ExecutionStep, Pipeline, PipelineDefinition,
        PipelineFactory, ProcessorRegistry, ProcessorStep, StepDefinition,
    };
    pub use crate::processor::{
        Condition, FnCondition, FnProcessor, ProcessContext, ProcessError, ProcessResult,
        Processor,
    };
    pub use crate::watchdog::{ExecutionTimeWatchdog, WatchdogConfig, WatchedExecution};
}
