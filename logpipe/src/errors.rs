//! Error types for the logpipe engine.
//!
//! Processor-reported outcomes (failure, drop) are values, never errors.
//! The types here cover document access misses, pipeline construction,
//! configuration, the watchdog, and the one error `execute` can return:
//! an unexpected processor fault.

use thiserror::Error;

/// The main error type for logpipe operations.
#[derive(Debug, Error)]
pub enum LogpipeError {
    /// A document access error.
    #[error("{0}")]
    Document(#[from] DocumentError),

    /// A pipeline construction or definition error.
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// An unexpected fault while executing a pipeline.
    #[error("{0}")]
    Execution(#[from] PipelineExecutionError),

    /// A watchdog setup error.
    #[error("{0}")]
    Watchdog(#[from] WatchdogError),

    /// A configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by path-addressed document access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// A document must hold at least one field.
    #[error("Document cannot be empty")]
    Empty,

    /// Nothing is stored at the requested path.
    #[error("Couldn't resolve field in path [{path}]")]
    FieldNotFound {
        /// The requested path, as written by the caller.
        path: String,
    },

    /// The field exists but cannot be read as the requested type.
    #[error("Field in path [{path}] is not of type {expected}")]
    TypeMismatch {
        /// The requested path.
        path: String,
        /// Name of the expected type.
        expected: String,
    },

    /// A document can only be built from a JSON object.
    #[error("Document source must be a JSON object")]
    NotAnObject,
}

impl DocumentError {
    /// Creates a field-not-found error.
    #[must_use]
    pub fn field_not_found(path: impl Into<String>) -> Self {
        Self::FieldNotFound { path: path.into() }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// Boxed error returned by processor and condition factories.
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline id is empty or whitespace-only.
    #[error("Pipeline id cannot be empty or whitespace-only")]
    EmptyId,

    /// The pipeline has no root steps.
    #[error("Pipeline '{pipeline}' has no steps")]
    NoSteps {
        /// The pipeline id.
        pipeline: String,
    },

    /// No factory is registered for a processor type.
    #[error("Unknown processor type: {name}")]
    UnknownProcessor {
        /// The processor type.
        name: String,
    },

    /// No factory is registered for a condition type.
    #[error("Unknown condition type: {name}")]
    UnknownCondition {
        /// The condition type.
        name: String,
    },

    /// The definition is structurally invalid.
    #[error("Invalid pipeline definition: {message}")]
    Definition {
        /// What is wrong with the definition.
        message: String,
    },

    /// A registered factory rejected its configuration.
    #[error("Failed to create {kind} '{name}': {source}")]
    Factory {
        /// `processor` or `condition`.
        kind: &'static str,
        /// The processor or condition type.
        name: String,
        /// The factory's error.
        #[source]
        source: FactoryError,
    },

    /// The definition is not valid JSON or does not match the schema.
    #[error("Failed to parse pipeline definition: {0}")]
    Json(#[from] serde_json::Error),

    /// The definition file could not be read.
    #[error("Failed to read pipeline definition: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Creates a definition error.
    #[must_use]
    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition {
            message: message.into(),
        }
    }

    /// Creates an unknown processor error.
    #[must_use]
    pub fn unknown_processor(name: impl Into<String>) -> Self {
        Self::UnknownProcessor { name: name.into() }
    }

    /// Creates an unknown condition error.
    #[must_use]
    pub fn unknown_condition(name: impl Into<String>) -> Self {
        Self::UnknownCondition { name: name.into() }
    }
}

/// An unexpected fault escaped a processor during `execute`.
///
/// Wraps the root cause together with the pipeline and step it came from.
#[derive(Debug, Error)]
#[error("failed to execute pipeline [{pipeline_name}] at step {step_name}: {source}")]
pub struct PipelineExecutionError {
    /// The pipeline name.
    pub pipeline_name: String,
    /// The step whose processor faulted.
    pub step_name: String,
    /// The root cause.
    #[source]
    pub source: anyhow::Error,
}

impl PipelineExecutionError {
    /// Creates a new pipeline execution error.
    #[must_use]
    pub fn new(
        pipeline_name: impl Into<String>,
        step_name: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            step_name: step_name.into(),
            source,
        }
    }
}

/// Errors raised when starting the watchdog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Thresholds must be positive and ordered.
    #[error("Invalid watchdog thresholds: warning={warning_ms}ms, expiry={expiry_ms}ms")]
    InvalidThresholds {
        /// The warning threshold.
        warning_ms: u64,
        /// The expiry threshold.
        expiry_ms: u64,
    },

    /// The poller thread or its runtime could not be started.
    #[error("Failed to start watchdog poller: {message}")]
    Spawn {
        /// The underlying I/O error.
        message: String,
    },
}

impl WatchdogError {
    /// Creates a spawn error from the I/O error that caused it.
    pub fn spawn(err: std::io::Error) -> Self {
        Self::Spawn {
            message: err.to_string(),
        }
    }
}

/// Errors raised while loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON.
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] WatchdogError),
}
