//! Outcome of a pipeline execution.

use crate::processor::ProcessError;
use std::fmt;

/// How a pipeline run ended.
///
/// Unexpected processor faults are not a variant: `execute` returns them as
/// an error.
#[derive(Debug)]
#[must_use]
pub enum ExecutionResult {
    /// Every step completed or had its failure handled.
    Success,
    /// A processor dropped the document.
    Dropped,
    /// The watchdog expired the run.
    Expired,
    /// A processor failure was not handled.
    Failure(ExecutionFailure),
}

impl ExecutionResult {
    /// Returns true on success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns true if the document was dropped.
    #[must_use]
    pub const fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped)
    }

    /// Returns true if the run was expired.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Returns true on an unhandled failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&ExecutionFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            _ => None,
        }
    }
}

/// The unhandled failure that ended a run.
#[derive(Debug)]
pub struct ExecutionFailure {
    /// Type of the failing processor.
    pub processor_type: String,
    /// Name of the failing step.
    pub step_name: String,
    /// The failure reported by the processor.
    pub error: ProcessError,
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} failed: {}", self.step_name, self.error)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Dropped => f.write_str("dropped"),
            Self::Expired => f.write_str("expired"),
            Self::Failure(failure) => write!(f, "failure ({failure})"),
        }
    }
}
