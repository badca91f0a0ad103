//! Pipeline execution.
//!
//! [`PipelineExecutor::execute`] walks a pipeline's step tree depth-first
//! over one document, applying the failure policy:
//!
//! - a drop ends the run;
//! - a failure runs the step's on-failure handlers if it has any, is
//!   skipped when the pipeline ignores failures, and ends the run otherwise;
//! - an unexpected fault aborts the run with an error.

mod pipeline_executor;
mod result;
mod stopwatch;

pub use pipeline_executor::PipelineExecutor;
pub use result::{ExecutionFailure, ExecutionResult};
pub use stopwatch::{as_nanos, PipelineStopwatch};
