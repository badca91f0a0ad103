//! The pipeline walker.

use super::result::{ExecutionFailure, ExecutionResult};
use super::stopwatch::{as_nanos, PipelineStopwatch};
use crate::cancellation::CancellationToken;
use crate::document::Document;
use crate::errors::PipelineExecutionError;
use crate::metrics::MetricsTracker;
use crate::pipeline::{ExecutionStep, Pipeline, ProcessorStep};
use crate::processor::{ProcessContext, ProcessResult};
use crate::watchdog::ExecutionTimeWatchdog;
use anyhow::anyhow;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Runs documents through pipelines.
///
/// One executor is shared by every caller; `execute` runs synchronously on
/// the calling thread while the watchdog supervises it from its own thread.
#[derive(Clone)]
pub struct PipelineExecutor {
    watchdog: Arc<ExecutionTimeWatchdog>,
    metrics: Arc<dyn MetricsTracker>,
}

impl PipelineExecutor {
    /// Creates a new executor.
    #[must_use]
    pub fn new(watchdog: Arc<ExecutionTimeWatchdog>, metrics: Arc<dyn MetricsTracker>) -> Self {
        Self { watchdog, metrics }
    }

    /// The watchdog supervising runs.
    #[must_use]
    pub fn watchdog(&self) -> &ExecutionTimeWatchdog {
        &self.watchdog
    }

    /// The metrics tracker.
    #[must_use]
    pub fn metrics(&self) -> &dyn MetricsTracker {
        self.metrics.as_ref()
    }

    /// Runs the document through the pipeline, mutating it in place.
    ///
    /// Processor failures and drops are reported through the returned
    /// [`ExecutionResult`] and the metrics tracker.
    ///
    /// # Errors
    ///
    /// Returns an error if a processor faulted (returned `Err` or
    /// panicked). The fault is reported to the metrics tracker once and is
    /// never covered by the pipeline's `ignore_failure`.
    pub fn execute(
        &self,
        pipeline: &Pipeline,
        doc: &mut Document,
    ) -> Result<ExecutionResult, PipelineExecutionError> {
        let stopwatch = PipelineStopwatch::start();
        let cancellation = Arc::new(CancellationToken::new());
        let execution_id = self
            .watchdog
            .start(pipeline.id(), doc, Arc::clone(&cancellation));
        let _registration = Registration {
            watchdog: &self.watchdog,
            execution_id,
        };

        debug!(
            pipeline_id = pipeline.id(),
            execution_id,
            "Executing pipeline"
        );

        let mut run = Run {
            metrics: self.metrics.as_ref(),
            pipeline,
            execution_id,
            cancellation: &cancellation,
            stopwatch,
        };
        let walked = run.walk(pipeline.steps(), doc)?;

        let already_finished = self.watchdog.stop(execution_id);
        let result = match walked {
            _ if already_finished => ExecutionResult::Expired,
            Some(result) => result,
            None => ExecutionResult::Success,
        };

        match &result {
            ExecutionResult::Success => {
                self.metrics
                    .pipeline_succeeded(pipeline.id(), doc, run.stopwatch.elapsed_ns());
            }
            ExecutionResult::Dropped => self.metrics.document_dropped(pipeline.id(), doc),
            ExecutionResult::Failure(_) => self.metrics.pipeline_failed(pipeline.id(), doc),
            // Cancelled by something other than the watchdog; report it here
            // so the run is still counted once.
            ExecutionResult::Expired if !already_finished => {
                self.metrics.pipeline_expired(pipeline.id(), doc);
            }
            ExecutionResult::Expired => {}
        }

        debug!(
            pipeline_id = pipeline.id(),
            execution_id,
            result = %result,
            elapsed_ns = run.stopwatch.elapsed_ns(),
            "Pipeline finished"
        );
        Ok(result)
    }
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("watchdog", &self.watchdog)
            .finish_non_exhaustive()
    }
}

/// Deregisters a run from the watchdog on every exit path.
///
/// The run is finished before it is removed, so a run leaving on a fault
/// can no longer be expired.
struct Registration<'a> {
    watchdog: &'a ExecutionTimeWatchdog,
    execution_id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.watchdog.stop(self.execution_id);
        self.watchdog.remove(self.execution_id);
    }
}

/// State of one walk over the step tree.
struct Run<'a> {
    metrics: &'a dyn MetricsTracker,
    pipeline: &'a Pipeline,
    execution_id: u64,
    cancellation: &'a CancellationToken,
    stopwatch: PipelineStopwatch,
}

impl Run<'_> {
    /// Walks the steps in order. Returns `Some` when the run must end early.
    fn walk(
        &mut self,
        steps: &[ExecutionStep],
        doc: &mut Document,
    ) -> Result<Option<ExecutionResult>, PipelineExecutionError> {
        for step in steps {
            if self.cancellation.is_cancelled() {
                let reason = self.cancellation.reason();
                debug!(
                    pipeline_id = self.pipeline.id(),
                    execution_id = self.execution_id,
                    reason = reason.as_deref(),
                    "Run cancelled, stopping"
                );
                return Ok(Some(ExecutionResult::Expired));
            }

            let ended = match step {
                ExecutionStep::Processor(step) => self.run_step(step, doc)?,
                ExecutionStep::Conditional(step) => {
                    let matched = step.condition().evaluate(doc);
                    trace!(
                        pipeline_id = self.pipeline.id(),
                        matched,
                        "Evaluated condition"
                    );
                    let branch = if matched {
                        step.on_true()
                    } else {
                        step.on_false()
                    };
                    self.walk(branch, doc)?
                }
            };
            if ended.is_some() {
                return Ok(ended);
            }
        }
        Ok(None)
    }

    /// Runs a processor step and applies the failure policy to its outcome.
    fn run_step(
        &mut self,
        step: &ProcessorStep,
        doc: &mut Document,
    ) -> Result<Option<ExecutionResult>, PipelineExecutionError> {
        match self.invoke(step, doc)? {
            ProcessResult::Success => Ok(None),
            ProcessResult::Drop => Ok(Some(ExecutionResult::Dropped)),
            ProcessResult::Failure(error) => {
                if let Some(handlers) = step.on_failure() {
                    for handler in handlers {
                        // Outcomes of failure handlers are reported but not
                        // handled further.
                        self.invoke(handler, doc)?;
                    }
                    Ok(None)
                } else if self.pipeline.ignore_failure() {
                    Ok(None)
                } else {
                    Ok(Some(ExecutionResult::Failure(ExecutionFailure {
                        processor_type: step.processor_type().to_string(),
                        step_name: step.name().to_string(),
                        error,
                    })))
                }
            }
        }
    }

    /// Invokes one processor, timing and reporting it.
    fn invoke(
        &mut self,
        step: &ProcessorStep,
        doc: &mut Document,
    ) -> Result<ProcessResult, PipelineExecutionError> {
        let pipeline_id = self.pipeline.id();
        trace!(
            pipeline_id,
            step = step.name(),
            execution_id = self.execution_id,
            "Running processor"
        );

        let ctx = ProcessContext::new(pipeline_id, step.name(), self.execution_id, self.cancellation);
        let outcome = catch_unwind(AssertUnwindSafe(|| step.processor().process(doc, &ctx)))
            .unwrap_or_else(|payload| Err(panic_error(payload.as_ref())));
        let elapsed_ns = as_nanos(self.stopwatch.lap());

        match outcome {
            Ok(result) => {
                match &result {
                    ProcessResult::Success | ProcessResult::Drop => {
                        self.metrics
                            .processor_succeeded(pipeline_id, step.name(), elapsed_ns);
                    }
                    ProcessResult::Failure(error) => {
                        trace!(
                            pipeline_id,
                            step = step.name(),
                            error = %error,
                            "Processor failed"
                        );
                        self.metrics
                            .processor_failed(pipeline_id, step.name(), doc, error);
                    }
                }
                Ok(result)
            }
            Err(fault) => {
                warn!(
                    pipeline_id,
                    step = step.name(),
                    execution_id = self.execution_id,
                    error = %fault,
                    "Unexpected error while executing pipeline"
                );
                self.metrics
                    .pipeline_failed_on_unexpected_error(pipeline_id, step.name(), doc, &fault);
                Err(PipelineExecutionError::new(
                    self.pipeline.name(),
                    step.name(),
                    fault,
                ))
            }
        }
    }
}

fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    anyhow!("processor panicked: {message}")
}
