//! Pipeline and processor metrics.
//!
//! The executor and the watchdog report every outcome to a
//! [`MetricsTracker`]. Implementations here:
//!
//! - [`NoOpMetricsTracker`] discards everything
//! - [`LoggingMetricsTracker`] emits `tracing` events
//! - [`InMemoryMetricsTracker`] keeps per pipeline and per step counters

mod in_memory;

pub use in_memory::{InMemoryMetricsTracker, PipelineMetrics, ProcessorMetrics};

use crate::document::Document;
use crate::processor::ProcessError;
use tracing::{debug, info, warn, Level};

/// Receiver of pipeline and processor outcomes.
///
/// Every method has an empty default so implementations only override what
/// they track. Calls happen on the executing thread (or the watchdog task)
/// and should be cheap.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsTracker: Send + Sync {
    /// A run completed successfully.
    fn pipeline_succeeded(&self, _pipeline_id: &str, _doc: &Document, _elapsed_ns: u64) {}

    /// A run ended with an unhandled processor failure.
    fn pipeline_failed(&self, _pipeline_id: &str, _doc: &Document) {}

    /// A run was expired by the watchdog.
    fn pipeline_expired(&self, _pipeline_id: &str, _doc: &Document) {}

    /// A run crossed the warning threshold.
    fn execution_overtime(&self, _pipeline_id: &str, _doc: &Document) {}

    /// A processor dropped the document.
    fn document_dropped(&self, _pipeline_id: &str, _doc: &Document) {}

    /// A processor step completed (success or drop).
    fn processor_succeeded(&self, _pipeline_id: &str, _step: &str, _elapsed_ns: u64) {}

    /// A processor step reported a failure.
    fn processor_failed(
        &self,
        _pipeline_id: &str,
        _step: &str,
        _doc: &Document,
        _error: &ProcessError,
    ) {
    }

    /// A processor faulted; the run was aborted.
    fn pipeline_failed_on_unexpected_error(
        &self,
        _pipeline_id: &str,
        _step: &str,
        _doc: &Document,
        _error: &anyhow::Error,
    ) {
    }
}

/// A tracker that discards all metrics.
///
/// Used as the default when no tracker is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetricsTracker;

impl MetricsTracker for NoOpMetricsTracker {}

/// A tracker that logs every outcome using the tracing framework.
///
/// Failures, expiries and faults are always logged at `WARN`; the
/// configured level applies to the rest.
#[derive(Debug, Clone)]
pub struct LoggingMetricsTracker {
    level: Level,
}

impl Default for LoggingMetricsTracker {
    fn default() -> Self {
        Self { level: Level::DEBUG }
    }
}

impl LoggingMetricsTracker {
    /// Creates a new logging tracker with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging tracker.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level logging tracker.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log(&self, event: &str, pipeline_id: &str, step: Option<&str>, elapsed_ns: Option<u64>) {
        if self.level == Level::INFO {
            info!(pipeline_id, step, elapsed_ns, "Metric: {}", event);
        } else {
            debug!(pipeline_id, step, elapsed_ns, "Metric: {}", event);
        }
    }
}

impl MetricsTracker for LoggingMetricsTracker {
    fn pipeline_succeeded(&self, pipeline_id: &str, _doc: &Document, elapsed_ns: u64) {
        self.log("pipeline.succeeded", pipeline_id, None, Some(elapsed_ns));
    }

    fn pipeline_failed(&self, pipeline_id: &str, _doc: &Document) {
        warn!(pipeline_id, "Metric: pipeline.failed");
    }

    fn pipeline_expired(&self, pipeline_id: &str, doc: &Document) {
        warn!(pipeline_id, document = %doc, "Metric: pipeline.expired");
    }

    fn execution_overtime(&self, pipeline_id: &str, _doc: &Document) {
        self.log("execution.overtime", pipeline_id, None, None);
    }

    fn document_dropped(&self, pipeline_id: &str, _doc: &Document) {
        self.log("document.dropped", pipeline_id, None, None);
    }

    fn processor_succeeded(&self, pipeline_id: &str, step: &str, elapsed_ns: u64) {
        self.log("processor.succeeded", pipeline_id, Some(step), Some(elapsed_ns));
    }

    fn processor_failed(&self, pipeline_id: &str, step: &str, _doc: &Document, error: &ProcessError) {
        self.log("processor.failed", pipeline_id, Some(step), None);
        debug!(pipeline_id, step, error = %error, "Processor failure");
    }

    fn pipeline_failed_on_unexpected_error(
        &self,
        pipeline_id: &str,
        step: &str,
        _doc: &Document,
        error: &anyhow::Error,
    ) {
        warn!(pipeline_id, step, error = %error, "Metric: pipeline.unexpected_error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Document {
        Document::from_value(json!({"message": "hello"})).unwrap()
    }

    #[test]
    fn test_noop_tracker() {
        let tracker = NoOpMetricsTracker;
        tracker.pipeline_succeeded("p", &doc(), 10);
        tracker.processor_failed("p", "[fail1]", &doc(), &ProcessError::new("bad"));
        // Should not panic
    }

    #[test]
    fn test_logging_tracker() {
        let tracker = LoggingMetricsTracker::info();
        tracker.pipeline_succeeded("p", &doc(), 10);
        tracker.pipeline_expired("p", &doc());
        tracker.processor_succeeded("p", "[addField1]", 5);
        tracker.pipeline_failed_on_unexpected_error(
            "p",
            "[fault2]",
            &doc(),
            &anyhow::anyhow!("boom"),
        );
        // Should not panic
    }

    #[test]
    fn test_tracker_is_object_safe() {
        let trackers: Vec<Box<dyn MetricsTracker>> = vec![
            Box::new(NoOpMetricsTracker),
            Box::new(LoggingMetricsTracker::debug()),
            Box::new(InMemoryMetricsTracker::new()),
        ];
        for tracker in &trackers {
            tracker.document_dropped("p", &doc());
        }
    }
}
