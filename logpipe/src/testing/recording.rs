//! A metrics tracker that records every call.

use parking_lot::RwLock;

use crate::document::Document;
use crate::metrics::MetricsTracker;
use crate::processor::ProcessError;

/// One recorded metrics call.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricEvent {
    /// `pipeline_succeeded`.
    PipelineSucceeded {
        /// Pipeline id.
        pipeline_id: String,
        /// Document at the end of the run.
        doc: Document,
    },
    /// `pipeline_failed`.
    PipelineFailed {
        /// Pipeline id.
        pipeline_id: String,
    },
    /// `pipeline_expired`.
    PipelineExpired {
        /// Pipeline id.
        pipeline_id: String,
        /// Snapshot handed over by the watchdog.
        doc: Document,
    },
    /// `execution_overtime`.
    ExecutionOvertime {
        /// Pipeline id.
        pipeline_id: String,
    },
    /// `document_dropped`.
    DocumentDropped {
        /// Pipeline id.
        pipeline_id: String,
    },
    /// `processor_succeeded`.
    ProcessorSucceeded {
        /// Pipeline id.
        pipeline_id: String,
        /// Step name.
        step: String,
    },
    /// `processor_failed`.
    ProcessorFailed {
        /// Pipeline id.
        pipeline_id: String,
        /// Step name.
        step: String,
        /// Failure message.
        message: String,
    },
    /// `pipeline_failed_on_unexpected_error`.
    UnexpectedError {
        /// Pipeline id.
        pipeline_id: String,
        /// Step name.
        step: String,
        /// Fault message.
        message: String,
    },
}

/// A collecting tracker for testing purposes.
#[derive(Debug, Default)]
pub struct RecordingMetricsTracker {
    events: RwLock<Vec<MetricEvent>>,
}

impl RecordingMetricsTracker {
    /// Creates a new recording tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<MetricEvent> {
        self.events.read().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Counts recorded events matching a predicate.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&MetricEvent) -> bool) -> usize {
        self.events.read().iter().filter(|e| predicate(e)).count()
    }

    /// Step names of `processor_succeeded` calls, in order.
    #[must_use]
    pub fn succeeded_steps(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter_map(|e| match e {
                MetricEvent::ProcessorSucceeded { step, .. } => Some(step.clone()),
                _ => None,
            })
            .collect()
    }

    /// Step names of `processor_failed` calls, in order.
    #[must_use]
    pub fn failed_steps(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter_map(|e| match e {
                MetricEvent::ProcessorFailed { step, .. } => Some(step.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: MetricEvent) {
        self.events.write().push(event);
    }
}

impl MetricsTracker for RecordingMetricsTracker {
    fn pipeline_succeeded(&self, pipeline_id: &str, doc: &Document, _elapsed_ns: u64) {
        self.push(MetricEvent::PipelineSucceeded {
            pipeline_id: pipeline_id.to_string(),
            doc: doc.clone(),
        });
    }

    fn pipeline_failed(&self, pipeline_id: &str, _doc: &Document) {
        self.push(MetricEvent::PipelineFailed {
            pipeline_id: pipeline_id.to_string(),
        });
    }

    fn pipeline_expired(&self, pipeline_id: &str, doc: &Document) {
        self.push(MetricEvent::PipelineExpired {
            pipeline_id: pipeline_id.to_string(),
            doc: doc.clone(),
        });
    }

    fn execution_overtime(&self, pipeline_id: &str, _doc: &Document) {
        self.push(MetricEvent::ExecutionOvertime {
            pipeline_id: pipeline_id.to_string(),
        });
    }

    fn document_dropped(&self, pipeline_id: &str, _doc: &Document) {
        self.push(MetricEvent::DocumentDropped {
            pipeline_id: pipeline_id.to_string(),
        });
    }

    fn processor_succeeded(&self, pipeline_id: &str, step: &str, _elapsed_ns: u64) {
        self.push(MetricEvent::ProcessorSucceeded {
            pipeline_id: pipeline_id.to_string(),
            step: step.to_string(),
        });
    }

    fn processor_failed(&self, pipeline_id: &str, step: &str, _doc: &Document, error: &ProcessError) {
        self.push(MetricEvent::ProcessorFailed {
            pipeline_id: pipeline_id.to_string(),
            step: step.to_string(),
            message: error.to_string(),
        });
    }

    fn pipeline_failed_on_unexpected_error(
        &self,
        pipeline_id: &str,
        step: &str,
        _doc: &Document,
        error: &anyhow::Error,
    ) {
        self.push(MetricEvent::UnexpectedError {
            pipeline_id: pipeline_id.to_string(),
            step: step.to_string(),
            message: error.to_string(),
        });
    }
}
