//! In-memory metrics counters.

use super::MetricsTracker;
use crate::document::Document;
use crate::processor::ProcessError;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct PipelineCounters {
    succeeded: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
    expired: AtomicU64,
    overtime: AtomicU64,
    unexpected_errors: AtomicU64,
    total_ns: AtomicU64,
}

impl PipelineCounters {
    fn snapshot(&self) -> PipelineMetrics {
        PipelineMetrics {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            overtime: self.overtime.load(Ordering::Relaxed),
            unexpected_errors: self.unexpected_errors.load(Ordering::Relaxed),
            total_ns: self.total_ns.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
struct ProcessorCounters {
    succeeded: AtomicU64,
    failed: AtomicU64,
    total_ns: AtomicU64,
}

impl ProcessorCounters {
    fn snapshot(&self) -> ProcessorMetrics {
        ProcessorMetrics {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            total_ns: self.total_ns.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counters of one pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    /// Successful runs.
    pub succeeded: u64,
    /// Runs ended by an unhandled failure.
    pub failed: u64,
    /// Runs ended by a drop.
    pub dropped: u64,
    /// Runs expired by the watchdog.
    pub expired: u64,
    /// Runs that crossed the warning threshold.
    pub overtime: u64,
    /// Runs aborted by a processor fault.
    pub unexpected_errors: u64,
    /// Total time of successful runs.
    pub total_ns: u64,
}

/// Point-in-time counters of one processor step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorMetrics {
    /// Invocations that succeeded or dropped.
    pub succeeded: u64,
    /// Invocations that reported a failure.
    pub failed: u64,
    /// Total time of successful invocations.
    pub total_ns: u64,
}

/// A thread-safe tracker keeping counters per pipeline and per
/// (pipeline, step).
#[derive(Debug, Default)]
pub struct InMemoryMetricsTracker {
    pipelines: DashMap<String, Arc<PipelineCounters>>,
    processors: DashMap<(String, String), Arc<ProcessorCounters>>,
}

impl InMemoryMetricsTracker {
    /// Creates a new empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn pipeline_counters(&self, pipeline_id: &str) -> Arc<PipelineCounters> {
        if let Some(counters) = self.pipelines.get(pipeline_id) {
            return Arc::clone(&counters);
        }
        Arc::clone(
            &self
                .pipelines
                .entry(pipeline_id.to_string())
                .or_default(),
        )
    }

    fn processor_counters(&self, pipeline_id: &str, step: &str) -> Arc<ProcessorCounters> {
        Arc::clone(
            &self
                .processors
                .entry((pipeline_id.to_string(), step.to_string()))
                .or_default(),
        )
    }

    /// Returns the counters of a pipeline (all zero if never seen).
    #[must_use]
    pub fn pipeline(&self, pipeline_id: &str) -> PipelineMetrics {
        self.pipelines
            .get(pipeline_id)
            .map(|counters| counters.snapshot())
            .unwrap_or_default()
    }

    /// Returns the counters of a processor step (all zero if never seen).
    #[must_use]
    pub fn processor(&self, pipeline_id: &str, step: &str) -> ProcessorMetrics {
        self.processors
            .get(&(pipeline_id.to_string(), step.to_string()))
            .map(|counters| counters.snapshot())
            .unwrap_or_default()
    }

    /// Returns the ids of all pipelines seen so far, sorted.
    #[must_use]
    pub fn pipeline_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.pipelines.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Converts all counters to a JSON value keyed by pipeline id.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        let mut pipelines = serde_json::Map::new();
        for id in self.pipeline_ids() {
            let mut steps = serde_json::Map::new();
            for entry in self.processors.iter().filter(|e| e.key().0 == id) {
                steps.insert(
                    entry.key().1.clone(),
                    serde_json::to_value(entry.value().snapshot()).unwrap_or_default(),
                );
            }
            pipelines.insert(
                id.clone(),
                serde_json::json!({
                    "pipeline": self.pipeline(&id),
                    "processors": steps,
                }),
            );
        }
        serde_json::Value::Object(pipelines)
    }

    /// Clears all counters.
    pub fn reset(&self) {
        self.pipelines.clear();
        self.processors.clear();
    }
}

impl MetricsTracker for InMemoryMetricsTracker {
    fn pipeline_succeeded(&self, pipeline_id: &str, _doc: &Document, elapsed_ns: u64) {
        let counters = self.pipeline_counters(pipeline_id);
        counters.succeeded.fetch_add(1, Ordering::Relaxed);
        counters.total_ns.fetch_add(elapsed_ns, Ordering::Relaxed);
    }

    fn pipeline_failed(&self, pipeline_id: &str, _doc: &Document) {
        self.pipeline_counters(pipeline_id)
            .failed
            .fetch_add(1, Ordering::Relaxed);
    }

    fn pipeline_expired(&self, pipeline_id: &str, _doc: &Document) {
        self.pipeline_counters(pipeline_id)
            .expired
            .fetch_add(1, Ordering::Relaxed);
    }

    fn execution_overtime(&self, pipeline_id: &str, _doc: &Document) {
        self.pipeline_counters(pipeline_id)
            .overtime
            .fetch_add(1, Ordering::Relaxed);
    }

    fn document_dropped(&self, pipeline_id: &str, _doc: &Document) {
        self.pipeline_counters(pipeline_id)
            .dropped
            .fetch_add(1, Ordering::Relaxed);
    }

    fn processor_succeeded(&self, pipeline_id: &str, step: &str, elapsed_ns: u64) {
        let counters = self.processor_counters(pipeline_id, step);
        counters.succeeded.fetch_add(1, Ordering::Relaxed);
        counters.total_ns.fetch_add(elapsed_ns, Ordering::Relaxed);
    }

    fn processor_failed(&self, pipeline_id: &str, step: &str, _doc: &Document, _error: &ProcessError) {
        self.processor_counters(pipeline_id, step)
            .failed
            .fetch_add(1, Ordering::Relaxed);
    }

    fn pipeline_failed_on_unexpected_error(
        &self,
        pipeline_id: &str,
        _step: &str,
        _doc: &Document,
        _error: &anyhow::Error,
    ) {
        self.pipeline_counters(pipeline_id)
            .unexpected_errors
            .fetch_add(1, Ordering::Relaxed);
    }
}
