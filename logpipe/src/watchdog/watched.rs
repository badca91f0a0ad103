//! One supervised execution.

use crate::cancellation::CancellationToken;
use crate::document::Document;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// An in-flight execution as seen by the watchdog.
///
/// `notified_overtime` and `finished` only ever go from false to true, each
/// through a single compare-and-set, so whichever of the executor and the
/// poller flips `finished` first owns the terminal outcome.
#[derive(Debug)]
pub struct WatchedExecution {
    execution_id: u64,
    pipeline_id: String,
    document: Document,
    ingest_timestamp: DateTime<Utc>,
    started: Instant,
    cancellation: Arc<CancellationToken>,
    notified_overtime: AtomicBool,
    finished: AtomicBool,
}

impl WatchedExecution {
    pub(crate) fn new(
        execution_id: u64,
        pipeline_id: impl Into<String>,
        document: Document,
        cancellation: Arc<CancellationToken>,
    ) -> Self {
        Self {
            execution_id,
            pipeline_id: pipeline_id.into(),
            document,
            ingest_timestamp: Utc::now(),
            started: Instant::now(),
            cancellation,
            notified_overtime: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    /// The execution id.
    #[must_use]
    pub const fn execution_id(&self) -> u64 {
        self.execution_id
    }

    /// The pipeline being executed.
    #[must_use]
    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    /// The document as it was when the execution started.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Wall-clock time the execution started.
    #[must_use]
    pub const fn ingest_timestamp(&self) -> DateTime<Utc> {
        self.ingest_timestamp
    }

    /// Time since the execution started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The execution's cancellation token.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns true once the overtime notification was sent.
    #[must_use]
    pub fn is_notified_overtime(&self) -> bool {
        self.notified_overtime.load(Ordering::Acquire)
    }

    /// Returns true once the execution reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Claims the overtime notification. Returns true for the single caller
    /// that wins.
    pub(crate) fn try_mark_overtime(&self) -> bool {
        self.notified_overtime
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Claims the terminal transition. Returns true for the single caller
    /// that wins.
    pub(crate) fn try_finish(&self) -> bool {
        self.finished
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
