//! Mock processors and conditions for testing.

use anyhow::anyhow;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::document::Document;
use crate::processor::{Condition, ProcessContext, ProcessResult, Processor};

/// A processor that sets a field to a fixed value.
#[derive(Debug, Clone)]
pub struct AddFieldProcessor {
    path: String,
    value: Value,
}

impl AddFieldProcessor {
    /// Creates a new add-field processor.
    #[must_use]
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

impl Processor for AddFieldProcessor {
    fn processor_type(&self) -> &str {
        "addField"
    }

    fn process(&self, doc: &mut Document, _ctx: &ProcessContext<'_>) -> anyhow::Result<ProcessResult> {
        doc.set(&self.path, self.value.clone());
        Ok(ProcessResult::success())
    }
}

/// A processor that always reports a failure.
#[derive(Debug, Clone)]
pub struct FailingProcessor {
    message: String,
}

impl FailingProcessor {
    /// Creates a new failing processor.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Processor for FailingProcessor {
    fn processor_type(&self) -> &str {
        "fail"
    }

    fn process(&self, _doc: &mut Document, _ctx: &ProcessContext<'_>) -> anyhow::Result<ProcessResult> {
        Ok(ProcessResult::failure(self.message.clone()))
    }
}

/// A processor that always drops the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropProcessor;

impl Processor for DropProcessor {
    fn processor_type(&self) -> &str {
        "drop"
    }

    fn process(&self, _doc: &mut Document, _ctx: &ProcessContext<'_>) -> anyhow::Result<ProcessResult> {
        Ok(ProcessResult::drop_document())
    }
}

/// A processor that always returns an unexpected fault.
#[derive(Debug, Clone)]
pub struct FaultingProcessor {
    message: String,
}

impl FaultingProcessor {
    /// Creates a new faulting processor.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Processor for FaultingProcessor {
    fn processor_type(&self) -> &str {
        "fault"
    }

    fn process(&self, _doc: &mut Document, _ctx: &ProcessContext<'_>) -> anyhow::Result<ProcessResult> {
        Err(anyhow!("{}", self.message))
    }
}

/// A processor that panics.
#[derive(Debug, Clone)]
pub struct PanickingProcessor {
    message: String,
}

impl PanickingProcessor {
    /// Creates a new panicking processor.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Processor for PanickingProcessor {
    fn processor_type(&self) -> &str {
        "panic"
    }

    fn process(&self, _doc: &mut Document, _ctx: &ProcessContext<'_>) -> anyhow::Result<ProcessResult> {
        panic!("{}", self.message);
    }
}

/// A processor that blocks for a while, returning early once cancelled.
#[derive(Debug, Clone)]
pub struct SleepingProcessor {
    duration: Duration,
}

impl SleepingProcessor {
    /// Creates a new sleeping processor.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Creates a sleeping processor with a duration in milliseconds.
    #[must_use]
    pub const fn with_delay_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Processor for SleepingProcessor {
    fn processor_type(&self) -> &str {
        "sleep"
    }

    fn process(&self, _doc: &mut Document, ctx: &ProcessContext<'_>) -> anyhow::Result<ProcessResult> {
        let deadline = Instant::now() + self.duration;
        while Instant::now() < deadline {
            if ctx.is_cancelled() {
                return Ok(ProcessResult::failure("interrupted"));
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        Ok(ProcessResult::success())
    }
}

/// A processor that records the steps it ran as and returns a fixed
/// outcome.
#[derive(Debug)]
pub struct RecordingProcessor {
    outcome: RecordedOutcome,
    calls: AtomicUsize,
    steps: Mutex<Vec<String>>,
}

/// What a [`RecordingProcessor`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedOutcome {
    /// Always succeed.
    Success,
    /// Always fail.
    Failure,
    /// Always drop.
    Drop,
}

impl RecordingProcessor {
    /// Creates a recording processor that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_outcome(RecordedOutcome::Success)
    }

    /// Creates a recording processor with the given outcome.
    #[must_use]
    pub fn with_outcome(outcome: RecordedOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            steps: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of times the processor was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the step names of each call, in order.
    #[must_use]
    pub fn recorded_steps(&self) -> Vec<String> {
        self.steps.lock().clone()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.steps.lock().clear();
    }
}

impl Default for RecordingProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for RecordingProcessor {
    fn processor_type(&self) -> &str {
        "record"
    }

    fn process(&self, _doc: &mut Document, ctx: &ProcessContext<'_>) -> anyhow::Result<ProcessResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.steps.lock().push(ctx.step_name().to_string());
        Ok(match self.outcome {
            RecordedOutcome::Success => ProcessResult::success(),
            RecordedOutcome::Failure => ProcessResult::failure("recorded failure"),
            RecordedOutcome::Drop => ProcessResult::drop_document(),
        })
    }
}

/// A condition with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedCondition {
    value: bool,
}

impl FixedCondition {
    /// Creates a new fixed condition.
    #[must_use]
    pub const fn new(value: bool) -> Self {
        Self { value }
    }
}

impl Condition for FixedCondition {
    fn evaluate(&self, _doc: &Document) -> bool {
        self.value
    }
}

/// A condition that holds when a field exists.
#[derive(Debug, Clone)]
pub struct FieldExistsCondition {
    path: String,
}

impl FieldExistsCondition {
    /// Creates a new field-exists condition.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Condition for FieldExistsCondition {
    fn evaluate(&self, doc: &Document) -> bool {
        doc.has(&self.path)
    }
}
