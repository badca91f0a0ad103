//! Processor and condition interfaces.
//!
//! Processors are the leaf units of a pipeline. They report expected
//! outcomes through [`ProcessResult`] and reserve `Err` (or a panic) for
//! faults the executor should treat as fatal to the run.

mod result;

pub use result::{ProcessError, ProcessResult};

use crate::cancellation::CancellationToken;
use crate::document::Document;
use std::fmt::Debug;

/// Per-invocation context handed to a processor.
#[derive(Debug, Clone, Copy)]
pub struct ProcessContext<'a> {
    pipeline_id: &'a str,
    step_name: &'a str,
    execution_id: u64,
    cancellation: &'a CancellationToken,
}

impl<'a> ProcessContext<'a> {
    /// Creates a new process context.
    #[must_use]
    pub const fn new(
        pipeline_id: &'a str,
        step_name: &'a str,
        execution_id: u64,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            pipeline_id,
            step_name,
            execution_id,
            cancellation,
        }
    }

    /// The id of the pipeline being executed.
    #[must_use]
    pub const fn pipeline_id(&self) -> &'a str {
        self.pipeline_id
    }

    /// The name of the step being executed.
    #[must_use]
    pub const fn step_name(&self) -> &'a str {
        self.step_name
    }

    /// The watchdog execution id of this run.
    #[must_use]
    pub const fn execution_id(&self) -> u64 {
        self.execution_id
    }

    /// The cancellation token of this run.
    #[must_use]
    pub const fn cancellation(&self) -> &'a CancellationToken {
        self.cancellation
    }

    /// Returns true once the run has been asked to stop.
    ///
    /// Long-running processors should check this periodically.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// A pluggable transformation applied to a document.
///
/// Processors are shared across concurrent executions and must not keep
/// unsynchronized mutable state.
pub trait Processor: Send + Sync + Debug {
    /// Returns the processor type, e.g. `"grok"`.
    fn processor_type(&self) -> &str;

    /// Processes the document.
    ///
    /// # Errors
    ///
    /// An `Err` is an unexpected fault: it aborts the run regardless of the
    /// pipeline's failure policy. Expected failures are returned as
    /// [`ProcessResult::Failure`].
    fn process(&self, doc: &mut Document, ctx: &ProcessContext<'_>)
        -> anyhow::Result<ProcessResult>;
}

/// A boolean predicate over a document.
pub trait Condition: Send + Sync + Debug {
    /// Evaluates the condition. Must be total over any document.
    fn evaluate(&self, doc: &Document) -> bool;
}

/// A closure-based processor.
pub struct FnProcessor<F>
where
    F: Fn(&mut Document, &ProcessContext<'_>) -> anyhow::Result<ProcessResult> + Send + Sync,
{
    processor_type: String,
    func: F,
}

impl<F> FnProcessor<F>
where
    F: Fn(&mut Document, &ProcessContext<'_>) -> anyhow::Result<ProcessResult> + Send + Sync,
{
    /// Creates a new closure-based processor.
    pub fn new(processor_type: impl Into<String>, func: F) -> Self {
        Self {
            processor_type: processor_type.into(),
            func,
        }
    }
}

impl<F> Debug for FnProcessor<F>
where
    F: Fn(&mut Document, &ProcessContext<'_>) -> anyhow::Result<ProcessResult> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProcessor")
            .field("processor_type", &self.processor_type)
            .finish_non_exhaustive()
    }
}

impl<F> Processor for FnProcessor<F>
where
    F: Fn(&mut Document, &ProcessContext<'_>) -> anyhow::Result<ProcessResult> + Send + Sync,
{
    fn processor_type(&self) -> &str {
        &self.processor_type
    }

    fn process(
        &self,
        doc: &mut Document,
        ctx: &ProcessContext<'_>,
    ) -> anyhow::Result<ProcessResult> {
        (self.func)(doc, ctx)
    }
}

/// A closure-based condition.
pub struct FnCondition<F>
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnCondition<F>
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    /// Creates a new closure-based condition.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnCondition<F>
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCondition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Condition for FnCondition<F>
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    fn evaluate(&self, doc: &Document) -> bool {
        (self.func)(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_doc() -> Document {
        Document::from_value(json!({"message": "hello"})).unwrap()
    }

    #[test]
    fn test_fn_processor() {
        let processor = FnProcessor::new("uppercase", |doc, _ctx| {
            let upper = doc.get_as::<String>("message")?.to_uppercase();
            doc.set("message", upper);
            Ok(ProcessResult::success())
        });
        let token = CancellationToken::new();
        let ctx = ProcessContext::new("p1", "[uppercase1]", 1, &token);
        let mut doc = test_doc();

        assert_eq!(processor.processor_type(), "uppercase");
        assert!(processor.process(&mut doc, &ctx).unwrap().is_success());
        assert_eq!(doc.get("message").unwrap(), &json!("HELLO"));
    }

    #[test]
    fn test_fn_processor_fault_is_err() {
        let processor = FnProcessor::new("strict", |doc, _ctx| {
            doc.get_as::<i64>("message")?;
            Ok(ProcessResult::success())
        });
        let token = CancellationToken::new();
        let ctx = ProcessContext::new("p1", "[strict1]", 1, &token);

        assert!(processor.process(&mut test_doc(), &ctx).is_err());
    }

    #[test]
    fn test_context_sees_cancellation() {
        let token = CancellationToken::new();
        let ctx = ProcessContext::new("p1", "[slow1]", 7, &token);

        assert!(!ctx.is_cancelled());
        token.cancel("expired");
        assert!(ctx.is_cancelled());
        assert_eq!(ctx.execution_id(), 7);
        assert_eq!(ctx.step_name(), "[slow1]");
    }

    #[test]
    fn test_fn_condition() {
        let condition = FnCondition::new("has_message", |doc| doc.has("message"));
        assert!(condition.evaluate(&test_doc()));
    }
}
