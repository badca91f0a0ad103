//! Test fixtures: documents and registries wired with the mocks.

use serde_json::Value;
use std::sync::Arc;

use super::mocks::{
    AddFieldProcessor, DropProcessor, FailingProcessor, FaultingProcessor, FieldExistsCondition,
    FixedCondition, PanickingProcessor, SleepingProcessor,
};
use crate::document::Document;
use crate::pipeline::{ConditionRegistry, PipelineFactory, ProcessorRegistry};
use crate::processor::{Condition, Processor};

/// Builds a document from a JSON value.
///
/// # Panics
///
/// Panics if the value is not a non-empty object.
#[must_use]
pub fn test_document(value: Value) -> Document {
    match Document::from_value(value) {
        Ok(doc) => doc,
        Err(e) => panic!("invalid test document: {e}"),
    }
}

fn string_field(config: &Value, key: &str) -> Result<String, String> {
    config
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("missing string field '{key}'"))
}

/// A processor registry with every mock registered:
///
/// | type       | config                          |
/// |------------|---------------------------------|
/// | `addField` | `{"path": str, "value": any}`   |
/// | `fail`     | `{"message": str}` (optional)   |
/// | `drop`     | none                            |
/// | `fault`    | `{"message": str}` (optional)   |
/// | `panic`    | `{"message": str}` (optional)   |
/// | `sleep`    | `{"millis": u64}`               |
#[must_use]
pub fn test_processor_registry() -> ProcessorRegistry {
    let registry = ProcessorRegistry::new();
    registry.register("addField", |config| {
        let path = string_field(config, "path")?;
        let value = config.get("value").cloned().unwrap_or(Value::Null);
        let processor: Arc<dyn Processor> = Arc::new(AddFieldProcessor::new(path, value));
        Ok(processor)
    });
    registry.register("fail", |config| {
        let message = string_field(config, "message").unwrap_or_else(|_| "failed".to_string());
        let processor: Arc<dyn Processor> = Arc::new(FailingProcessor::new(message));
        Ok(processor)
    });
    registry.register("drop", |_| {
        let processor: Arc<dyn Processor> = Arc::new(DropProcessor);
        Ok(processor)
    });
    registry.register("fault", |config| {
        let message = string_field(config, "message").unwrap_or_else(|_| "fault".to_string());
        let processor: Arc<dyn Processor> = Arc::new(FaultingProcessor::new(message));
        Ok(processor)
    });
    registry.register("panic", |config| {
        let message = string_field(config, "message").unwrap_or_else(|_| "panic".to_string());
        let processor: Arc<dyn Processor> = Arc::new(PanickingProcessor::new(message));
        Ok(processor)
    });
    registry.register("sleep", |config| {
        let millis = config
            .get("millis")
            .and_then(Value::as_u64)
            .ok_or("missing integer field 'millis'")?;
        let processor: Arc<dyn Processor> = Arc::new(SleepingProcessor::with_delay_ms(millis));
        Ok(processor)
    });
    registry
}

/// A condition registry with the mock conditions and `not`:
///
/// | type     | config                          |
/// |----------|---------------------------------|
/// | `fixed`  | `{"value": bool}`               |
/// | `exists` | `{"field": str}`                |
/// | `not`    | a nested condition              |
#[must_use]
pub fn test_condition_registry() -> ConditionRegistry {
    let registry = ConditionRegistry::new();
    registry.register("fixed", |config, _| {
        let value = config
            .get("value")
            .and_then(Value::as_bool)
            .ok_or("missing boolean field 'value'")?;
        let condition: Arc<dyn Condition> = Arc::new(FixedCondition::new(value));
        Ok(condition)
    });
    registry.register("exists", |config, _| {
        let condition: Arc<dyn Condition> =
            Arc::new(FieldExistsCondition::new(string_field(config, "field")?));
        Ok(condition)
    });
    registry.register("not", |config, registry| {
        let inner = registry.resolve(config)?;
        let condition: Arc<dyn Condition> = Arc::new(NotCondition(inner));
        Ok(condition)
    });
    registry
}

/// A factory over [`test_processor_registry`] and
/// [`test_condition_registry`].
#[must_use]
pub fn test_factory() -> PipelineFactory {
    PipelineFactory::new(
        Arc::new(test_processor_registry()),
        Arc::new(test_condition_registry()),
    )
}

#[derive(Debug)]
struct NotCondition(Arc<dyn Condition>);

impl Condition for NotCondition {
    fn evaluate(&self, doc: &Document) -> bool {
        !self.0.evaluate(doc)
    }
}
