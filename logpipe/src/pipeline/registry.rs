//! Name → factory registries for processors and conditions.

use crate::errors::{FactoryError, PipelineError};
use crate::processor::{Condition, Processor};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Factory function type for creating processors from their config.
pub type ProcessorFactory =
    Arc<dyn Fn(&Value) -> Result<Arc<dyn Processor>, FactoryError> + Send + Sync>;

/// Factory function type for creating conditions from their config.
///
/// The registry is passed in so compound conditions can resolve the
/// conditions nested in their config.
pub type ConditionFactory = Arc<
    dyn Fn(&Value, &ConditionRegistry) -> Result<Arc<dyn Condition>, FactoryError> + Send + Sync,
>;

/// Registry of processor factories keyed by processor type.
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: RwLock<HashMap<String, ProcessorFactory>>,
}

impl ProcessorRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory, replacing any previous one for the same type.
    pub fn register<F>(&self, processor_type: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Result<Arc<dyn Processor>, FactoryError> + Send + Sync + 'static,
    {
        self.factories
            .write()
            .insert(processor_type.into(), Arc::new(factory));
    }

    /// Checks if a processor type is registered.
    #[must_use]
    pub fn contains(&self, processor_type: &str) -> bool {
        self.factories.read().contains_key(processor_type)
    }

    /// Lists all registered processor types.
    #[must_use]
    pub fn processor_types(&self) -> Vec<String> {
        let mut types: Vec<_> = self.factories.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Creates a processor of the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or the factory rejects the
    /// config.
    pub fn create(
        &self,
        processor_type: &str,
        config: &Value,
    ) -> Result<Arc<dyn Processor>, PipelineError> {
        // Cloned out so the lock is not held while user code runs.
        let factory = self
            .factories
            .read()
            .get(processor_type)
            .cloned()
            .ok_or_else(|| PipelineError::unknown_processor(processor_type))?;

        factory(config).map_err(|source| PipelineError::Factory {
            kind: "processor",
            name: processor_type.to_string(),
            source,
        })
    }
}

impl fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("processor_types", &self.processor_types())
            .finish()
    }
}

/// Registry of condition factories keyed by condition type.
#[derive(Default)]
pub struct ConditionRegistry {
    factories: RwLock<HashMap<String, ConditionFactory>>,
}

impl ConditionRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory, replacing any previous one for the same type.
    pub fn register<F>(&self, condition_type: impl Into<String>, factory: F)
    where
        F: Fn(&Value, &Self) -> Result<Arc<dyn Condition>, FactoryError> + Send + Sync + 'static,
    {
        self.factories
            .write()
            .insert(condition_type.into(), Arc::new(factory));
    }

    /// Checks if a condition type is registered.
    #[must_use]
    pub fn contains(&self, condition_type: &str) -> bool {
        self.factories.read().contains_key(condition_type)
    }

    /// Lists all registered condition types.
    #[must_use]
    pub fn condition_types(&self) -> Vec<String> {
        let mut types: Vec<_> = self.factories.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Creates a condition of the given type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type is unknown or the factory rejects the
    /// config.
    pub fn create(
        &self,
        condition_type: &str,
        config: &Value,
    ) -> Result<Arc<dyn Condition>, PipelineError> {
        let factory = self
            .factories
            .read()
            .get(condition_type)
            .cloned()
            .ok_or_else(|| PipelineError::unknown_condition(condition_type))?;

        factory(config, self).map_err(|source| PipelineError::Factory {
            kind: "condition",
            name: condition_type.to_string(),
            source,
        })
    }

    /// Resolves a condition written as a single-key object,
    /// `{"<type>": <config>}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a single-key object or
    /// [`create`](Self::create) fails.
    pub fn resolve(&self, definition: &Value) -> Result<Arc<dyn Condition>, PipelineError> {
        let object = definition
            .as_object()
            .filter(|object| object.len() == 1)
            .ok_or_else(|| {
                PipelineError::definition(format!(
                    "a condition must be an object with exactly one key, got {definition}"
                ))
            })?;

        match object.iter().next() {
            Some((condition_type, config)) => self.create(condition_type, config),
            None => Err(PipelineError::definition("empty condition")),
        }
    }
}

impl fmt::Debug for ConditionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionRegistry")
            .field("condition_types", &self.condition_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::processor::FnCondition;
    use crate::testing::{AddFieldProcessor, FixedCondition};
    use serde_json::json;

    fn processors() -> ProcessorRegistry {
        let registry = ProcessorRegistry::new();
        registry.register("addField", |config| {
            let path = config["path"].as_str().ok_or("missing 'path'")?;
            let processor: Arc<dyn Processor> =
                Arc::new(AddFieldProcessor::new(path, config["value"].clone()));
            Ok(processor)
        });
        registry
    }

    fn conditions() -> ConditionRegistry {
        let registry = ConditionRegistry::new();
        registry.register("fixed", |config, _| {
            let value = config["value"].as_bool().unwrap_or(false);
            let condition: Arc<dyn Condition> = Arc::new(FixedCondition::new(value));
            Ok(condition)
        });
        registry.register("not", |config, registry| {
            let inner = registry.resolve(config)?;
            let condition: Arc<dyn Condition> =
                Arc::new(FnCondition::new("not", move |doc| !inner.evaluate(doc)));
            Ok(condition)
        });
        registry
    }

    #[test]
    fn test_processor_registry_create() {
        let registry = processors();
        let processor = registry
            .create("addField", &json!({"path": "x", "value": 1}))
            .unwrap();

        assert_eq!(processor.processor_type(), "addField");
        assert!(registry.contains("addField"));
        assert_eq!(registry.processor_types(), vec!["addField".to_string()]);
    }

    #[test]
    fn test_unknown_processor() {
        let err = processors().create("grok", &json!({})).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownProcessor { name } if name == "grok"));
    }

    #[test]
    fn test_factory_error_is_wrapped() {
        let err = processors().create("addField", &json!({})).unwrap_err();

        assert!(matches!(err, PipelineError::Factory { kind: "processor", .. }));
        assert!(err.to_string().contains("missing 'path'"));
    }

    #[test]
    fn test_condition_resolve_nested() {
        let registry = conditions();
        let condition = registry
            .resolve(&json!({"not": {"fixed": {"value": true}}}))
            .unwrap();

        let doc = Document::from_value(json!({"a": 1})).unwrap();
        assert!(!condition.evaluate(&doc));
    }

    #[test]
    fn test_condition_resolve_rejects_bad_shape() {
        let registry = conditions();

        assert!(matches!(
            registry.resolve(&json!("fixed")),
            Err(PipelineError::Definition { .. })
        ));
        assert!(matches!(
            registry.resolve(&json!({"fixed": {}, "not": {}})),
            Err(PipelineError::Definition { .. })
        ));
        assert!(matches!(
            registry.resolve(&json!({"exists": {}})),
            Err(PipelineError::UnknownCondition { .. })
        ));
    }
}
