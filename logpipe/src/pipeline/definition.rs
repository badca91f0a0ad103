//! Serializable pipeline definitions.
//!
//! A definition is the intermediate representation between configuration
//! text and the executable step tree: processors and conditions are still
//! referenced by type name and raw JSON config.
//!
//! ```json
//! {
//!   "name": "apache",
//!   "ignoreFailure": false,
//!   "steps": [
//!     { "grok": { "name": "parse", "config": { "field": "message" },
//!                 "onFailure": [ { "addTag": { "config": { "tags": ["_grok_failed"] } } } ] } },
//!     { "if": { "condition": { "exists": { "field": "status" } },
//!               "then": [ { "convert": { "config": { "path": "status" } } } ],
//!               "else": [ { "drop": {} } ] } }
//!   ]
//! }
//! ```

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Key marking a conditional step.
pub const CONDITIONAL_KEY: &str = "if";

/// A whole pipeline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDefinition {
    /// Display name; defaults to the pipeline id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Continue past unhandled processor failures.
    #[serde(default)]
    pub ignore_failure: bool,
    /// Root steps.
    pub steps: Vec<StepDefinition>,
}

/// One step of a definition.
///
/// Encoded as a single-key object: `if` for a conditional step, the
/// processor type otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub enum StepDefinition {
    /// A processor step.
    Processor(ProcessorDefinition),
    /// A conditional step.
    Conditional(ConditionalDefinition),
}

/// A processor step definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorDefinition {
    /// Registered processor type.
    pub processor_type: String,
    /// Optional user-supplied name suffix.
    pub name: Option<String>,
    /// Raw processor configuration.
    pub config: Value,
    /// Steps run when the processor fails.
    pub on_failure: Option<Vec<StepDefinition>>,
}

impl ProcessorDefinition {
    /// Creates a processor definition with an empty config.
    #[must_use]
    pub fn new(processor_type: impl Into<String>) -> Self {
        Self {
            processor_type: processor_type.into(),
            name: None,
            config: Value::Object(Map::new()),
            on_failure: None,
        }
    }

    /// Sets the config.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    /// Sets the user-supplied name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the on-failure steps.
    #[must_use]
    pub fn with_on_failure(mut self, steps: Vec<StepDefinition>) -> Self {
        self.on_failure = Some(steps);
        self
    }
}

/// A conditional step definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalDefinition {
    /// Raw condition, a single-key object naming the condition type.
    pub condition: Value,
    /// Steps run when the condition holds.
    #[serde(rename = "then", default)]
    pub on_true: Vec<StepDefinition>,
    /// Steps run otherwise.
    #[serde(rename = "else", default, skip_serializing_if = "Vec::is_empty")]
    pub on_false: Vec<StepDefinition>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default = "empty_config")]
    config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    on_failure: Option<Vec<StepDefinition>>,
}

fn empty_config() -> Value {
    Value::Object(Map::new())
}

impl TryFrom<Map<String, Value>> for StepDefinition {
    type Error = String;

    fn try_from(object: Map<String, Value>) -> Result<Self, Self::Error> {
        if object.len() != 1 {
            return Err(format!(
                "a step must have exactly one key, found {}: {:?}",
                object.len(),
                object.keys().collect::<Vec<_>>()
            ));
        }
        let Some((key, body)) = object.into_iter().next() else {
            return Err("a step must have exactly one key".to_string());
        };

        if key == CONDITIONAL_KEY {
            let conditional: ConditionalDefinition = serde_json::from_value(body)
                .map_err(|e| format!("invalid conditional step: {e}"))?;
            return Ok(Self::Conditional(conditional));
        }

        let body: ProcessorBody = serde_json::from_value(body)
            .map_err(|e| format!("invalid '{key}' step: {e}"))?;
        Ok(Self::Processor(ProcessorDefinition {
            processor_type: key,
            name: body.name,
            config: body.config,
            on_failure: body.on_failure,
        }))
    }
}

impl Serialize for StepDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Processor(def) => {
                let body = ProcessorBody {
                    name: def.name.clone(),
                    config: def.config.clone(),
                    on_failure: def.on_failure.clone(),
                };
                map.serialize_entry(&def.processor_type, &body)?;
            }
            Self::Conditional(def) => map.serialize_entry(CONDITIONAL_KEY, def)?,
        }
        map.end()
    }
}

impl From<ProcessorDefinition> for StepDefinition {
    fn from(def: ProcessorDefinition) -> Self {
        Self::Processor(def)
    }
}

impl From<ConditionalDefinition> for StepDefinition {
    fn from(def: ConditionalDefinition) -> Self {
        Self::Conditional(def)
    }
}
