//! Runtime type tags for document values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The shape of a document value, used for type-checked existence tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool,
    /// Any number.
    Number,
    /// A string.
    String,
    /// An ordered list of values.
    List,
    /// A nested mapping.
    Map,
}

impl ValueKind {
    /// Returns the kind of a value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Map,
        }
    }

    /// Returns true for scalar kinds.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::List | Self::Map)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Number => write!(f, "number"),
            Self::String => write!(f, "string"),
            Self::List => write!(f, "list"),
            Self::Map => write!(f, "map"),
        }
    }
}
