//! The mutable nested record flowing through a pipeline.
//!
//! A [`Document`] wraps a non-empty JSON object. Every field operation takes
//! a dot-separated path (see [`FieldPath`]) and shares the same tokenizer.
//!
//! Writes are permissive: when an intermediate path segment exists but is
//! not a map, [`Document::set`] replaces it with a fresh empty map instead of
//! failing. This loses the previous value and is the intended behavior.

mod kind;
mod path;
#[cfg(test)]
mod document_tests;

pub use kind::ValueKind;
pub use path::FieldPath;

use crate::errors::DocumentError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A document being transformed by a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Document {
    source: Map<String, Value>,
}

impl Document {
    /// Creates a document from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Empty`] if the map has no fields.
    pub fn new(source: Map<String, Value>) -> Result<Self, DocumentError> {
        if source.is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(Self { source })
    }

    /// Creates a document from a JSON value, which must be a non-empty object.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotAnObject`] or [`DocumentError::Empty`].
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(source) => Self::new(source),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    /// Returns the backing map.
    #[must_use]
    pub fn source(&self) -> &Map<String, Value> {
        &self.source
    }

    /// Consumes the document, returning the backing map.
    #[must_use]
    pub fn into_source(self) -> Map<String, Value> {
        self.source
    }

    /// Returns the number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns true if no top-level fields remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Returns true if a value exists at the path.
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        self.lookup(&FieldPath::parse(path)).is_some()
    }

    /// Returns true if a value of the given kind exists at the path.
    #[must_use]
    pub fn has_kind(&self, path: &str, kind: ValueKind) -> bool {
        self.lookup(&FieldPath::parse(path))
            .is_some_and(|value| ValueKind::of(value) == kind)
    }

    /// Reads the value at the path.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::FieldNotFound`] if nothing is stored there.
    pub fn get(&self, path: &str) -> Result<&Value, DocumentError> {
        self.lookup(&FieldPath::parse(path))
            .ok_or_else(|| DocumentError::field_not_found(path))
    }

    /// Reads the value at the path mutably.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::FieldNotFound`] if nothing is stored there.
    pub fn get_mut(&mut self, path: &str) -> Result<&mut Value, DocumentError> {
        self.lookup_mut(&FieldPath::parse(path))
            .ok_or_else(|| DocumentError::field_not_found(path))
    }

    /// Reads and deserializes the value at the path.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::FieldNotFound`] if the path is absent, or
    /// [`DocumentError::TypeMismatch`] if the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, DocumentError> {
        let value = self.get(path)?;
        T::deserialize(value)
            .map_err(|_| DocumentError::type_mismatch(path, std::any::type_name::<T>()))
    }

    /// Writes a value at the path, creating intermediate maps as needed.
    ///
    /// An intermediate segment holding a non-map value is overwritten with an
    /// empty map.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        self.set_path(&FieldPath::parse(path), value.into());
    }

    /// Removes the value at the path. Returns false if it was absent.
    pub fn remove(&mut self, path: &str) -> bool {
        let path = FieldPath::parse(path);
        let (parents, leaf) = path.split_leaf();
        self.parent_map_mut(parents)
            .is_some_and(|parent| parent.remove(leaf).is_some())
    }

    /// Appends to the list at the path.
    ///
    /// A missing field becomes a list (a list value is stored as-is, anything
    /// else as a one-element list). An existing scalar is first wrapped into a
    /// one-element list. Appending a list adds its elements, one level deep.
    pub fn append_to_list(&mut self, path: &str, value: impl Into<Value>) {
        let path = FieldPath::parse(path);
        let value = value.into();

        let Some(existing) = self.lookup_mut(&path) else {
            let list = match value {
                Value::Array(items) => items,
                other => vec![other],
            };
            self.set_path(&path, Value::Array(list));
            return;
        };

        if !existing.is_array() {
            let previous = existing.take();
            *existing = Value::Array(vec![previous]);
        }
        if let Value::Array(items) = existing {
            match value {
                Value::Array(more) => items.extend(more),
                other => items.push(other),
            }
        }
    }

    /// Removes every occurrence of the value (or of each element of a list
    /// value) from the list at the path.
    ///
    /// Returns false if the path is absent or does not hold a list.
    pub fn remove_from_list(&mut self, path: &str, value: impl Into<Value>) -> bool {
        let Some(Value::Array(items)) = self.lookup_mut(&FieldPath::parse(path)) else {
            return false;
        };

        match value.into() {
            Value::Array(unwanted) => items.retain(|item| !unwanted.contains(item)),
            other => items.retain(|item| item != &other),
        }
        true
    }

    /// Swaps the whole backing map, returning the previous one.
    pub fn replace_all(&mut self, source: Map<String, Value>) -> Map<String, Value> {
        std::mem::replace(&mut self.source, source)
    }

    /// Overwrites the value at the path only if one is already there.
    pub fn replace_if_present(&mut self, path: &str, value: impl Into<Value>) -> bool {
        match self.lookup_mut(&FieldPath::parse(path)) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    fn lookup(&self, path: &FieldPath) -> Option<&Value> {
        let (parents, leaf) = path.split_leaf();
        let mut context = &self.source;
        for segment in parents {
            context = context.get(segment)?.as_object()?;
        }
        context.get(leaf)
    }

    fn lookup_mut(&mut self, path: &FieldPath) -> Option<&mut Value> {
        let (parents, leaf) = path.split_leaf();
        self.parent_map_mut(parents)?.get_mut(leaf)
    }

    fn parent_map_mut(&mut self, parents: &[String]) -> Option<&mut Map<String, Value>> {
        let mut context = &mut self.source;
        for segment in parents {
            context = context.get_mut(segment)?.as_object_mut()?;
        }
        Some(context)
    }

    fn set_path(&mut self, path: &FieldPath, value: Value) {
        let (parents, leaf) = path.split_leaf();
        let mut context = &mut self.source;
        for segment in parents {
            context = ensure_map(context, segment);
        }
        context.insert(leaf.to_string(), value);
    }
}

fn ensure_map<'a>(context: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = context
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just set to an object"),
    }
}

impl TryFrom<Map<String, Value>> for Document {
    type Error = DocumentError;

    fn try_from(source: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::new(source)
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Document> for Map<String, Value> {
    fn from(document: Document) -> Self {
        document.source
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        Self::Object(document.source)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.source) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}
