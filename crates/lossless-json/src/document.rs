//! Order-preserving JSON document.
//!
//! A [`Document`] wraps one `serde_json::Value`. The crate enables serde_json's
//! `preserve_order` feature, so object keys keep insertion order, and
//! `arbitrary_precision`, so numbers are re-emitted exactly as they were
//! parsed. Keys not claimed by a typed field are never pruned except through
//! an explicit delete.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{value_type_name, LosslessError, Result, UsageError};
use crate::KeyPath;

/// An order-preserving, dynamically typed JSON tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    root: Value,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty object document.
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Parse JSON text into a document.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map(Self::from_value)
            .map_err(LosslessError::Parse)
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub fn is_object(&self) -> bool {
        self.root.is_object()
    }

    fn object(&self) -> Result<&Map<String, Value>, UsageError> {
        self.root
            .as_object()
            .ok_or_else(|| UsageError::not_an_object(KeyPath::root(), &self.root))
    }

    fn object_mut(&mut self) -> Result<&mut Map<String, Value>, UsageError> {
        let found = value_type_name(&self.root);
        match &mut self.root {
            Value::Object(map) => Ok(map),
            _ => Err(UsageError::NotAnObject {
                path: KeyPath::root(),
                found,
            }),
        }
    }

    /// Root object keys in document order.
    pub fn keys(&self) -> Result<impl Iterator<Item = &str>, UsageError> {
        Ok(self.object()?.keys().map(String::as_str))
    }

    /// Look up a root member.
    pub fn get(&self, key: &str) -> Result<Option<&Value>, UsageError> {
        Ok(self.object()?.get(key))
    }

    /// Look up a root member, falling back to the first key that matches
    /// under case folding when there is no exact match.
    pub fn get_folded(&self, key: &str) -> Result<Option<&Value>, UsageError> {
        let map = self.object()?;
        if let Some(value) = map.get(key) {
            return Ok(Some(value));
        }
        Ok(map
            .iter()
            .find(|(candidate, _)| eq_fold(candidate, key))
            .map(|(_, value)| value))
    }

    /// Insert or overwrite a root member. An overwritten key keeps its
    /// position; a new key is appended. Returns the previous value.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Option<Value>, UsageError> {
        Ok(self.object_mut()?.insert(key.into(), value))
    }

    /// Remove a root member, keeping the order of the remaining keys.
    /// Missing keys are a no-op.
    pub fn delete(&mut self, key: &str) -> Result<Option<Value>, UsageError> {
        Ok(self.object_mut()?.shift_remove(key))
    }

    /// Look up a nested member. The root path yields the whole document.
    pub fn get_path(&self, path: &KeyPath) -> Result<Option<&Value>, UsageError> {
        let mut current = &self.root;
        for (depth, key) in path.keys().iter().enumerate() {
            let Value::Object(map) = current else {
                return Err(UsageError::not_an_object(path.prefix(depth), current));
            };
            match map.get(key) {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Set a nested member, creating empty objects for missing intermediate
    /// keys. An existing non-object on the way down is an error and leaves
    /// the document untouched.
    pub fn set_path(&mut self, path: &KeyPath, value: Value) -> Result<(), UsageError> {
        let (last, parents) = path.split_last().ok_or(UsageError::EmptyPath)?;
        let mut current = &mut self.root;
        for (depth, key) in parents.iter().enumerate() {
            let found = value_type_name(current);
            let Value::Object(map) = current else {
                return Err(UsageError::NotAnObject {
                    path: path.prefix(depth),
                    found,
                });
            };
            current = map
                .entry(key.as_str())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        let found = value_type_name(current);
        let Value::Object(map) = current else {
            return Err(UsageError::NotAnObject {
                path: path.prefix(parents.len()),
                found,
            });
        };
        map.insert(last.to_owned(), value);
        Ok(())
    }

    /// Remove a nested member. Missing members are a no-op.
    pub fn delete_path(&mut self, path: &KeyPath) -> Result<Option<Value>, UsageError> {
        let (last, parents) = path.split_last().ok_or(UsageError::EmptyPath)?;
        let mut current = &mut self.root;
        for (depth, key) in parents.iter().enumerate() {
            let found = value_type_name(current);
            let Value::Object(map) = current else {
                return Err(UsageError::NotAnObject {
                    path: path.prefix(depth),
                    found,
                });
            };
            match map.get_mut(key) {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        let found = value_type_name(current);
        let Value::Object(map) = current else {
            return Err(UsageError::NotAnObject {
                path: path.prefix(parents.len()),
                found,
            });
        };
        Ok(map.shift_remove(last))
    }

    /// Serialize to compact JSON text.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.root).map_err(LosslessError::Serialize)
    }

    /// Serialize to indented JSON text.
    pub fn to_vec_pretty(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(&self.root).map_err(LosslessError::Serialize)
    }
}

impl FromStr for Document {
    type Err = LosslessError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s.as_bytes())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

impl From<Value> for Document {
    fn from(root: Value) -> Self {
        Self::from_value(root)
    }
}

fn eq_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
