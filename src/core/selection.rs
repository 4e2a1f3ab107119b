//! Batch map selections and their resolved results.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::template;

/// A batch of map references to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// One reference pattern, expanded over every combination of `vars`.
    Pattern {
        pattern: String,
        vars: Vec<(String, Vec<String>)>,
    },
    /// Explicit references, resolved in order.
    Many(Vec<String>),
    /// References keyed by a logical name; keys are preserved.
    Named(BTreeMap<String, String>),
}

impl Selection {
    pub fn single(reference: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: reference.into(),
            vars: Vec::new(),
        }
    }

    pub fn pattern(pattern: impl Into<String>, vars: Vec<(String, Vec<String>)>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            vars,
        }
    }

    /// Build a selection from JSON: a string is a pattern, an array is a list
    /// of references and an object maps keys to references.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::single(s.clone())),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| expect_reference(item, &format!("[{}]", i)))
                .collect::<Result<Vec<_>>>()
                .map(Self::Many),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), expect_reference(v, k)?)))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Self::Named),
            other => Err(Error::validation_invalid_argument(
                "selection",
                format!(
                    "Expected string, array or object, got: {}",
                    json_type_name(other)
                ),
                None,
                None,
            )),
        }
    }

    /// Expand into concrete reference strings.
    pub fn references(&self) -> Result<Resolved<String>> {
        match self {
            Self::Pattern { pattern, vars } => {
                template::expand(pattern, vars).map(Resolved::List)
            }
            Self::Many(refs) => Ok(Resolved::List(refs.clone())),
            Self::Named(map) => Ok(Resolved::Named(map.clone())),
        }
    }
}

fn expect_reference(value: &Value, position: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::validation_invalid_argument(
            "selection",
            format!(
                "Expected string reference at {}, got: {}",
                position,
                json_type_name(other)
            ),
            None,
            None,
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Resolution output mirroring the shape of the [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resolved<T> {
    List(Vec<T>),
    Named(BTreeMap<String, T>),
}

impl<T> Resolved<T> {
    pub fn try_map<U>(self, mut f: impl FnMut(T) -> Result<U>) -> Result<Resolved<U>> {
        match self {
            Resolved::List(items) => items
                .into_iter()
                .map(f)
                .collect::<Result<Vec<_>>>()
                .map(Resolved::List),
            Resolved::Named(map) => map
                .into_iter()
                .map(|(k, v)| Ok((k, f(v)?)))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Resolved::Named),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Resolved::List(items) => items.len(),
            Resolved::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_list(&self) -> Option<&[T]> {
        match self {
            Resolved::List(items) => Some(items.as_slice()),
            Resolved::Named(_) => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        match self {
            Resolved::List(_) => None,
            Resolved::Named(map) => map.get(key),
        }
    }
}
