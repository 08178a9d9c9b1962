//! Typed access over the untyped attribute map a descriptor carries.
//!
//! Attributes arrive from deserialization as a tagged union. Operators read
//! them by static type, so access fails loudly with two distinct error kinds
//! (absent key vs wrong tag) instead of coercing; a float silently read as an
//! integer is exactly the kind of bug that produces numerically-wrong kernels.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tagged attribute value as produced by the graph loader.
///
/// Untagged serialization keeps the wire form natural: `1` is an int,
/// `1.5` a float, `[1, 1]` an int list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    String(String),
    Ints(Vec<i64>),
    Floats(Vec<f32>),
    Strings(Vec<String>),
}

impl AttrValue {
    /// Human-readable tag name used in mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "int",
            AttrValue::Float(_) => "float",
            AttrValue::Bool(_) => "bool",
            AttrValue::String(_) => "string",
            AttrValue::Ints(_) => "int list",
            AttrValue::Floats(_) => "float list",
            AttrValue::Strings(_) => "string list",
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::Float(v)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::String(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::String(v)
    }
}

impl From<Vec<i64>> for AttrValue {
    fn from(v: Vec<i64>) -> Self {
        AttrValue::Ints(v)
    }
}

impl From<Vec<f32>> for AttrValue {
    fn from(v: Vec<f32>) -> Self {
        AttrValue::Floats(v)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(v: Vec<String>) -> Self {
        AttrValue::Strings(v)
    }
}

/// Conversion from a stored tag into the statically requested type.
///
/// Implementations never coerce across tags; `from_attr` answers `None`
/// whenever the stored variant is not exactly the requested one.
pub trait FromAttr: Sized {
    /// Tag name the conversion expects, used in mismatch diagnostics.
    const EXPECTED: &'static str;

    fn from_attr(value: &AttrValue) -> Option<Self>;
}

impl FromAttr for i64 {
    const EXPECTED: &'static str = "int";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromAttr for f32 {
    const EXPECTED: &'static str = "float";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromAttr for bool {
    const EXPECTED: &'static str = "bool";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromAttr for String {
    const EXPECTED: &'static str = "string";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromAttr for Vec<i64> {
    const EXPECTED: &'static str = "int list";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Ints(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromAttr for Vec<f32> {
    const EXPECTED: &'static str = "float list";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Floats(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromAttr for Vec<String> {
    const EXPECTED: &'static str = "string list";

    fn from_attr(value: &AttrValue) -> Option<Self> {
        match value {
            AttrValue::Strings(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// Access failure raised by [`AttributeTable::get`].
#[derive(Debug, Error)]
pub enum AttrError {
    #[error("missing required attribute '{key}'")]
    Missing { key: String },
    #[error("attribute '{key}' expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Ordered map from attribute key to tagged value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeTable {
    #[serde(flatten)]
    entries: BTreeMap<String, AttrValue>,
}

impl AttributeTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        AttributeTable::default()
    }

    /// Inserts an attribute, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style insertion for loaders and tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Borrows the raw tagged value for a key, if present.
    pub fn raw(&self, key: &str) -> Option<&AttrValue> {
        self.entries.get(key)
    }

    /// Reads a required attribute as `T`.
    pub fn get<T: FromAttr>(&self, key: &str) -> Result<T, AttrError> {
        let value = self.entries.get(key).ok_or_else(|| AttrError::Missing {
            key: key.to_string(),
        })?;
        T::from_attr(value).ok_or_else(|| AttrError::TypeMismatch {
            key: key.to_string(),
            expected: T::EXPECTED,
            found: value.type_name(),
        })
    }

    /// Reads an optional attribute as `T`, substituting the operator-defined default.
    ///
    /// Absence is only a valid state for attributes whose operator contract
    /// declares a default; a present key with the wrong tag still fails.
    pub fn get_or<T: FromAttr>(&self, key: &str, default: T) -> Result<T, AttrError> {
        match self.entries.get(key) {
            None => Ok(default),
            Some(value) => T::from_attr(value).ok_or_else(|| AttrError::TypeMismatch {
                key: key.to_string(),
                expected: T::EXPECTED,
                found: value.type_name(),
            }),
        }
    }

    /// Reports whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AttributeTable {
        AttributeTable::new()
            .with("groups", 4i64)
            .with("stride", vec![2i64, 2])
            .with("pooling_type", "max")
            .with("scale", 0.5f32)
            .with("global_pooling", true)
    }

    #[test]
    fn typed_reads_succeed() {
        let attrs = table();
        assert_eq!(attrs.get::<i64>("groups").unwrap(), 4);
        assert_eq!(attrs.get::<Vec<i64>>("stride").unwrap(), vec![2, 2]);
        assert_eq!(attrs.get::<String>("pooling_type").unwrap(), "max");
        assert_eq!(attrs.get::<f32>("scale").unwrap(), 0.5);
        assert!(attrs.get::<bool>("global_pooling").unwrap());
    }

    #[test]
    fn missing_key_is_its_own_error() {
        let err = table().get::<i64>("axis").unwrap_err();
        assert!(matches!(err, AttrError::Missing { ref key } if key == "axis"));
    }

    #[test]
    fn mismatch_reports_expected_and_found() {
        let err = table().get::<Vec<i64>>("pooling_type").unwrap_err();
        match err {
            AttrError::TypeMismatch {
                key,
                expected,
                found,
            } => {
                assert_eq!(key, "pooling_type");
                assert_eq!(expected, "int list");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn no_silent_cross_tag_coercion() {
        // An int is not readable as a float, and vice versa.
        assert!(table().get::<f32>("groups").is_err());
        assert!(table().get::<i64>("scale").is_err());
    }

    #[test]
    fn defaults_apply_only_when_absent() {
        let attrs = table();
        assert_eq!(attrs.get_or::<i64>("axis", -1).unwrap(), -1);
        // Present with the wrong tag still fails.
        assert!(attrs.get_or::<i64>("stride", 1).is_err());
    }

    #[test]
    fn untagged_wire_form_parses() {
        let attrs: AttributeTable = serde_json::from_str(
            r#"{"stride": [1, 1], "groups": 1, "pooling_type": "avg", "momentum": 0.9}"#,
        )
        .unwrap();
        assert_eq!(attrs.get::<Vec<i64>>("stride").unwrap(), vec![1, 1]);
        assert_eq!(attrs.get::<i64>("groups").unwrap(), 1);
        assert_eq!(attrs.get::<String>("pooling_type").unwrap(), "avg");
        assert_eq!(attrs.get::<f32>("momentum").unwrap(), 0.9);
    }
}
