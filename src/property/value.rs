//! Tagged property value.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::normalize::normalize;
use super::tree::PropertyTree;

/// A single property value: a scalar, a list, or a nested string-keyed tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Explicit `null` / `~`.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer or floating point scalar.
    Number(serde_yaml::Number),
    /// String scalar.
    String(String),
    /// Ordered sequence.
    List(Vec<PropertyValue>),
    /// Nested mapping.
    Map(PropertyTree),
}

impl PropertyValue {
    /// Short name of the value's shape, used in type mismatch diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "sequence",
            Self::Map(_) => "mapping",
        }
    }

    /// Returns `true` for [`PropertyValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the nested tree, if this is a mapping.
    #[must_use]
    pub fn as_tree(&self) -> Option<&PropertyTree> {
        match self {
            Self::Map(tree) => Some(tree),
            _ => None,
        }
    }

    /// Formats a scalar the way it would appear unquoted in a document.
    ///
    /// Strings are returned verbatim; numbers and booleans use their plain
    /// textual form. Lists and maps yield `None`.
    #[must_use]
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Null => Some("null".to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_yaml::Value::deserialize(deserializer).map(normalize)
    }
}

/// Deserializes any scalar (string, number, bool) into its textual form.
///
/// For fields such as release versions that documents write either quoted
/// or bare (`version: 26`).
///
/// # Errors
///
/// Fails when the value is a sequence or mapping.
pub fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = PropertyValue::deserialize(deserializer)?;
    value
        .scalar_text()
        .ok_or_else(|| D::Error::custom(format!("expected a scalar, found {}", value.kind())))
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value).into())
    }
}

impl From<PropertyTree> for PropertyValue {
    fn from(value: PropertyTree) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(value: Vec<PropertyValue>) -> Self {
        Self::List(value)
    }
}
