//! Field values and reference identifiers
//!
//! Reference identifiers coming from the UI are free-form. They are
//! normalized with parse-or-null semantics: anything that is not an integer
//! becomes "no value", never an error.

use serde_json::{Map, Value};

/// Parse a raw UI value into a reference identifier
///
/// Leading and trailing whitespace is ignored. Empty or non-numeric input
/// yields `None`, which callers send as `null` ("clear the field").
#[must_use]
pub fn parse_reference_str(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Normalize a JSON identifier into a reference identifier
///
/// Integers pass through, strings go through [`parse_reference_str`],
/// everything else (null, floats, booleans, containers) yields `None`.
#[must_use]
pub fn normalize_reference_id(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_reference_str(s),
        _ => None,
    }
}

/// Reference to another entity
#[derive(Debug, Clone, PartialEq)]
pub struct RefValue {
    /// Identifier of the referenced entity
    pub id: i64,
    /// Display label, if the server provided one
    pub label: Option<String>,
    /// Raw attributes of the referenced entity (for custom renderers)
    pub attributes: Map<String, Value>,
}

impl RefValue {
    /// Create reference with a label
    #[inline]
    #[must_use]
    pub fn new(id: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: Some(label.into()),
            attributes: Map::new(),
        }
    }

    /// Create reference known only by identifier
    #[inline]
    #[must_use]
    pub fn bare(id: i64) -> Self {
        Self {
            id,
            label: None,
            attributes: Map::new(),
        }
    }

    /// Build reference from an entity object
    ///
    /// Returns `None` when the identifier attribute is missing or does not
    /// normalize to an integer.
    #[must_use]
    pub fn from_object(
        object: &Map<String, Value>,
        id_attribute: &str,
        display_attribute: &str,
    ) -> Option<Self> {
        let id = object.get(id_attribute).and_then(normalize_reference_id)?;
        let label = object.get(display_attribute).and_then(label_of);
        Some(Self {
            id,
            label,
            attributes: object.clone(),
        })
    }

    /// Label to show, falling back to the identifier
    #[must_use]
    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.id.to_string())
    }

    /// Value sent to the server when this reference is selected
    #[inline]
    #[must_use]
    pub fn to_patch_value(&self) -> Value {
        Value::from(self.id)
    }
}

/// Convert a JSON value into a label string
pub(crate) fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Current value of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Reference to another entity
    Reference(RefValue),
    /// Plain value (string, number, timestamp, ...); never `null`
    Scalar(Value),
}

impl FieldValue {
    /// Get reference, if this is a reference value
    #[inline]
    #[must_use]
    pub fn as_reference(&self) -> Option<&RefValue> {
        match self {
            Self::Reference(r) => Some(r),
            Self::Scalar(_) => None,
        }
    }

    /// Value sent to the server for this field value
    #[must_use]
    pub fn to_patch_value(&self) -> Value {
        match self {
            Self::Reference(r) => r.to_patch_value(),
            Self::Scalar(v) => v.clone(),
        }
    }
}
