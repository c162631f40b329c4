//! Server-side records
//!
//! A [`Record`] is kept as the JSON object the server returned. Callers must
//! replace local state with it, never merge into it.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifier of a record on the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Create new record identifier
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Full record representation as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create record from an attribute map
    #[inline]
    #[must_use]
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    /// Decode record from an arbitrary JSON value
    ///
    /// # Errors
    /// - `ModelError::NotAnObject` if the value is not a JSON object
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ModelError::NotAnObject(json_kind(&other))),
        }
    }

    /// Get attribute value
    #[inline]
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.0.get(attribute)
    }

    /// Record identifier, when the representation carries a numeric `id`
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.0.get("id").and_then(Value::as_u64).map(RecordId)
    }

    /// All attributes
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the attribute map
    #[inline]
    #[must_use]
    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
