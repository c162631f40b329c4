//! Field descriptors
//!
//! A [`FieldDescriptor`] is immutable for the lifetime of one editing
//! session. Refreshing from the server produces a new descriptor
//! ([`FieldDescriptor::refreshed_from`]) rather than mutating the old one.

use crate::error::ModelError;
use crate::record::Record;
use crate::render::{render_scalar, DisplayValue};
use crate::value::{label_of, normalize_reference_id, FieldValue, RefValue};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Custom label renderer for reference values
#[derive(Clone)]
pub struct Renderer(Arc<dyn Fn(&RefValue) -> String + Send + Sync>);

impl Renderer {
    /// Wrap a rendering function
    #[must_use]
    pub fn new(f: impl Fn(&RefValue) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Render a reference value
    #[inline]
    #[must_use]
    pub fn render(&self, value: &RefValue) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Renderer(..)")
    }
}

/// Remote autocomplete configuration of a reference field
#[derive(Debug, Clone)]
pub struct AutocompleteConfig {
    /// Search endpoint path (queried as `{endpoint}/?q=...&l=...`)
    pub search_endpoint: String,
    /// Identifier attribute of candidate objects
    pub id_attribute: String,
    /// Display attribute of candidate objects
    pub display_attribute: String,
    /// Attributes matched against the query when filtering candidates locally
    pub search_attributes: Vec<String>,
    /// Custom renderer; defaults to the display attribute
    pub renderer: Option<Renderer>,
}

impl AutocompleteConfig {
    /// Identifier attribute used unless overridden
    pub const DEFAULT_ID_ATTRIBUTE: &'static str = "pk";

    /// Create configuration for an endpoint and display attribute
    #[must_use]
    pub fn new(search_endpoint: impl Into<String>, display_attribute: impl Into<String>) -> Self {
        Self {
            search_endpoint: search_endpoint.into(),
            id_attribute: Self::DEFAULT_ID_ATTRIBUTE.to_string(),
            display_attribute: display_attribute.into(),
            search_attributes: Vec::new(),
            renderer: None,
        }
    }

    /// With identifier attribute
    #[inline]
    #[must_use]
    pub fn with_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = attribute.into();
        self
    }

    /// With attributes used for local candidate filtering
    #[must_use]
    pub fn with_search_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// With custom renderer
    #[inline]
    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Render a reference value with this configuration
    #[must_use]
    pub fn render(&self, value: &RefValue) -> String {
        match &self.renderer {
            Some(renderer) => renderer.render(value),
            None => value.display_label(),
        }
    }

    /// Build a candidate from a search result object
    #[must_use]
    pub fn candidate_from(&self, value: &Value) -> Option<RefValue> {
        value
            .as_object()
            .and_then(|obj| RefValue::from_object(obj, &self.id_attribute, &self.display_attribute))
    }

    /// Check whether a candidate matches a query on the search attributes
    ///
    /// Always true when no search attributes are configured.
    #[must_use]
    pub fn matches(&self, candidate: &RefValue, query: &str) -> bool {
        if self.search_attributes.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.search_attributes.iter().any(|attr| {
            candidate
                .attributes
                .get(attr)
                .and_then(label_of)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
    }

    fn validate(&self, field: &str) -> Result<(), ModelError> {
        let missing = if self.search_endpoint.trim().is_empty() {
            Some("a search endpoint")
        } else if self.id_attribute.is_empty() {
            Some("an identifier attribute")
        } else if self.display_attribute.is_empty() {
            Some("a display attribute")
        } else {
            None
        };
        match missing {
            Some(missing) => Err(ModelError::IncompleteAutocomplete {
                field: field.to_string(),
                missing,
            }),
            None => Ok(()),
        }
    }
}

/// Kind of an editable field
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Free-form value
    Text,
    /// Timestamp rendered as its calendar date
    Date,
    /// Reference to another entity, chosen through remote autocomplete
    Reference(AutocompleteConfig),
}

impl FieldKind {
    /// Check if reference-typed
    #[inline]
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    /// Get autocomplete configuration of a reference field
    #[inline]
    #[must_use]
    pub fn autocomplete(&self) -> Option<&AutocompleteConfig> {
        match self {
            Self::Reference(config) => Some(config),
            _ => None,
        }
    }
}

/// One editable attribute of a record
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    current: Option<FieldValue>,
}

impl FieldDescriptor {
    /// Create descriptor with no current value
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            current: None,
        }
    }

    /// Create free-form field
    #[inline]
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Create date field
    #[inline]
    #[must_use]
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    /// Create reference field
    #[inline]
    #[must_use]
    pub fn reference(name: impl Into<String>, autocomplete: AutocompleteConfig) -> Self {
        Self::new(name, FieldKind::Reference(autocomplete))
    }

    /// With current value
    #[inline]
    #[must_use]
    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.current = Some(value);
        self
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Current (server-confirmed) value
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&FieldValue> {
        self.current.as_ref()
    }

    /// Check if reference-typed
    #[inline]
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.kind.is_reference()
    }

    /// Validate descriptor
    ///
    /// # Errors
    /// - `ModelError::EmptyFieldName` if the name is blank
    /// - `ModelError::IncompleteAutocomplete` if a reference field is misconfigured
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyFieldName);
        }
        if let FieldKind::Reference(config) = &self.kind {
            config.validate(&self.name)?;
        }
        Ok(())
    }

    /// Extract this field's value from an authoritative record
    ///
    /// Reference attributes are recognized either as a nested object
    /// (`{"reviewer": {"pk": 7, "name": "Alice"}}`) or as a flat identifier
    /// with a sibling label (`{"reviewer": 7, "reviewer__name": "Alice"}`).
    #[must_use]
    pub fn value_from_record(&self, record: &Record) -> Option<FieldValue> {
        let raw = record.get(&self.name)?;
        if raw.is_null() {
            return None;
        }
        match &self.kind {
            FieldKind::Reference(config) => match raw {
                Value::Object(obj) => {
                    RefValue::from_object(obj, &config.id_attribute, &config.display_attribute)
                        .map(FieldValue::Reference)
                }
                flat => {
                    let id = normalize_reference_id(flat)?;
                    let label = self.sibling_label(record, &config.display_attribute);
                    Some(FieldValue::Reference(RefValue {
                        id,
                        label,
                        attributes: serde_json::Map::new(),
                    }))
                }
            },
            FieldKind::Text | FieldKind::Date => Some(FieldValue::Scalar(raw.clone())),
        }
    }

    fn sibling_label(&self, record: &Record, display_attribute: &str) -> Option<String> {
        [
            format!("{}__{}", self.name, display_attribute),
            format!("{}_{}", self.name, display_attribute),
        ]
        .iter()
        .find_map(|key| record.get(key).and_then(label_of))
    }

    /// Produce a new descriptor whose value comes from an authoritative record
    #[must_use]
    pub fn refreshed_from(&self, record: &Record) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            current: self.value_from_record(record),
        }
    }

    /// Render the current value for display
    #[must_use]
    pub fn render(&self) -> DisplayValue {
        let Some(value) = &self.current else {
            return DisplayValue::Placeholder;
        };
        match (&self.kind, value) {
            (FieldKind::Reference(config), FieldValue::Reference(r)) => {
                DisplayValue::Text(config.render(r))
            }
            (kind, FieldValue::Reference(r)) => {
                DisplayValue::Text(render_scalar(kind, &Value::from(r.display_label())))
            }
            (kind, FieldValue::Scalar(v)) => DisplayValue::Text(render_scalar(kind, v)),
        }
    }
}
