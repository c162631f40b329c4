//! Display rendering rules

use crate::descriptor::FieldKind;
use serde_json::Value;
use std::fmt;

/// Placeholder shown for fields without a value
pub const PLACEHOLDER: &str = "None";

/// Length of the calendar-date prefix of an ISO-8601 timestamp
const DATE_LEN: usize = 10;

/// What a field shows while not being edited
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayValue {
    /// No value; rendered as a muted placeholder
    Placeholder,
    /// Rendered value
    Text(String),
}

impl DisplayValue {
    /// Check if this is the muted placeholder
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Text to show, using `placeholder` for missing values
    #[must_use]
    pub fn text_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self {
            Self::Placeholder => placeholder,
            Self::Text(text) => text,
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text_or(PLACEHOLDER))
    }
}

/// Calendar-date portion of a timestamp (its first ten characters)
#[must_use]
pub fn date_portion(timestamp: &str) -> &str {
    match timestamp.char_indices().nth(DATE_LEN) {
        Some((end, _)) => &timestamp[..end],
        None => timestamp,
    }
}

pub(crate) fn render_scalar(kind: &FieldKind, value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match kind {
        FieldKind::Date => date_portion(&text).to_string(),
        FieldKind::Text | FieldKind::Reference(_) => text,
    }
}
