//! Edit sessions
//!
//! One [`EditSession`] exists per field while it is being edited or saved.
//! It owns the field's [`AutocompleteBinding`], so the binding lives exactly
//! as long as the session of a reference-typed field.

use crate::binding::AutocompleteBinding;
use pw_model::{parse_reference_str, FieldDescriptor, FieldKind, FieldValue};
use serde_json::Value;
use ulid::Ulid;

/// Unique edit session identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(pub Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pending edit of one field
#[derive(Debug)]
pub struct EditSession {
    id: SessionId,
    text: String,
    seed: Option<Value>,
    binding: Option<AutocompleteBinding>,
    dirty: bool,
}

impl EditSession {
    /// Open a session seeded with the descriptor's current value
    ///
    /// Reference fields get an active autocomplete binding whose selection
    /// is the current value.
    #[must_use]
    pub fn open(descriptor: &FieldDescriptor, min_query_len: usize) -> Self {
        let id = SessionId::new();
        let current = descriptor.current();

        let binding = match descriptor.kind() {
            FieldKind::Reference(config) => {
                let mut binding =
                    AutocompleteBinding::new(id, descriptor.name(), config.clone(), min_query_len);
                binding.activate(current.and_then(FieldValue::as_reference).cloned());
                Some(binding)
            }
            FieldKind::Text | FieldKind::Date => None,
        };

        let text = match current {
            Some(FieldValue::Scalar(Value::String(s))) => s.clone(),
            Some(FieldValue::Scalar(other)) => other.to_string(),
            Some(FieldValue::Reference(r)) => r.id.to_string(),
            None => String::new(),
        };

        let seed = match current {
            Some(FieldValue::Scalar(value)) => Some(value.clone()),
            _ => None,
        };

        Self {
            id,
            text,
            seed,
            binding,
            dirty: false,
        }
    }

    /// Session identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Autocomplete binding of a reference field
    #[inline]
    #[must_use]
    pub fn binding(&self) -> Option<&AutocompleteBinding> {
        self.binding.as_ref()
    }

    /// Mutable autocomplete binding of a reference field
    #[inline]
    pub fn binding_mut(&mut self) -> Option<&mut AutocompleteBinding> {
        self.binding.as_mut()
    }

    /// Pending text of a free-form field
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if the user changed anything since the session opened
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replace the pending text of a free-form field
    ///
    /// # Returns
    /// `true` if the text changed
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_string();
        self.dirty = true;
        true
    }

    /// Apply a raw value from a reference input
    ///
    /// Integers select that identifier; anything else clears the selection.
    ///
    /// # Returns
    /// `true` if the selection changed
    pub fn set_raw_reference(&mut self, raw: &str) -> bool {
        let Some(binding) = self.binding.as_mut() else {
            return false;
        };
        let changed = match parse_reference_str(raw) {
            Some(id) => binding.select_id(id),
            None => binding.clear(),
        };
        self.dirty |= changed;
        changed
    }

    /// Record a selection change made through the binding
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Value to send: the selected identifier or `null` for reference fields,
    /// the text or `null` when blank for free-form fields
    ///
    /// Text that still parses as the type of the seeded number or boolean is
    /// sent with that type.
    #[must_use]
    pub fn candidate(&self) -> Value {
        match &self.binding {
            Some(binding) => binding
                .selected()
                .map_or(Value::Null, pw_model::RefValue::to_patch_value),
            None if self.text.trim().is_empty() => Value::Null,
            None => typed_like(self.seed.as_ref(), &self.text),
        }
    }

    /// Tear down the binding before the session is dropped
    pub fn close(&mut self) {
        if let Some(binding) = self.binding.as_mut() {
            binding.teardown();
        }
    }
}

fn typed_like(seed: Option<&Value>, text: &str) -> Value {
    let trimmed = text.trim();
    match seed {
        Some(Value::Number(_)) => match serde_json::from_str::<Value>(trimmed) {
            Ok(number @ Value::Number(_)) => number,
            _ => Value::String(text.to_string()),
        },
        Some(Value::Bool(_)) => trimmed
            .parse::<bool>()
            .map_or_else(|_| Value::String(text.to_string()), Value::Bool),
        _ => Value::String(text.to_string()),
    }
}

impl Drop for EditSession {
    fn drop(&mut self) {
        self.close();
    }
}
