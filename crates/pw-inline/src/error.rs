//! Error types for the field state machines
//!
//! Remote failures never show up here: a failed patch is an outcome
//! ([`crate::ConfirmOutcome::Rejected`]) and a failed search is an empty
//! candidate list. These errors only report misuse of the lifecycle.

use crate::widget::FieldState;
use pw_model::ModelError;

/// Lifecycle action attempted on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    /// Open the editor
    BeginEdit,
    /// Send the pending value
    Confirm,
    /// Settle an outstanding patch
    CompleteConfirm,
    /// Close the editor without saving
    Cancel,
    /// Change the pending value
    Input,
    /// Replace the field's descriptor
    Register,
}

impl std::fmt::Display for FieldAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BeginEdit => "begin edit",
            Self::Confirm => "confirm",
            Self::CompleteConfirm => "complete confirm",
            Self::Cancel => "cancel",
            Self::Input => "input",
            Self::Register => "re-register",
        };
        f.write_str(name)
    }
}

/// Field lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// Action not allowed in the current state
    #[error("cannot {action} field `{field}` while {state:?}")]
    InvalidTransition {
        /// Field name
        field: String,
        /// State the field was in
        state: FieldState,
        /// Attempted action
        action: FieldAction,
    },

    /// No field registered under this name
    #[error("unknown field `{0}`")]
    UnknownField(String),

    /// Autocomplete operation on a field that is not reference-typed
    #[error("field `{0}` is not a reference field")]
    NotReferenceField(String),

    /// Completion does not belong to the field's current session
    #[error("stale completion for field `{0}`")]
    StaleCompletion(String),

    /// Invalid descriptor
    #[error("invalid descriptor: {0}")]
    Model(#[from] ModelError),
}

impl FieldError {
    /// Check if this is an invalid-transition error
    #[inline]
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}

/// Editor configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for the configuration
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values are out of range
    #[error("invalid config: {0}")]
    Invalid(#[from] pw_remote::ConfigError),
}
