//! Error types for the record model

/// Errors raised while building descriptors or decoding records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Field name is empty
    #[error("field name must not be empty")]
    EmptyFieldName,

    /// Reference field is missing part of its autocomplete configuration
    #[error("reference field `{field}` is missing {missing}")]
    IncompleteAutocomplete {
        /// Field name
        field: String,
        /// Which part of the configuration is missing
        missing: &'static str,
    },

    /// Record representation is not a JSON object
    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_display() {
        let err = ModelError::IncompleteAutocomplete {
            field: "reviewer".to_string(),
            missing: "a search endpoint",
        };
        assert_eq!(
            err.to_string(),
            "reference field `reviewer` is missing a search endpoint"
        );
        assert!(ModelError::NotAnObject("array").to_string().contains("array"));
    }
}
