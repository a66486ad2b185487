//! Error types for fortiplug

/// Error type for fortiplug operations
#[derive(Debug, thiserror::Error)]
pub enum PlugError {
    #[error("Resource type not found: {0}")]
    ResourceNotFound(String),

    #[error("Data source type not found: {0}")]
    DataSourceNotFound(String),

    #[error("Provider not configured")]
    ProviderNotConfigured,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// A value had a different shape than its field descriptor declares.
    #[error("Type mismatch at {path}: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("{0}")]
    Custom(String),
}

impl PlugError {
    pub fn type_mismatch(
        path: impl ToString,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        PlugError::TypeMismatch {
            path: path.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type alias for fortiplug operations
pub type Result<T> = std::result::Result<T, PlugError>;

impl From<String> for PlugError {
    fn from(s: String) -> Self {
        PlugError::Custom(s)
    }
}

impl From<&str> for PlugError {
    fn from(s: &str) -> Self {
        PlugError::Custom(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_names_the_path() {
        let err = PlugError::type_mismatch("entries[0].id", "integer", "string");
        assert_eq!(
            err.to_string(),
            "Type mismatch at entries[0].id: expected integer, got string"
        );
    }

    #[test]
    fn strings_convert_into_custom_errors() {
        let err: PlugError = "Provider not configured".into();
        assert!(matches!(err, PlugError::Custom(ref s) if s == "Provider not configured"));
    }
}
