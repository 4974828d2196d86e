use thiserror::Error;

/// Errors surfaced while loading a supervision descriptor file.
///
/// Every variant aborts the load; a descriptor set is never returned
/// partially populated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed descriptor file: {0}")]
    MalformedSyntax(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Duplicate process name: {0}")]
    DuplicateName(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unsupported file format: {0}. Use .json or .toml")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for descriptor operations
pub type Result<T> = std::result::Result<T, ConfigError>;
