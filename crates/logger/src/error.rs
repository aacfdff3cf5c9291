//! Registry error types

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors from building or operating a logger registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A logger's configuration is unusable
    #[error("logger '{logger}' has invalid {field}: {message}")]
    InvalidValue {
        /// The logger being configured
        logger: String,
        /// Field name
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// The underlying sink could not be built or operated
    #[error(transparent)]
    Sink(#[from] lumber_sinks::SinkError),
}

impl RegistryError {
    /// Create an InvalidValue error
    pub fn invalid_value(
        logger: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            logger: logger.into(),
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_names_the_logger() {
        let err = RegistryError::invalid_value("net", "path", "must not be empty");
        assert!(err.to_string().contains("net"));
        assert!(err.to_string().contains("path"));
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_sink_error_passes_through() {
        let err: RegistryError =
            lumber_sinks::SinkError::config("max_size", "must be greater than zero").into();
        assert!(err.to_string().contains("max_size"));
    }
}
