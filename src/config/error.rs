//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_io_error_keeps_source() {
        let err = ConfigError::Io(
            PathBuf::from("vecto.toml"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "IO error when reading `vecto.toml`");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_validation_message() {
        let err = ConfigError::Validation("engine.timeout must be positive".into());
        assert!(err.to_string().contains("engine.timeout"));
    }
}
