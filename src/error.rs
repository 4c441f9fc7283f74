//! User-visible conversion errors.
//!
//! Only two conditions ever abort a conversion: an image that cannot be
//! read, and a palette-guided request without a usable palette. Engine
//! problems are recovered inside the facade and show up in the result
//! metadata instead (see [`crate::engine::EngineError`]).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorizeError {
    /// Unreadable, zero-size or malformed pixel data. Fatal, never retried.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Palette-guided conversion was asked to use a caller palette that is
    /// missing or empty. Fatal for that call.
    #[error("palette mismatch: {0}")]
    PaletteMismatch(String),

    #[error("IO error when accessing `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VectorizeError {
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = VectorizeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = VectorizeError::invalid_image("zero width");
        assert_eq!(err.to_string(), "invalid image: zero width");

        let err = VectorizeError::PaletteMismatch("no palette supplied".into());
        assert!(err.to_string().starts_with("palette mismatch"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        use std::error::Error as _;
        let err = VectorizeError::io(
            "/nope/out.svg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("/nope/out.svg"));
        assert!(err.source().is_some());
    }
}
