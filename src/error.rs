//! Error types for the pdf-outline library.

use std::io;
use thiserror::Error;

/// Result type alias for pdf-outline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline extraction and model training.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document could not be located or decoded.
    #[error("Input unavailable: {source_name}: {reason}")]
    InputUnavailable {
        /// Path or name of the document
        source_name: String,
        /// Why the document could not be read
        reason: String,
    },

    /// The learned classifier has neither a trained model nor a dataset to train one.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The training dataset cannot be used.
    #[error("Invalid training data: {0}")]
    InvalidTrainingData(String),

    /// A model artifact does not match the feature schema of this build.
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build an [`Error::InputUnavailable`] for a named source.
    pub fn input_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InputUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ConfigurationMissing("no model".to_string());
        assert_eq!(err.to_string(), "Configuration missing: no model");

        let err = Error::input_unavailable("a.json", "not found");
        assert_eq!(err.to_string(), "Input unavailable: a.json: not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
