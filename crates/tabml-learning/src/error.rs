//! Error types for the learning crate.
//!
//! All public API functions return `Result<T, LearningError>`. Validation
//! failures (schema, mode compatibility) are detected before any numerical
//! work begins, so a failing call leaves no partial artifact.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for training, prediction, and evaluation.
#[derive(Error, Debug)]
pub enum LearningError {
    /// The requested model kind does not support the requested mode.
    #[error("Model kind {kind} does not support {mode} mode")]
    UnsupportedMode { kind: String, mode: String },

    /// A required feature column is missing or has the wrong shape.
    ///
    /// Prediction inputs must carry every feature column the model was
    /// fitted on, with numeric dtype.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The formula's target column was not found in the DataFrame.
    #[error("Target column '{0}' not found")]
    TargetNotFound(String),

    /// Invalid data provided for training or inference.
    ///
    /// Common causes: null values in feature columns, zero rows, or a
    /// classification target with a single class.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The delegated numerical library reported a failure.
    #[error("Training backend error: {0}")]
    Backend(String),

    /// An error from the data layer (splitting, preprocessing).
    #[error(transparent)]
    Data(#[from] tabml_data::DataError),
}

impl LearningError {
    /// Get a stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedMode { .. } => "UNSUPPORTED_MODE",
            Self::SchemaMismatch(_) => "SCHEMA_MISMATCH",
            Self::TargetNotFound(_) => "TARGET_NOT_FOUND",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::Backend(_) => "BACKEND_ERROR",
            Self::Data(e) => e.error_code(),
        }
    }
}

/// Serialize as a `{code, message}` struct for transport to a frontend.
impl Serialize for LearningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("LearningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = LearningError::UnsupportedMode {
            kind: "Linear".to_string(),
            mode: "Classification".to_string(),
        };
        assert_eq!(err.error_code(), "UNSUPPORTED_MODE");
        assert_eq!(
            LearningError::TargetNotFound("y".to_string()).error_code(),
            "TARGET_NOT_FOUND"
        );
    }

    #[test]
    fn test_data_errors_keep_their_code() {
        let err = LearningError::Data(tabml_data::DataError::InvalidFraction(2.0));
        assert_eq!(err.error_code(), "INVALID_FRACTION");
    }

    #[test]
    fn test_error_serialization() {
        let err = LearningError::SchemaMismatch("missing column 'bill_depth_mm'".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("SCHEMA_MISMATCH"));
        assert!(json.contains("bill_depth_mm"));
    }
}
