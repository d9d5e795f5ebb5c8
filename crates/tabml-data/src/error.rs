//! Custom error types for the data layer.
//!
//! All validation failures are detected before any numerical work begins:
//! a call either fully succeeds and returns a schema-consistent result, or
//! fails with one of these variants and produces no partial artifact.
//!
//! Errors are serializable as `{code, message}` structs so callers can
//! forward them across process boundaries.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for dataset loading, splitting, and preprocessing.
#[derive(Error, Debug)]
pub enum DataError {
    /// A train fraction outside the open interval (0, 1).
    #[error("Invalid train fraction {0} (must be strictly between 0 and 1)")]
    InvalidFraction(f64),

    /// A stratification group too small to split.
    #[error("Stratification group '{value}' of column '{column}' has {size} row(s); at least 2 are required")]
    EmptyGroup {
        column: String,
        value: String,
        size: usize,
    },

    /// A constant numeric column whose standard deviation is zero.
    ///
    /// Scaling would divide by zero. Exclude the column explicitly via
    /// [`PreprocessConfig`](crate::PreprocessConfig) if it should pass
    /// through unscaled.
    #[error("Column '{0}' is constant (zero standard deviation) and cannot be scaled")]
    DegenerateColumn(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A column that must be numeric is not.
    #[error("Column '{column}' has non-numeric dtype {dtype}")]
    NotNumeric { column: String, dtype: String },

    /// Dataset download failed.
    #[error("Failed to download '{url}': {reason}")]
    Download { url: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl DataError {
    /// Get a stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidFraction(_) => "INVALID_FRACTION",
            Self::EmptyGroup { .. } => "EMPTY_GROUP",
            Self::DegenerateColumn(_) => "DEGENERATE_COLUMN",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NotNumeric { .. } => "NOT_NUMERIC",
            Self::Download { .. } => "DOWNLOAD_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }
}

/// Serialize as a `{code, message}` struct for transport to a frontend.
impl Serialize for DataError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("DataError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for data-layer operations.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            DataError::InvalidFraction(1.5).error_code(),
            "INVALID_FRACTION"
        );
        assert_eq!(
            DataError::DegenerateColumn("flat".to_string()).error_code(),
            "DEGENERATE_COLUMN"
        );
        assert_eq!(
            DataError::ColumnNotFound("species".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = DataError::EmptyGroup {
            column: "playoffs".to_string(),
            value: "Playoffs".to_string(),
            size: 1,
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("EMPTY_GROUP"));
        assert!(json.contains("playoffs"));
    }

    #[test]
    fn test_display_names_offending_value() {
        let error = DataError::InvalidFraction(0.0);
        assert!(error.to_string().contains("0"));

        let error = DataError::NotNumeric {
            column: "team".to_string(),
            dtype: "str".to_string(),
        };
        assert!(error.to_string().contains("team"));
        assert!(error.to_string().contains("str"));
    }
}
