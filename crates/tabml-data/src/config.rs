//! Configuration for the preprocessing pipeline.
//!
//! Uses the builder pattern for flexible setup; all options are validated
//! before fitting begins.

use serde::{Deserialize, Serialize};

/// Which numeric columns the correlation filter may drop.
///
/// The scope is always explicit; the target column is never a candidate in
/// either scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CorrelationScope {
    /// Only the declared feature columns are candidates.
    #[default]
    FeaturesOnly,
    /// All numeric columns except the target are candidates.
    AllNumeric,
}

/// Configuration for [`Preprocessor`](crate::Preprocessor).
///
/// # Example
///
/// ```rust,ignore
/// use tabml_data::{PreprocessConfig, CorrelationScope};
///
/// let config = PreprocessConfig::builder()
///     .correlation_threshold(0.85)
///     .correlation_scope(CorrelationScope::FeaturesOnly)
///     .exclude_from_scaling(["year"])
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Absolute correlation above which one column of a pair is dropped.
    /// Default: 0.9
    pub correlation_threshold: f64,

    /// Column scope of the correlation filter.
    /// Default: FeaturesOnly
    pub correlation_scope: CorrelationScope,

    /// Target/outcome column. Passes through every step untouched and is
    /// never a correlation-filter candidate.
    /// Default: None
    pub target_column: Option<String>,

    /// Columns exempt from centering and scaling (e.g. intentionally
    /// constant columns that would otherwise fail as degenerate).
    /// Default: empty
    pub exclude_from_scaling: Vec<String>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.9,
            correlation_scope: CorrelationScope::default(),
            target_column: None,
            exclude_from_scaling: Vec::new(),
        }
    }
}

impl PreprocessConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessConfigBuilder {
        PreprocessConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.correlation_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "correlation_threshold".to_string(),
                value: self.correlation_threshold,
            });
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },
}

/// Builder for [`PreprocessConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessConfigBuilder {
    correlation_threshold: Option<f64>,
    correlation_scope: Option<CorrelationScope>,
    target_column: Option<String>,
    exclude_from_scaling: Vec<String>,
}

impl PreprocessConfigBuilder {
    /// Set the absolute correlation threshold for the filter step.
    pub fn correlation_threshold(mut self, threshold: f64) -> Self {
        self.correlation_threshold = Some(threshold);
        self
    }

    /// Set the column scope of the correlation filter.
    pub fn correlation_scope(mut self, scope: CorrelationScope) -> Self {
        self.correlation_scope = Some(scope);
        self
    }

    /// Declare the target column so it passes through untouched.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Exempt columns from centering and scaling.
    pub fn exclude_from_scaling<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_from_scaling = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreprocessConfig` or an error if validation fails.
    pub fn build(self) -> Result<PreprocessConfig, ConfigValidationError> {
        let config = PreprocessConfig {
            correlation_threshold: self.correlation_threshold.unwrap_or(0.9),
            correlation_scope: self.correlation_scope.unwrap_or_default(),
            target_column: self.target_column,
            exclude_from_scaling: self.exclude_from_scaling,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessConfig::default();
        assert_eq!(config.correlation_threshold, 0.9);
        assert_eq!(config.correlation_scope, CorrelationScope::FeaturesOnly);
        assert!(config.target_column.is_none());
        assert!(config.exclude_from_scaling.is_empty());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PreprocessConfig::builder()
            .correlation_threshold(0.8)
            .correlation_scope(CorrelationScope::AllNumeric)
            .target_column("species")
            .exclude_from_scaling(["year"])
            .build()
            .unwrap();

        assert_eq!(config.correlation_threshold, 0.8);
        assert_eq!(config.correlation_scope, CorrelationScope::AllNumeric);
        assert_eq!(config.target_column.as_deref(), Some("species"));
        assert_eq!(config.exclude_from_scaling, vec!["year"]);
    }

    #[test]
    fn test_validation_rejects_bad_threshold() {
        let result = PreprocessConfig::builder().correlation_threshold(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidThreshold { .. }
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PreprocessConfig::builder()
            .target_column("weekly_attendance")
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: PreprocessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.target_column.as_deref(), Some("weekly_attendance"));
        assert_eq!(back.correlation_threshold, config.correlation_threshold);
    }
}
