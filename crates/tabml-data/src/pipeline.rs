//! Fitted preprocessing pipeline: correlation filter, centering, scaling.
//!
//! `Preprocessor::fit` learns everything from the training frame once; the
//! resulting [`FittedPipeline`] replays the recorded drop list and column
//! statistics on any frame with the same schema. Nothing is ever recomputed
//! from the frame being transformed, so test data cannot leak into the
//! parameters.

use crate::config::{CorrelationScope, PreprocessConfig};
use crate::error::{DataError, Result};
use crate::utils::{column, column_as_f64, is_numeric_dtype, mean, numeric_column_names, pearson, sample_std};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-column training statistics frozen at fit time.
///
/// `std` is the sample standard deviation (ddof = 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub mean: f64,
    pub std: f64,
}

/// Fits preprocessing steps on a training frame.
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    /// Create a preprocessor with the given configuration.
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Create a preprocessor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PreprocessConfig::default())
    }

    /// Fit the pipeline on `df`, treating `feature_columns` as the model
    /// inputs.
    ///
    /// Steps run in fixed order: correlation filter, then centering and
    /// scaling statistics over the surviving numeric feature columns.
    /// Non-numeric columns and the configured target are never touched.
    pub fn fit(&self, df: &DataFrame, feature_columns: &[String]) -> Result<FittedPipeline> {
        for name in feature_columns {
            column(df, name)?;
        }

        let numeric_features: Vec<String> = feature_columns
            .iter()
            .filter(|name| {
                df.column(name)
                    .map(|c| is_numeric_dtype(c.dtype()))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();

        let candidates = self.filter_candidates(df, &numeric_features);
        let dropped = self.correlation_filter(df, &candidates)?;

        let mut stats = Vec::new();
        for name in &numeric_features {
            if dropped.contains(name) || self.config.exclude_from_scaling.contains(name) {
                continue;
            }
            let values = column_as_f64(df, name)?;
            let col_mean = mean(&values).unwrap_or(0.0);
            let col_std = sample_std(&values).unwrap_or(0.0);
            if col_std == 0.0 {
                return Err(DataError::DegenerateColumn(name.clone()));
            }
            stats.push(ColumnStats {
                column: name.clone(),
                mean: col_mean,
                std: col_std,
            });
        }

        info!(
            "Fitted pipeline: {} column(s) dropped by correlation filter, {} column(s) scaled",
            dropped.len(),
            stats.len()
        );
        Ok(FittedPipeline { dropped, stats })
    }

    fn filter_candidates(&self, df: &DataFrame, numeric_features: &[String]) -> Vec<String> {
        let mut candidates = match self.config.correlation_scope {
            CorrelationScope::FeaturesOnly => numeric_features.to_vec(),
            CorrelationScope::AllNumeric => numeric_column_names(df),
        };
        if let Some(target) = &self.config.target_column {
            candidates.retain(|name| name != target);
        }
        candidates
    }

    /// Decide which candidate columns to drop.
    ///
    /// For each pair with absolute Pearson correlation above the threshold,
    /// the column with the larger mean absolute correlation to all other
    /// candidates is dropped; ties drop the later column in column order.
    /// Mean correlations are computed once over the full candidate set, so
    /// the outcome does not depend on drop order.
    fn correlation_filter(&self, df: &DataFrame, candidates: &[String]) -> Result<Vec<String>> {
        if candidates.len() < 2 {
            return Ok(Vec::new());
        }

        let values: Vec<Vec<Option<f64>>> = candidates
            .iter()
            .map(|name| column_as_f64(df, name))
            .collect::<Result<_>>()?;

        let n = candidates.len();
        let mut corr = vec![vec![0.0f64; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let r = pearson(&values[i], &values[j]).abs();
                corr[i][j] = r;
                corr[j][i] = r;
            }
        }

        let mean_abs: Vec<f64> = (0..n)
            .map(|i| corr[i].iter().sum::<f64>() / (n - 1) as f64)
            .collect();

        let mut alive = vec![true; n];
        let mut dropped = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if !alive[i] || !alive[j] {
                    continue;
                }
                if corr[i][j] > self.config.correlation_threshold {
                    let victim = if mean_abs[i] > mean_abs[j] { i } else { j };
                    alive[victim] = false;
                    debug!(
                        "Dropping '{}' (|r|={:.3} with '{}', mean |r| {:.3})",
                        candidates[victim],
                        corr[i][j],
                        candidates[if victim == i { j } else { i }],
                        mean_abs[victim]
                    );
                    dropped.push(candidates[victim].clone());
                }
            }
        }
        Ok(dropped)
    }
}

/// Frozen preprocessing parameters learned from a training frame.
///
/// Immutable once fitted; `transform` is deterministic and idempotent for a
/// given input frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    dropped: Vec<String>,
    stats: Vec<ColumnStats>,
}

impl FittedPipeline {
    /// Columns removed by the correlation filter, in drop order.
    pub fn dropped_columns(&self) -> &[String] {
        &self.dropped
    }

    /// Frozen per-column training statistics.
    pub fn column_stats(&self) -> &[ColumnStats] {
        &self.stats
    }

    /// Apply the recorded drop list and standardization to `df`.
    ///
    /// Replays the training parameters exactly; the input frame's own
    /// distribution never influences the result.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();

        for name in &self.dropped {
            out = out.drop(name)?;
        }

        for stat in &self.stats {
            let values = column_as_f64(&out, &stat.column)?;
            let standardized: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.map(|v| (v - stat.mean) / stat.std))
                .collect();
            let series = Series::new(stat.column.as_str().into(), standardized);
            out.replace(&stat.column, series)?;
        }

        Ok(out)
    }

    /// Training mean and std for a scaled column, if it was scaled.
    pub fn stats_for(&self, column: &str) -> Option<&ColumnStats> {
        self.stats.iter().find(|s| s.column == column)
    }
}
