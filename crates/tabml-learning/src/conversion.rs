//! DataFrame to ndarray conversion.
//!
//! The seam between the tabular layer and the numerical libraries. All
//! schema and null checks happen here, up front, so the numerical code can
//! assume dense, finite matrices.

use crate::error::{LearningError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tabml_data::DataError;
use tabml_data::utils::cell_to_string;

fn feature_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let values = tabml_data::column_as_f64(df, name).map_err(|e| match e {
        DataError::ColumnNotFound(c) => {
            LearningError::SchemaMismatch(format!("feature column '{}' not found", c))
        }
        DataError::NotNumeric { column, dtype } => LearningError::SchemaMismatch(format!(
            "feature column '{}' has non-numeric dtype {}",
            column, dtype
        )),
        other => LearningError::Data(other),
    })?;

    values
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                LearningError::InvalidData(format!("feature column '{}' contains nulls", name))
            })
        })
        .collect()
}

/// Build the feature matrix, one row per input row and one column per
/// feature, in the given feature order.
pub fn feature_matrix(df: &DataFrame, features: &[String]) -> Result<Array2<f64>> {
    let columns: Vec<Vec<f64>> = features
        .iter()
        .map(|name| feature_values(df, name))
        .collect::<Result<_>>()?;

    let n_rows = df.height();
    if n_rows == 0 {
        return Err(LearningError::InvalidData(
            "input frame has zero rows".to_string(),
        ));
    }

    Ok(Array2::from_shape_fn((n_rows, features.len()), |(i, j)| {
        columns[j][i]
    }))
}

/// Extract a numeric regression target vector.
pub fn numeric_targets(df: &DataFrame, target: &str) -> Result<Array1<f64>> {
    let values = tabml_data::column_as_f64(df, target).map_err(|e| match e {
        DataError::ColumnNotFound(c) => LearningError::TargetNotFound(c),
        other => LearningError::Data(other),
    })?;

    let dense: Vec<f64> = values
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                LearningError::InvalidData(format!("target column '{}' contains nulls", target))
            })
        })
        .collect::<Result<_>>()?;
    Ok(Array1::from_vec(dense))
}

/// Extract a label column as plain strings, rejecting nulls.
pub fn label_values(df: &DataFrame, target: &str) -> Result<Vec<String>> {
    let col = df
        .column(target)
        .map_err(|_| LearningError::TargetNotFound(target.to_string()))?;
    let series = col.as_materialized_series();

    let mut raw: Vec<String> = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        let value = series
            .get(i)
            .map_err(|e| LearningError::Backend(e.to_string()))?;
        if matches!(value, AnyValue::Null) {
            return Err(LearningError::InvalidData(format!(
                "target column '{}' contains nulls",
                target
            )));
        }
        raw.push(cell_to_string(&value));
    }
    Ok(raw)
}

/// Extract a classification target as class indices, plus the sorted label
/// vocabulary that defines the index order.
///
/// The label order is fixed here and frozen into the trained model, so
/// probability columns stay stable across calls.
pub fn class_targets(df: &DataFrame, target: &str) -> Result<(Array1<usize>, Vec<String>)> {
    let raw = label_values(df, target)?;

    let mut labels: Vec<String> = raw.clone();
    labels.sort();
    labels.dedup();
    if labels.len() < 2 {
        return Err(LearningError::InvalidData(format!(
            "target column '{}' has {} distinct class(es); at least 2 are required",
            target,
            labels.len()
        )));
    }

    let encoded: Vec<usize> = raw
        .iter()
        .map(|label| labels.binary_search(label).unwrap_or(0))
        .collect();
    Ok((Array1::from_vec(encoded), labels))
}
