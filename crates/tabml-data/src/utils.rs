//! Shared utilities for the data layer.
//!
//! Common helpers used across splitting and preprocessing to keep dtype
//! handling and statistics consistent.

use crate::error::{DataError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of all numeric columns, in frame column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

/// Fetch a column or fail with [`DataError::ColumnNotFound`].
pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| DataError::ColumnNotFound(name.to_string()))
}

/// Extract a numeric column as `Vec<Option<f64>>`, in row order.
pub fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = column(df, name)?;
    if !is_numeric_dtype(col.dtype()) {
        return Err(DataError::NotNumeric {
            column: name.to_string(),
            dtype: col.dtype().to_string(),
        });
    }
    let series = col.as_materialized_series().cast(&DataType::Float64)?;
    let ca = series.f64()?;
    Ok(ca.into_iter().collect())
}

/// Render a cell value as a plain string (no quoting), for use as a group key.
pub fn cell_to_string(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => (*s).to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Null => "<null>".to_string(),
        other => other.to_string(),
    }
}

/// Materialize the given row indices into a new frame, preserving order.
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = indices.iter().map(|&i| i as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}

// =============================================================================
// Statistics
// =============================================================================

/// Mean of the non-missing values, or `None` if all are missing.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Sample standard deviation (ddof = 1) of the non-missing values.
///
/// Returns 0.0 when fewer than two values are present.
pub fn sample_std(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    if present.len() < 2 {
        return Some(0.0);
    }
    let m = present.iter().sum::<f64>() / present.len() as f64;
    let variance = present.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        / (present.len() as f64 - 1.0);
    Some(variance.sqrt())
}

/// Pearson correlation over rows where both values are present.
///
/// Returns 0.0 when either side is constant or fewer than two complete
/// pairs exist.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .collect();

    if pairs.len() < 2 {
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }

    cov / (var_x.sqrt() * var_y.sqrt())
}
