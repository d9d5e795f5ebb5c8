//! Seeded train/test splitting, with optional stratification.

use crate::error::{DataError, Result};
use crate::utils::{cell_to_string, column, take_rows};
use polars::prelude::*;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Default train fraction used when callers do not specify one.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.75;

/// A disjoint partition of a dataset into training and testing frames.
///
/// Training and testing together contain every input row exactly once.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: DataFrame,
    pub test: DataFrame,
}

impl Split {
    /// Number of training rows.
    pub fn train_len(&self) -> usize {
        self.train.height()
    }

    /// Number of testing rows.
    pub fn test_len(&self) -> usize {
        self.test.height()
    }
}

fn validate_fraction(train_fraction: f64) -> Result<()> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(DataError::InvalidFraction(train_fraction));
    }
    Ok(())
}

fn group_train_size(len: usize, train_fraction: f64) -> usize {
    // Rounding keeps |train/len - fraction| within 1/len.
    let n = (len as f64 * train_fraction).round() as usize;
    n.clamp(1, len - 1)
}

/// Randomly partition `df` into training and testing frames.
///
/// Deterministic for a given `seed`; different seeds produce different
/// partitions. The training size is `round(height * train_fraction)`,
/// clamped so that neither side is empty.
pub fn train_test_split(df: &DataFrame, train_fraction: f64, seed: u64) -> Result<Split> {
    validate_fraction(train_fraction)?;

    let n = df.height();
    if n < 2 {
        return Err(DataError::EmptyGroup {
            column: "<whole dataset>".to_string(),
            value: "<all rows>".to_string(),
            size: n,
        });
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_train = group_train_size(n, train_fraction);
    let split = Split {
        train: take_rows(df, &indices[..n_train])?,
        test: take_rows(df, &indices[n_train..])?,
    };

    info!(
        "Split {} rows into {} train / {} test (fraction {}, seed {})",
        n,
        split.train_len(),
        split.test_len(),
        train_fraction,
        seed
    );
    Ok(split)
}

/// Partition `df` preserving per-category proportions of `stratify_by`.
///
/// Rows are grouped by the stratification column's value; the fraction is
/// applied independently within each group and the groups are concatenated
/// (training parts first, then testing parts), so each category's
/// train/test ratio matches the global ratio within one row per group.
pub fn stratified_split(
    df: &DataFrame,
    train_fraction: f64,
    stratify_by: &str,
    seed: u64,
) -> Result<Split> {
    validate_fraction(train_fraction)?;

    let groups = group_indices(df, stratify_by)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut train_idx: Vec<usize> = Vec::new();
    let mut test_idx: Vec<usize> = Vec::new();
    let mut n_strata = 0usize;

    for (value, mut indices) in groups {
        if indices.len() < 2 {
            return Err(DataError::EmptyGroup {
                column: stratify_by.to_string(),
                value,
                size: indices.len(),
            });
        }

        indices.shuffle(&mut rng);
        let n_train = group_train_size(indices.len(), train_fraction);
        debug!(
            "Stratum '{}' of '{}': {} rows, {} to train",
            value,
            stratify_by,
            indices.len(),
            n_train
        );
        n_strata += 1;
        train_idx.extend_from_slice(&indices[..n_train]);
        test_idx.extend_from_slice(&indices[n_train..]);
    }

    let split = Split {
        train: take_rows(df, &train_idx)?,
        test: take_rows(df, &test_idx)?,
    };
    info!(
        "Stratified split on '{}': {} strata, {} train / {} test",
        stratify_by,
        n_strata,
        split.train_len(),
        split.test_len()
    );
    Ok(split)
}

/// Group row indices by the stringified value of `column_name`, in first
/// appearance order (deterministic across runs).
pub fn group_indices(df: &DataFrame, column_name: &str) -> Result<Vec<(String, Vec<usize>)>> {
    let col = column(df, column_name)?;
    let series = col.as_materialized_series();

    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for i in 0..series.len() {
        let key = cell_to_string(&series.get(i)?);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, indices)) => indices.push(i),
            None => groups.push((key, vec![i])),
        }
    }
    Ok(groups)
}
