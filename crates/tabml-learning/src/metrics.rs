//! Evaluation metrics and ranking curves.
//!
//! Classification reports carry accuracy plus per-class precision, recall
//! and F1; regression reports carry RMSE, MAE and R². Curve functions
//! return plain ordered points for an external plotting layer.

use crate::error::{LearningError, Result};
use serde::{Deserialize, Serialize};

/// Precision/recall/F1 for a single class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true instances of this class.
    pub support: usize,
}

/// Metrics for one evaluation; fields not applicable to the mode stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: Option<f64>,
    pub per_class: Vec<ClassMetrics>,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    pub r2: Option<f64>,
}

impl MetricsReport {
    /// The scalar metrics present in this report, as (name, value) pairs.
    pub fn named_values(&self) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        if let Some(v) = self.accuracy {
            out.push(("accuracy".to_string(), v));
        }
        if let Some(v) = self.rmse {
            out.push(("rmse".to_string(), v));
        }
        if let Some(v) = self.mae {
            out.push(("mae".to_string(), v));
        }
        if let Some(v) = self.r2 {
            out.push(("r2".to_string(), v));
        }
        out
    }
}

/// A point on a ranking curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

fn check_lengths(truth_len: usize, predictions_len: usize) -> Result<()> {
    if truth_len == 0 {
        return Err(LearningError::InvalidData(
            "cannot compute metrics over zero rows".to_string(),
        ));
    }
    if truth_len != predictions_len {
        return Err(LearningError::InvalidData(format!(
            "truth has {} rows but predictions have {}",
            truth_len, predictions_len
        )));
    }
    Ok(())
}

/// Accuracy and per-class precision/recall/F1.
///
/// Classes are the sorted distinct truth labels; a predicted label never
/// seen in truth contributes to false positives only.
pub fn compute_classification(truth: &[String], predictions: &[String]) -> Result<MetricsReport> {
    check_lengths(truth.len(), predictions.len())?;

    let n = truth.len();
    let correct = truth
        .iter()
        .zip(predictions)
        .filter(|(t, p)| t == p)
        .count();

    let mut classes: Vec<String> = truth.to_vec();
    classes.sort();
    classes.dedup();

    let mut per_class = Vec::with_capacity(classes.len());
    for class in &classes {
        let tp = truth
            .iter()
            .zip(predictions)
            .filter(|(t, p)| *t == class && *p == class)
            .count() as f64;
        let false_pos = predictions
            .iter()
            .zip(truth)
            .filter(|(p, t)| *p == class && *t != class)
            .count() as f64;
        let false_neg = truth
            .iter()
            .zip(predictions)
            .filter(|(t, p)| *t == class && *p != class)
            .count() as f64;

        let precision = if tp + false_pos > 0.0 { tp / (tp + false_pos) } else { 0.0 };
        let recall = if tp + false_neg > 0.0 { tp / (tp + false_neg) } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        per_class.push(ClassMetrics {
            class: class.clone(),
            precision,
            recall,
            f1,
            support: (tp + false_neg) as usize,
        });
    }

    Ok(MetricsReport {
        accuracy: Some(correct as f64 / n as f64),
        per_class,
        ..Default::default()
    })
}

/// RMSE, MAE and R².
///
/// R² is `None` when the truth is constant (zero total variance).
pub fn compute_regression(truth: &[f64], predictions: &[f64]) -> Result<MetricsReport> {
    check_lengths(truth.len(), predictions.len())?;

    let n = truth.len() as f64;
    let mse = truth
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n;
    let mae = truth
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n;

    let mean_truth = truth.iter().sum::<f64>() / n;
    let ss_tot = truth.iter().map(|t| (t - mean_truth).powi(2)).sum::<f64>();
    let ss_res = truth
        .iter()
        .zip(predictions)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>();
    let r2 = if ss_tot > 0.0 {
        Some(1.0 - ss_res / ss_tot)
    } else {
        None
    };

    Ok(MetricsReport {
        rmse: Some(mse.sqrt()),
        mae: Some(mae),
        r2,
        ..Default::default()
    })
}

/// Rank rows by descending probability of the positive class; ties keep
/// their original order.
fn ranked_order(probabilities: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| {
        probabilities[b]
            .partial_cmp(&probabilities[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// ROC curve: (false positive rate, true positive rate) per ranked row,
/// starting at the origin.
pub fn roc_curve(
    truth: &[String],
    probabilities: &[f64],
    positive_class: &str,
) -> Result<Vec<CurvePoint>> {
    check_lengths(truth.len(), probabilities.len())?;

    let n_pos = truth.iter().filter(|t| *t == positive_class).count();
    let n_neg = truth.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(LearningError::InvalidData(format!(
            "ROC needs both classes present; '{}' covers {} of {} rows",
            positive_class,
            n_pos,
            truth.len()
        )));
    }

    let mut points = vec![CurvePoint { x: 0.0, y: 0.0 }];
    let mut tp = 0usize;
    let mut fp = 0usize;
    for &i in &ranked_order(probabilities) {
        if truth[i] == positive_class {
            tp += 1;
        } else {
            fp += 1;
        }
        points.push(CurvePoint {
            x: fp as f64 / n_neg as f64,
            y: tp as f64 / n_pos as f64,
        });
    }
    Ok(points)
}

/// Cumulative gain curve: (fraction of rows examined, fraction of all
/// positives captured) per ranked row, starting at the origin.
pub fn gain_curve(
    truth: &[String],
    probabilities: &[f64],
    positive_class: &str,
) -> Result<Vec<CurvePoint>> {
    check_lengths(truth.len(), probabilities.len())?;

    let n_pos = truth.iter().filter(|t| *t == positive_class).count();
    if n_pos == 0 {
        return Err(LearningError::InvalidData(format!(
            "gain curve needs at least one '{}' row",
            positive_class
        )));
    }

    let n = truth.len();
    let mut points = vec![CurvePoint { x: 0.0, y: 0.0 }];
    let mut captured = 0usize;
    for (examined, &i) in ranked_order(probabilities).iter().enumerate() {
        if truth[i] == positive_class {
            captured += 1;
        }
        points.push(CurvePoint {
            x: (examined + 1) as f64 / n as f64,
            y: captured as f64 / n_pos as f64,
        });
    }
    Ok(points)
}
