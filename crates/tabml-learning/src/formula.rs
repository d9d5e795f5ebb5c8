//! Formula: which column is predicted from which.
//!
//! A formula names the target column and the feature set, either as an
//! explicit list or as "all other columns". It is resolved against a
//! concrete schema exactly once, at fit time; the resolved column lists are
//! frozen into the trained model.

use crate::error::{LearningError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// The feature side of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSpec {
    /// An explicit list of feature columns, used in the given order.
    Columns(Vec<String>),
    /// Every column except the target, in frame column order.
    AllOthers,
}

/// Target and features of a modeling task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formula {
    pub target: String,
    pub features: FeatureSpec,
}

impl Formula {
    /// Predict `target` from an explicit list of feature columns.
    pub fn new<I, S>(target: impl Into<String>, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target: target.into(),
            features: FeatureSpec::Columns(features.into_iter().map(Into::into).collect()),
        }
    }

    /// Predict `target` from every other column.
    pub fn all_others(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            features: FeatureSpec::AllOthers,
        }
    }

    /// Resolve against a concrete schema, validating that the target and
    /// every feature exist and that the two sides are disjoint.
    pub fn resolve(&self, df: &DataFrame) -> Result<ResolvedFormula> {
        if df.column(&self.target).is_err() {
            return Err(LearningError::TargetNotFound(self.target.clone()));
        }

        let features = match &self.features {
            FeatureSpec::Columns(names) => {
                for name in names {
                    if df.column(name).is_err() {
                        return Err(LearningError::SchemaMismatch(format!(
                            "feature column '{}' not found",
                            name
                        )));
                    }
                    if name == &self.target {
                        return Err(LearningError::SchemaMismatch(format!(
                            "column '{}' cannot be both target and feature",
                            name
                        )));
                    }
                }
                names.clone()
            }
            FeatureSpec::AllOthers => df
                .get_columns()
                .iter()
                .map(|c| c.name().to_string())
                .filter(|name| name != &self.target)
                .collect(),
        };

        if features.is_empty() {
            return Err(LearningError::InvalidData(
                "formula resolves to zero feature columns".to_string(),
            ));
        }

        Ok(ResolvedFormula {
            target: self.target.clone(),
            features,
        })
    }
}

/// A formula bound to a concrete schema: explicit, validated column lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFormula {
    pub target: String,
    pub features: Vec<String>,
}
