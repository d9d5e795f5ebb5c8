//! Integration tests for the learning crate.
//!
//! Runs the full workflow on a 150-row, 3-class measurement fixture:
//! split, preprocess, train, predict, evaluate, cross-validate.

use pretty_assertions::assert_eq;
use tabml_data::{Preprocessor, load_csv, train_test_split};
use tabml_learning::{
    Formula, Hyperparameters, Mode, ModelKind, ModelSpec, PredictionOutput, Predictions, Trainer,
    compute_classification, compute_regression, cross_validate, gain_curve, roc_curve,
};

fn fixture_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("iris_like.csv")
}

fn all_features() -> Vec<String> {
    vec![
        "sepal_length".to_string(),
        "sepal_width".to_string(),
        "petal_length".to_string(),
        "petal_length_x2".to_string(),
    ]
}

#[test]
fn test_classification_workflow_end_to_end() {
    let df = load_csv(fixture_path()).unwrap();
    assert_eq!(df.height(), 150);

    let split = train_test_split(&df, 0.6, 42).unwrap();
    assert_eq!(split.train_len(), 90);
    assert_eq!(split.test_len(), 60);

    // The doubled duplicate of petal_length gets filtered out.
    let fitted = Preprocessor::with_defaults()
        .fit(&split.train, &all_features())
        .unwrap();
    assert_eq!(fitted.dropped_columns(), ["petal_length_x2"]);

    let train = fitted.transform(&split.train).unwrap();
    let test = fitted.transform(&split.test).unwrap();

    let spec = ModelSpec::new(
        ModelKind::RandomForest,
        Mode::Classification,
        Formula::new(
            "species",
            ["sepal_length", "sepal_width", "petal_length"],
        ),
    );
    let model = Trainer::fit(&spec, &train).unwrap();
    assert_eq!(
        model.class_labels().unwrap(),
        ["setosa", "versicolor", "virginica"]
    );

    let predictions = model.predict(&test, PredictionOutput::Class).unwrap();
    let labels = predictions.as_labels().unwrap();
    assert_eq!(labels.len(), 60);
    for label in labels {
        assert!(
            ["setosa", "versicolor", "virginica"].contains(&label.as_str()),
            "unknown label {}",
            label
        );
    }

    let truth: Vec<String> = tabml_learning::conversion::label_values(&test, "species").unwrap();
    let report = compute_classification(&truth, labels).unwrap();
    assert!(report.accuracy.unwrap() > 0.95);
    assert_eq!(report.per_class.len(), 3);
}

#[test]
fn test_probability_output_and_curves() {
    let df = load_csv(fixture_path()).unwrap();
    let split = train_test_split(&df, 0.6, 42).unwrap();

    let spec = ModelSpec::new(
        ModelKind::RandomForest,
        Mode::Classification,
        Formula::new("species", ["petal_length", "sepal_width"]),
    )
    .with_hyperparameters(Hyperparameters::default().with_n_trees(50));
    let model = Trainer::fit(&spec, &split.train).unwrap();

    let (labels, rows) = match model.predict(&split.test, PredictionOutput::Probability).unwrap() {
        Predictions::Probabilities { labels, rows } => (labels, rows),
        other => panic!("expected probabilities, got {:?}", other),
    };
    assert_eq!(labels, vec!["setosa", "versicolor", "virginica"]);
    assert_eq!(rows.len(), 60);
    for row in &rows {
        assert_eq!(row.len(), 3);
        let total: f64 = row.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    // One-vs-rest curves for the first class.
    let truth = tabml_learning::conversion::label_values(&split.test, "species").unwrap();
    let setosa_probability: Vec<f64> = rows.iter().map(|row| row[0]).collect();

    let roc = roc_curve(&truth, &setosa_probability, "setosa").unwrap();
    assert_eq!(roc.len(), 61);
    assert_eq!(roc.first().unwrap().x, 0.0);
    assert_eq!(roc.last().unwrap().y, 1.0);

    let gain = gain_curve(&truth, &setosa_probability, "setosa").unwrap();
    assert_eq!(gain.len(), 61);
    assert!(gain.last().unwrap().y == 1.0);
    // A separable class is fully captured early in the ranking.
    let n_setosa = truth.iter().filter(|t| *t == "setosa").count();
    assert_eq!(gain[n_setosa].y, 1.0);
}

#[test]
fn test_regression_workflow_end_to_end() {
    let df = load_csv(fixture_path()).unwrap();
    let split = train_test_split(&df, 0.75, 7).unwrap();

    // petal_length_x2 is exactly twice petal_length, so OLS recovers it.
    let spec = ModelSpec::new(
        ModelKind::Linear,
        Mode::Regression,
        Formula::new("petal_length_x2", ["petal_length"]),
    );
    let model = Trainer::fit(&spec, &split.train).unwrap();

    let predictions = model.predict(&split.test, PredictionOutput::Class).unwrap();
    let values = predictions.as_values().unwrap();
    let truth: Vec<f64> = tabml_learning::conversion::numeric_targets(&split.test, "petal_length_x2")
        .unwrap()
        .to_vec();

    let report = compute_regression(&truth, values).unwrap();
    assert!(report.rmse.unwrap() < 1e-6);
    assert!(report.mae.unwrap() < 1e-6);
    assert!(report.r2.unwrap() > 0.999999);
}

#[test]
fn test_ten_fold_cross_validation() {
    let df = load_csv(fixture_path()).unwrap();

    // Sepal measurements only explain petal length loosely, so fold RMSE
    // genuinely varies.
    let spec = ModelSpec::new(
        ModelKind::Linear,
        Mode::Regression,
        Formula::new("petal_length", ["sepal_length", "sepal_width"]),
    );
    let report = cross_validate(&spec, None, &df, 10, None, 42).unwrap();

    assert_eq!(report.folds.len(), 10);

    let fold_rmses: Vec<f64> = report.folds.iter().map(|f| f.rmse.unwrap()).collect();
    let min = fold_rmses.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = fold_rmses.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let aggregate = report
        .aggregates
        .iter()
        .find(|s| s.metric == "rmse")
        .unwrap();
    assert!(
        aggregate.mean >= min && aggregate.mean <= max,
        "aggregate {} outside [{}, {}]",
        aggregate.mean,
        min,
        max
    );
}

#[test]
fn test_stratified_cross_validation_of_classifier() {
    let df = load_csv(fixture_path()).unwrap();
    let spec = ModelSpec::new(
        ModelKind::RandomForest,
        Mode::Classification,
        Formula::new("species", ["petal_length", "sepal_length"]),
    )
    .with_hyperparameters(Hyperparameters::default().with_n_trees(25));

    let report = cross_validate(&spec, None, &df, 5, Some("species"), 3).unwrap();
    assert_eq!(report.folds.len(), 5);
    for fold in &report.folds {
        assert!(fold.accuracy.unwrap() > 0.9);
    }
}
