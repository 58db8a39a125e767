//! Integration test: Training pipeline, artifacts and reloaded predictions

mod common;

use diabetes_predictor::error::DiabetesError;
use diabetes_predictor::export::{load_classifier, load_scaler};
use diabetes_predictor::inference::{Diagnosis, PatientFeatures, Predictor};
use diabetes_predictor::preprocessing::MeanImputer;
use diabetes_predictor::schema::{
    feature_matrix, feature_names, label_vector, zero_as_missing_columns, Feature,
};
use diabetes_predictor::training::{train_test_split, TrainingConfig, TrainingPipeline, TrainingReport};
use diabetes_predictor::utils::{DataLoader, DataSaver};
use ndarray::Axis;
use polars::prelude::{NamedFrom, Series};
use tempfile::tempdir;

fn quick_config() -> TrainingConfig {
    TrainingConfig::new().with_n_estimators(20)
}

#[test]
fn test_zero_glucose_imputed_with_mean_of_non_zero() {
    let mut df = common::synthetic_frame(120, 3);
    let glucose: Vec<f64> = df
        .column("Glucose")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .enumerate()
        .map(|(i, v)| if i == 5 || i == 9 { 0.0 } else { v })
        .collect();
    df.with_column(Series::new("Glucose".into(), glucose.clone()))
        .unwrap();

    let non_zero: Vec<f64> = glucose.iter().copied().filter(|v| *v != 0.0).collect();
    let expected = non_zero.iter().sum::<f64>() / non_zero.len() as f64;

    let artifacts = TrainingPipeline::new(quick_config()).run(&df).unwrap();
    let entry = artifacts
        .report
        .imputation
        .iter()
        .find(|e| e.column == "Glucose")
        .unwrap();

    assert!((entry.fill_value - expected).abs() < 1e-9);
    assert_eq!(entry.zeros_replaced, 2);
}

#[test]
fn test_scaler_fitted_on_imputed_training_split() {
    let df = common::synthetic_frame(150, 11);
    let config = quick_config();
    let artifacts = TrainingPipeline::new(config.clone()).run(&df).unwrap();

    // Recompute the same stages by hand
    let mut imputer = MeanImputer::new(&feature_names()).with_zero_as_missing(&zero_as_missing_columns());
    let imputed = imputer.fit_transform(&df).unwrap();
    let x = feature_matrix(&imputed).unwrap();
    let y = label_vector(&imputed, "Outcome").unwrap();
    let split = train_test_split(&x, &y, config.test_size, config.random_state).unwrap();

    let means = split.x_train.mean_axis(Axis(0)).unwrap();
    let stds = split.x_train.std_axis(Axis(0), 0.0);

    let scaler = &artifacts.scaler;
    assert_eq!(scaler.n_samples_seen(), split.x_train.nrows());
    for j in 0..Feature::COUNT {
        assert!((scaler.means()[j] - means[j]).abs() < 1e-9);
        assert!((scaler.scales()[j] - stds[j]).abs() < 1e-9);
    }
}

#[test]
fn test_report_sizes_follow_test_fraction() {
    let artifacts = TrainingPipeline::new(quick_config())
        .run(&common::synthetic_frame(101, 5))
        .unwrap();

    // ceil(101 * 0.2) = 21
    assert_eq!(artifacts.report.n_test, 21);
    assert_eq!(artifacts.report.n_train, 80);
    assert_eq!(artifacts.report.metrics.n_samples, 21);
    assert!(artifacts.report.metrics.accuracy > 0.8);
}

#[test]
fn test_saved_artifacts_reload_to_same_predictions() {
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("diabetes_model.bin");
    let scaler_path = dir.path().join("scaler.bin");

    let df = common::synthetic_frame(200, 7);
    let artifacts = TrainingPipeline::new(quick_config()).run(&df).unwrap();
    artifacts.save(&model_path, &scaler_path).unwrap();

    let in_memory = artifacts.into_predictor().unwrap();
    let reloaded = Predictor::load(&model_path, &scaler_path).unwrap();

    let x = feature_matrix(&df).unwrap();
    assert_eq!(
        in_memory.predict_matrix(&x).unwrap(),
        reloaded.predict_matrix(&x).unwrap()
    );

    let known = PatientFeatures::new(common::KNOWN_POSITIVE).unwrap();
    assert_eq!(reloaded.predict(&known).unwrap(), Diagnosis::Positive);
}

#[test]
fn test_artifact_of_wrong_kind_rejected() {
    let dir = tempdir().unwrap();
    let model_path = dir.path().join("diabetes_model.bin");
    let scaler_path = dir.path().join("scaler.bin");

    TrainingPipeline::new(quick_config())
        .run(&common::synthetic_frame(80, 1))
        .unwrap()
        .save(&model_path, &scaler_path)
        .unwrap();

    assert!(matches!(load_classifier(&scaler_path), Err(DiabetesError::ArtifactError(_))));
    assert!(matches!(load_scaler(&model_path), Err(DiabetesError::ArtifactError(_))));
    assert!(Predictor::load(&scaler_path, &model_path).is_err());
}

#[test]
fn test_same_seed_same_model() {
    let df = common::synthetic_frame(120, 21);
    let x = feature_matrix(&df).unwrap();

    let a = TrainingPipeline::new(quick_config()).run(&df).unwrap().into_predictor().unwrap();
    let b = TrainingPipeline::new(quick_config()).run(&df).unwrap().into_predictor().unwrap();

    assert_eq!(a.predict_matrix(&x).unwrap(), b.predict_matrix(&x).unwrap());
}

#[test]
fn test_train_from_csv_file() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("diabetes.csv");
    let mut df = common::synthetic_frame(90, 13);
    DataSaver::save_csv(&mut df, &csv_path).unwrap();

    let loaded = DataLoader::new().load_auto(&csv_path).unwrap();
    assert_eq!(loaded.height(), 90);

    let artifacts = TrainingPipeline::new(quick_config()).run(&loaded).unwrap();
    assert_eq!(artifacts.model.n_trees(), 20);
}

#[test]
fn test_report_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");

    let artifacts = TrainingPipeline::new(quick_config())
        .run(&common::synthetic_frame(60, 2))
        .unwrap();
    artifacts.report.save_json(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let report: TrainingReport = serde_json::from_str(&text).unwrap();
    assert_eq!(report.config, artifacts.report.config);
    assert_eq!(report.feature_importances.len(), Feature::COUNT);
}

#[test]
fn test_non_binary_labels_rejected() {
    let mut df = common::synthetic_frame(40, 4);
    let outcome: Vec<i64> = (0..40).map(|i| i % 3).collect();
    df.with_column(Series::new("Outcome".into(), outcome))
        .unwrap();

    let err = TrainingPipeline::new(quick_config()).run(&df).unwrap_err();
    assert!(matches!(err, DiabetesError::ValidationError(_)));
}
