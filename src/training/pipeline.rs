//! End-to-end training: impute, split, scale, fit, evaluate

use super::config::TrainingConfig;
use super::metrics::ModelMetrics;
use super::random_forest::RandomForest;
use super::split::train_test_split;
use crate::error::{DiabetesError, Result};
use crate::export::{save_classifier, save_scaler};
use crate::inference::Predictor;
use crate::preprocessing::{ColumnImputation, MeanImputer, StandardScaler};
use crate::schema::{
    feature_matrix, feature_names, label_vector, validate_columns, zero_as_missing_columns,
};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Summary of one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub config: TrainingConfig,
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub imputation: Vec<ColumnImputation>,
    /// Evaluated on the held-out split
    pub metrics: ModelMetrics,
    /// Normalized importances in canonical feature order
    pub feature_importances: Vec<(String, f64)>,
    pub training_time_secs: f64,
    pub trained_at: DateTime<Utc>,
}

impl TrainingReport {
    /// Write the report as pretty-printed JSON
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// The fitted objects produced by a run, plus its report
#[derive(Debug, Clone)]
pub struct TrainedArtifacts {
    pub scaler: StandardScaler,
    pub model: RandomForest,
    pub report: TrainingReport,
}

impl TrainedArtifacts {
    /// Persist the classifier and scaler as two artifact files
    pub fn save(&self, model_path: &Path, scaler_path: &Path) -> Result<()> {
        save_classifier(&self.model, model_path)?;
        save_scaler(&self.scaler, scaler_path)?;
        Ok(())
    }

    /// Build a predictor from the in-memory objects
    pub fn into_predictor(self) -> Result<Predictor> {
        Predictor::new(self.scaler, self.model)
    }
}

/// Training pipeline
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run every stage on a frame holding the feature columns and the target
    pub fn run(&self, df: &DataFrame) -> Result<TrainedArtifacts> {
        let start = Instant::now();
        self.config.validate()?;

        if df.height() == 0 {
            return Err(DiabetesError::DataError("training data has no rows".to_string()));
        }
        validate_columns(df, false)?;
        let y = label_vector(df, &self.config.target_column)?;

        info!(rows = df.height(), target = %self.config.target_column, "Starting training");

        // Zero-as-missing columns first become nulls, then every feature is mean-filled
        let columns = feature_names();
        let mut imputer = MeanImputer::new(&columns).with_zero_as_missing(&zero_as_missing_columns());
        let imputed = imputer.fit_transform(df)?;
        for entry in imputer.summary() {
            debug!(
                column = %entry.column,
                fill_value = entry.fill_value,
                filled = entry.values_filled,
                "Imputed column"
            );
        }

        let x = feature_matrix(&imputed)?;
        let split = train_test_split(&x, &y, self.config.test_size, self.config.random_state)?;
        if !split.y_train.iter().any(|&v| v == 1.0) || !split.y_train.iter().any(|&v| v == 0.0) {
            return Err(DiabetesError::ValidationError(
                "training split must contain both outcome classes".to_string(),
            ));
        }
        info!(train = split.x_train.nrows(), test = split.x_test.nrows(), "Split data");

        let mut scaler = StandardScaler::new();
        let x_train = scaler.fit_transform(&split.x_train, &columns)?;
        let x_test = scaler.transform(&split.x_test)?;

        let mut model = self.build_forest();
        model.fit(&x_train, &split.y_train)?;
        info!(trees = model.n_trees(), "Fitted random forest");

        let y_pred = model.predict(&x_test)?;
        let metrics = ModelMetrics::compute_classification(&split.y_test, &y_pred)?;
        info!(
            accuracy = metrics.accuracy,
            precision = metrics.precision,
            recall = metrics.recall,
            f1 = metrics.f1_score,
            "Evaluated on held-out split"
        );

        let feature_importances = match model.feature_importances() {
            Some(imp) => columns.iter().cloned().zip(imp.iter().copied()).collect(),
            None => Vec::new(),
        };

        let report = TrainingReport {
            config: self.config.clone(),
            n_rows: df.height(),
            n_train: split.x_train.nrows(),
            n_test: split.x_test.nrows(),
            imputation: imputer.summary().to_vec(),
            metrics,
            feature_importances,
            training_time_secs: start.elapsed().as_secs_f64(),
            trained_at: Utc::now(),
        };

        Ok(TrainedArtifacts {
            scaler,
            model,
            report,
        })
    }

    fn build_forest(&self) -> RandomForest {
        let config = &self.config;
        let mut forest = RandomForest::new(config.n_estimators)
            .with_min_samples_split(config.min_samples_split)
            .with_min_samples_leaf(config.min_samples_leaf)
            .with_max_features(config.max_features)
            .with_criterion(config.criterion)
            .with_bootstrap(config.bootstrap)
            .with_random_state(config.random_state);
        if let Some(depth) = config.max_depth {
            forest = forest.with_max_depth(depth);
        }
        forest
    }
}
