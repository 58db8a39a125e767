//! Scaler + classifier pair used to score patients

use super::request::PatientFeatures;
use crate::error::{DiabetesError, Result};
use crate::export::{load_classifier, load_scaler};
use crate::preprocessing::StandardScaler;
use crate::schema::{feature_matrix, feature_names, Feature};
use crate::training::decision_tree::argmax;
use crate::training::RandomForest;
use ndarray::Array2;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Predicted outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnosis {
    Negative,
    Positive,
}

impl Diagnosis {
    /// Map a 0/1 class label; anything other than 1 is negative
    pub fn from_label(label: f64) -> Self {
        if label == 1.0 {
            Diagnosis::Positive
        } else {
            Diagnosis::Negative
        }
    }

    pub fn label(self) -> u8 {
        match self {
            Diagnosis::Negative => 0,
            Diagnosis::Positive => 1,
        }
    }

    /// Text shown to the user
    pub fn message(self) -> &'static str {
        match self {
            Diagnosis::Positive => "Patient has Diabetes",
            Diagnosis::Negative => "Patient doesn't have Diabetes",
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One scored row
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub diagnosis: Diagnosis,
    /// Share of the forest's probability mass on the positive class
    pub probability: f64,
}

/// Facts about the loaded model, reported by the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub n_trees: usize,
    pub feature_names: Vec<String>,
    pub classes: Vec<f64>,
}

/// Fitted scaler and classifier, immutable once built
#[derive(Debug, Clone)]
pub struct Predictor {
    scaler: StandardScaler,
    model: RandomForest,
    positive_index: usize,
}

impl Predictor {
    /// Pair a fitted scaler with a fitted binary classifier
    pub fn new(scaler: StandardScaler, model: RandomForest) -> Result<Self> {
        if !scaler.is_fitted() || !model.is_fitted() {
            return Err(DiabetesError::ModelNotFitted);
        }
        if scaler.feature_names() != feature_names() {
            return Err(DiabetesError::ValidationError(format!(
                "scaler was fitted on {:?}, expected {:?}",
                scaler.feature_names(),
                feature_names()
            )));
        }
        if model.n_features() != Feature::COUNT {
            return Err(DiabetesError::ShapeError {
                expected: format!("{} features", Feature::COUNT),
                actual: format!("{} features", model.n_features()),
            });
        }
        let positive_index = model
            .classes()
            .iter()
            .position(|&c| c == 1.0)
            .ok_or_else(|| {
                DiabetesError::ValidationError(format!(
                    "classifier has no positive class, classes are {:?}",
                    model.classes()
                ))
            })?;

        Ok(Self {
            scaler,
            model,
            positive_index,
        })
    }

    /// Load both artifacts from disk
    pub fn load(model_path: &Path, scaler_path: &Path) -> Result<Self> {
        let model = load_classifier(model_path)?;
        let scaler = load_scaler(scaler_path)?;
        let predictor = Self::new(scaler, model)?;

        info!(
            model = %model_path.display(),
            scaler = %scaler_path.display(),
            trees = predictor.model.n_trees(),
            "Loaded predictor"
        );
        Ok(predictor)
    }

    /// Score one patient
    pub fn predict(&self, features: &PatientFeatures) -> Result<Diagnosis> {
        let predictions = self.predict_matrix(&features.to_row())?;
        predictions
            .first()
            .map(|p| p.diagnosis)
            .ok_or_else(|| DiabetesError::InferenceError("empty prediction".to_string()))
    }

    /// Score every row of an unscaled matrix in canonical column order
    pub fn predict_matrix(&self, x: &Array2<f64>) -> Result<Vec<Prediction>> {
        let scaled = self.scaler.transform(x)?;
        let proba = self.model.predict_proba(&scaled)?;
        let classes = self.model.classes();

        Ok(proba
            .rows()
            .into_iter()
            .map(|row| Prediction {
                diagnosis: Diagnosis::from_label(classes[argmax(row)]),
                probability: row[self.positive_index],
            })
            .collect())
    }

    /// Score every row of a frame holding the eight feature columns
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Vec<Prediction>> {
        let x = feature_matrix(df)?;
        self.predict_matrix(&x)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            n_trees: self.model.n_trees(),
            feature_names: self.scaler.feature_names(),
            classes: self.model.classes().to_vec(),
        }
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> &RandomForest {
        &self.model
    }
}
