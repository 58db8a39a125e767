//! Inference module
//!
//! Request validation and scoring with the persisted scaler and classifier.

mod predictor;
mod request;

pub use predictor::{Diagnosis, ModelSummary, Prediction, Predictor};
pub use request::{FeatureError, PatientFeatures};
