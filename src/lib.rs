//! Diabetes predictor
//!
//! Trains a random-forest classifier on the Pima-style diabetes dataset and
//! serves it behind a small web form and JSON endpoint.
//!
//! # Modules
//!
//! ## Core ML Modules
//! - [`schema`] - The eight clinical features and their canonical order
//! - [`preprocessing`] - Zero-as-missing mean imputation, standard scaling
//! - [`training`] - Decision trees, random forest, split, metrics, pipeline
//! - [`inference`] - Request validation and scoring
//!
//! ## Persistence
//! - [`export`] - Versioned bincode artifacts
//! - [`utils`] - Tabular file loading and saving
//!
//! ## Services
//! - [`server`] - HTTP server with the prediction form and API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core ML modules
pub mod schema;
pub mod preprocessing;
pub mod training;
pub mod inference;

// Persistence
pub mod export;
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{DiabetesError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{DiabetesError, Result};

    // Schema
    pub use crate::schema::{Feature, TARGET_COLUMN};

    // Preprocessing
    pub use crate::preprocessing::{MeanImputer, StandardScaler};

    // Training
    pub use crate::training::{
        RandomForest, TrainedArtifacts, TrainingConfig, TrainingPipeline, TrainingReport,
    };

    // Inference
    pub use crate::inference::{Diagnosis, FeatureError, PatientFeatures, Predictor};

    // Export
    pub use crate::export::{Artifact, ArtifactKind};

    // Server
    pub use crate::server::{create_router, run_server, AppState, ServerConfig};
}
