//! Model export and serialization module
//!
//! Fitted objects are written as versioned bincode artifacts that carry the
//! feature schema they were fitted on.

mod artifact;

pub use artifact::{
    load_classifier, load_scaler, save_classifier, save_scaler, Artifact, ArtifactHeader,
    ArtifactKind, ARTIFACT_MAGIC, FORMAT_VERSION,
};

/// Default classifier artifact file name
pub const DEFAULT_MODEL_PATH: &str = "diabetes_model.bin";

/// Default scaler artifact file name
pub const DEFAULT_SCALER_PATH: &str = "scaler.bin";
