//! Versioned binary artifacts for the fitted scaler and classifier
//!
//! File layout: a bincode-encoded [`ArtifactHeader`] immediately followed by
//! the bincode-encoded payload. The header is decoded and checked before the
//! payload is touched, so a scaler file passed where a classifier is expected
//! fails with a clear message instead of a decode error.

use crate::error::{DiabetesError, Result};
use crate::preprocessing::StandardScaler;
use crate::schema::{feature_names, Feature};
use crate::training::RandomForest;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Leading bytes of every artifact file
pub const ARTIFACT_MAGIC: [u8; 4] = *b"DPAF";

/// Artifact layout version understood by this build
pub const FORMAT_VERSION: u32 = 1;

/// What an artifact file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Scaler,
    Classifier,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Scaler => write!(f, "scaler"),
            ArtifactKind::Classifier => write!(f, "classifier"),
        }
    }
}

/// Metadata written ahead of the payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub magic: [u8; 4],
    pub format_version: u32,
    pub kind: ArtifactKind,
    /// Feature columns the payload was fitted on, in order
    pub feature_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Package version that wrote the file
    pub crate_version: String,
}

/// Header plus payload
#[derive(Debug, Clone)]
pub struct Artifact<T> {
    pub header: ArtifactHeader,
    pub payload: T,
}

impl<T> Artifact<T> {
    /// Wrap a payload fitted on the canonical feature columns
    pub fn new(kind: ArtifactKind, payload: T) -> Self {
        Self {
            header: ArtifactHeader {
                magic: ARTIFACT_MAGIC,
                format_version: FORMAT_VERSION,
                kind,
                feature_names: feature_names(),
                created_at: Utc::now(),
                crate_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            payload,
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        self.header.kind
    }
}

impl<T: Serialize> Artifact<T> {
    /// Write the artifact to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &self.header)?;
        bincode::serialize_into(&mut writer, &self.payload)?;
        writer.flush()?;

        info!(path = %path.display(), kind = %self.header.kind, "Saved artifact");
        Ok(())
    }
}

impl<T: DeserializeOwned> Artifact<T> {
    /// Read an artifact, checking magic, version, kind and feature schema
    pub fn load(path: &Path, expected: ArtifactKind) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            DiabetesError::ArtifactError(format!(
                "cannot read {} artifact '{}': {}",
                expected,
                path.display(),
                e
            ))
        })?;

        if !bytes.starts_with(&ARTIFACT_MAGIC) {
            return Err(DiabetesError::ArtifactError(format!(
                "'{}' is not a model artifact",
                path.display()
            )));
        }

        let mut reader: &[u8] = &bytes;
        let header: ArtifactHeader = bincode::deserialize_from(&mut reader).map_err(|e| {
            DiabetesError::ArtifactError(format!(
                "corrupt artifact header in '{}': {}",
                path.display(),
                e
            ))
        })?;
        check_header(&header, expected, path)?;

        let payload: T = bincode::deserialize_from(&mut reader).map_err(|e| {
            DiabetesError::ArtifactError(format!(
                "corrupt {} payload in '{}': {}",
                expected,
                path.display(),
                e
            ))
        })?;
        if !reader.is_empty() {
            return Err(DiabetesError::ArtifactError(format!(
                "'{}' has {} trailing bytes",
                path.display(),
                reader.len()
            )));
        }

        debug!(
            path = %path.display(),
            kind = %header.kind,
            created_at = %header.created_at.to_rfc3339(),
            "Loaded artifact"
        );
        Ok(Self { header, payload })
    }
}

fn check_header(header: &ArtifactHeader, expected: ArtifactKind, path: &Path) -> Result<()> {
    if header.format_version != FORMAT_VERSION {
        return Err(DiabetesError::ArtifactError(format!(
            "'{}' has format version {}, this build reads version {}",
            path.display(),
            header.format_version,
            FORMAT_VERSION
        )));
    }
    if header.kind != expected {
        return Err(DiabetesError::ArtifactError(format!(
            "'{}' contains a {}, expected a {}",
            path.display(),
            header.kind,
            expected
        )));
    }
    if header.feature_names != feature_names() {
        return Err(DiabetesError::ArtifactError(format!(
            "'{}' was fitted on features {:?}, expected {:?}",
            path.display(),
            header.feature_names,
            feature_names()
        )));
    }
    Ok(())
}

/// Persist a fitted scaler
pub fn save_scaler(scaler: &StandardScaler, path: &Path) -> Result<()> {
    if !scaler.is_fitted() {
        return Err(DiabetesError::ModelNotFitted);
    }
    Artifact::new(ArtifactKind::Scaler, scaler).save(path)
}

/// Load a scaler and confirm it was fitted on the canonical columns
pub fn load_scaler(path: &Path) -> Result<StandardScaler> {
    let scaler = Artifact::<StandardScaler>::load(path, ArtifactKind::Scaler)?.payload;
    if !scaler.is_fitted() || scaler.feature_names() != feature_names() {
        return Err(DiabetesError::ArtifactError(format!(
            "scaler in '{}' does not match the feature schema",
            path.display()
        )));
    }
    Ok(scaler)
}

/// Persist a fitted classifier
pub fn save_classifier(model: &RandomForest, path: &Path) -> Result<()> {
    if !model.is_fitted() {
        return Err(DiabetesError::ModelNotFitted);
    }
    Artifact::new(ArtifactKind::Classifier, model).save(path)
}

/// Load a classifier and confirm its input width and classes
pub fn load_classifier(path: &Path) -> Result<RandomForest> {
    let model = Artifact::<RandomForest>::load(path, ArtifactKind::Classifier)?.payload;
    if !model.is_fitted() || model.n_features() != Feature::COUNT {
        return Err(DiabetesError::ArtifactError(format!(
            "classifier in '{}' does not match the feature schema",
            path.display()
        )));
    }
    Ok(model)
}
