//! Clinical feature schema
//!
//! The scaler and the classifier are fitted on columns in the order of
//! [`Feature::ALL`]. Every matrix handed to them is assembled in that order by
//! name, never by the order of keys in an incoming record.

use crate::error::{DiabetesError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the binary label column in training data
pub const TARGET_COLUMN: &str = "Outcome";

/// One of the eight clinical input features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    Bmi,
    DiabetesPedigreeFunction,
    Age,
}

impl Feature {
    /// Number of input features
    pub const COUNT: usize = 8;

    /// All features in canonical column order
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Pregnancies,
        Feature::Glucose,
        Feature::BloodPressure,
        Feature::SkinThickness,
        Feature::Insulin,
        Feature::Bmi,
        Feature::DiabetesPedigreeFunction,
        Feature::Age,
    ];

    /// Column name in the dataset, also the key in prediction requests
    pub const fn column(self) -> &'static str {
        match self {
            Feature::Pregnancies => "Pregnancies",
            Feature::Glucose => "Glucose",
            Feature::BloodPressure => "BloodPressure",
            Feature::SkinThickness => "SkinThickness",
            Feature::Insulin => "Insulin",
            Feature::Bmi => "BMI",
            Feature::DiabetesPedigreeFunction => "DiabetesPedigreeFunction",
            Feature::Age => "Age",
        }
    }

    /// Whether a recorded zero is physiologically impossible and therefore
    /// stands for a missing measurement
    pub const fn zero_is_missing(self) -> bool {
        matches!(
            self,
            Feature::Glucose
                | Feature::BloodPressure
                | Feature::SkinThickness
                | Feature::Insulin
                | Feature::Bmi
        )
    }

    /// Position of the feature in the canonical order
    pub const fn index(self) -> usize {
        // Variants are declared in canonical order
        self as usize
    }

    /// Look up a feature by its column name
    pub fn from_column(name: &str) -> Option<Self> {
        Feature::ALL.iter().copied().find(|f| f.column() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Canonical feature names as owned strings
pub fn feature_names() -> Vec<String> {
    Feature::ALL.iter().map(|f| f.column().to_string()).collect()
}

/// Columns whose zeros are treated as missing at training time
pub fn zero_as_missing_columns() -> Vec<&'static str> {
    Feature::ALL
        .iter()
        .filter(|f| f.zero_is_missing())
        .map(|f| f.column())
        .collect()
}

/// Check that every feature column (and optionally the target) is present
pub fn validate_columns(df: &DataFrame, require_target: bool) -> Result<()> {
    let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    let required = Feature::ALL
        .iter()
        .map(|f| f.column())
        .chain(require_target.then_some(TARGET_COLUMN));

    for column in required {
        if !names.iter().any(|n| n == column) {
            return Err(DiabetesError::FeatureNotFound(column.to_string()));
        }
    }
    Ok(())
}

/// Read a column as `f64`, casting integer columns as needed
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let column = df
        .column(name)
        .map_err(|_| DiabetesError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.clone())
}

/// Assemble the feature matrix in canonical column order.
/// Fails on any null, so callers impute first when needed.
pub fn feature_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let mut x = Array2::zeros((n_rows, Feature::COUNT));

    for (j, feature) in Feature::ALL.iter().enumerate() {
        let values = numeric_column(df, feature.column())?;
        for (i, value) in values.into_iter().enumerate() {
            x[[i, j]] = value.ok_or_else(|| {
                DiabetesError::DataError(format!(
                    "missing value in column '{}' at row {}",
                    feature, i
                ))
            })?;
        }
    }

    Ok(x)
}

/// Extract the binary label vector
pub fn label_vector(df: &DataFrame, target: &str) -> Result<Array1<f64>> {
    let values = numeric_column(df, target)?;
    let labels = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Some(v) if v == 0.0 || v == 1.0 => Ok(v),
            Some(v) => Err(DiabetesError::ValidationError(format!(
                "label '{}' at row {} must be 0 or 1, got {}",
                target, i, v
            ))),
            None => Err(DiabetesError::DataError(format!(
                "missing label '{}' at row {}",
                target, i
            ))),
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Array1::from_vec(labels))
}
