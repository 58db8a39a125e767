//! Validated prediction request

use crate::schema::Feature;
use ndarray::Array2;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a request body could not be turned into [`PatientFeatures`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Request body must be a JSON object with the fields {}", expected_fields())]
    NotAnObject,

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{field}' must be a number, got {found}")]
    NotNumeric { field: &'static str, found: String },

    #[error("Field '{0}' must be a finite number")]
    NonFinite(&'static str),

    #[error("Unexpected field '{0}'")]
    UnexpectedField(String),
}

fn expected_fields() -> String {
    Feature::ALL
        .iter()
        .map(|f| f.column())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One patient's eight readings, stored in canonical feature order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PatientFeatures {
    values: [f64; Feature::COUNT],
}

impl PatientFeatures {
    /// Build from values already in canonical order
    pub fn new(values: [f64; Feature::COUNT]) -> Result<Self, FeatureError> {
        for feature in Feature::ALL {
            if !values[feature.index()].is_finite() {
                return Err(FeatureError::NonFinite(feature.column()));
            }
        }
        Ok(Self { values })
    }

    /// Parse a JSON request body; fields are matched by name, not position
    pub fn from_json(body: &Value) -> Result<Self, FeatureError> {
        match body {
            Value::Object(map) => Self::from_map(map),
            _ => Err(FeatureError::NotAnObject),
        }
    }

    /// Parse a JSON object; the first problem in canonical order is reported
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, FeatureError> {
        let mut values = [0.0; Feature::COUNT];
        for feature in Feature::ALL {
            let name = feature.column();
            let raw = map.get(name).ok_or(FeatureError::MissingField(name))?;
            values[feature.index()] = parse_value(name, raw)?;
        }

        if let Some(extra) = map.keys().find(|k| Feature::from_column(k).is_none()) {
            return Err(FeatureError::UnexpectedField(extra.clone()));
        }

        Ok(Self { values })
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Values in canonical order
    pub fn values(&self) -> &[f64; Feature::COUNT] {
        &self.values
    }

    /// A 1×8 matrix for the scaler and classifier
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, Feature::COUNT), |(_, j)| self.values[j])
    }
}

/// Accept JSON numbers and numeric strings; surrounding whitespace is ignored
fn parse_value(field: &'static str, raw: &Value) -> Result<f64, FeatureError> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FeatureError::NotNumeric {
        field,
        found: describe(raw),
    })?;

    if !value.is_finite() {
        return Err(FeatureError::NonFinite(field));
    }
    Ok(value)
}

fn describe(raw: &Value) -> String {
    match raw {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => format!("\"{}\"", s.chars().take(32).collect::<String>()),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
        Value::Number(n) => n.to_string(),
    }
}
