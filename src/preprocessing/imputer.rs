//! Missing value imputation
//!
//! Zeros in physiologically-impossible columns are first turned into nulls,
//! then every configured column's nulls are filled with the mean of that
//! column's remaining values.

use crate::error::{DiabetesError, Result};
use crate::schema::numeric_column;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-column outcome of imputation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnImputation {
    pub column: String,
    /// Mean of the non-missing values
    pub fill_value: f64,
    /// Zeros reinterpreted as missing
    pub zeros_replaced: usize,
    /// Values filled (zeros plus pre-existing nulls)
    pub values_filled: usize,
}

/// Mean imputer with a zero-as-missing rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeanImputer {
    columns: Vec<String>,
    zero_as_missing: Vec<String>,
    summary: Vec<ColumnImputation>,
    is_fitted: bool,
}

impl MeanImputer {
    /// Create an imputer for the given columns
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            zero_as_missing: Vec::new(),
            summary: Vec::new(),
            is_fitted: false,
        }
    }

    /// Treat zeros in these columns as missing values
    pub fn with_zero_as_missing<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.zero_as_missing = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Compute fill values from the data
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let mut summary = Vec::with_capacity(self.columns.len());

        for name in &self.columns {
            let values = self.missing_marked(df, name)?;
            let fill_value = values.mean().ok_or_else(|| {
                DiabetesError::PreprocessingError(format!(
                    "column '{}' has no non-missing values to average",
                    name
                ))
            })?;

            let zeros_replaced = if self.zero_as_missing.contains(name) {
                numeric_column(df, name)?
                    .into_iter()
                    .filter(|v| *v == Some(0.0))
                    .count()
            } else {
                0
            };

            summary.push(ColumnImputation {
                column: name.clone(),
                fill_value,
                zeros_replaced,
                values_filled: values.null_count(),
            });
        }

        self.summary = summary;
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace missing values with the fitted means
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(DiabetesError::ModelNotFitted);
        }

        let mut result = df.clone();
        for entry in &self.summary {
            let filled = self
                .missing_marked(df, &entry.column)?
                .fill_null_with_values(entry.fill_value)
                .map_err(|e| DiabetesError::PreprocessingError(e.to_string()))?
                .with_name(entry.column.as_str().into())
                .into_series();

            result
                .with_column(filled)
                .map_err(|e| DiabetesError::PreprocessingError(e.to_string()))?;
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Per-column fill values and counts from the last fit
    pub fn summary(&self) -> &[ColumnImputation] {
        &self.summary
    }

    /// Fitted fill value for a column
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.summary
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.fill_value)
    }

    fn missing_marked(&self, df: &DataFrame, name: &str) -> Result<Float64Chunked> {
        let values = numeric_column(df, name)?;
        if !self.zero_as_missing.iter().any(|c| c == name) {
            return Ok(values);
        }

        Ok(values
            .into_iter()
            .map(|v| v.filter(|x| *x != 0.0))
            .collect())
    }
}
