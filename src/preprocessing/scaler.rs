//! Feature standardization

use crate::error::{DiabetesError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub name: String,
    pub mean: f64,
    /// Population standard deviation; 1.0 for constant columns
    pub scale: f64,
}

/// Standard scaling (z-score normalization): (x - mean) / std
///
/// Uses the population standard deviation, so a fitted column has zero mean
/// and unit variance over the rows it was fitted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScalerParams>,
    n_samples_seen: usize,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create a new, unfitted scaler
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            n_samples_seen: 0,
            is_fitted: false,
        }
    }

    /// Fit the scaler; `feature_names` labels the matrix columns in order
    pub fn fit<S: AsRef<str>>(&mut self, x: &Array2<f64>, feature_names: &[S]) -> Result<&mut Self> {
        if x.ncols() != feature_names.len() {
            return Err(DiabetesError::ShapeError {
                expected: format!("{} columns", feature_names.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        if x.nrows() == 0 {
            return Err(DiabetesError::ValidationError(
                "cannot fit scaler on empty data".to_string(),
            ));
        }

        let means = x
            .mean_axis(Axis(0))
            .ok_or_else(|| DiabetesError::PreprocessingError("empty matrix".to_string()))?;
        let stds = x.std_axis(Axis(0), 0.0);

        self.params = feature_names
            .iter()
            .zip(means.iter().zip(stds.iter()))
            .map(|(name, (&mean, &std))| ScalerParams {
                name: name.as_ref().to_string(),
                mean,
                scale: if std == 0.0 { 1.0 } else { std },
            })
            .collect();
        self.n_samples_seen = x.nrows();
        self.is_fitted = true;

        Ok(self)
    }

    /// Standardize a matrix whose columns follow the fitted order
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_input(x)?;

        let mut scaled = x.to_owned();
        for (mut column, params) in scaled.axis_iter_mut(Axis(1)).zip(&self.params) {
            column.mapv_inplace(|v| (v - params.mean) / params.scale);
        }
        Ok(scaled)
    }

    /// Fit and transform in one step
    pub fn fit_transform<S: AsRef<str>>(&mut self, x: &Array2<f64>, feature_names: &[S]) -> Result<Array2<f64>> {
        self.fit(x, feature_names)?;
        self.transform(x)
    }

    /// Fitted per-column means
    pub fn means(&self) -> Array1<f64> {
        self.params.iter().map(|p| p.mean).collect()
    }

    /// Fitted per-column scales
    pub fn scales(&self) -> Array1<f64> {
        self.params.iter().map(|p| p.scale).collect()
    }

    /// Column names in fitted order
    pub fn feature_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    pub fn params(&self) -> &[ScalerParams] {
        &self.params
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    fn check_input(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted {
            return Err(DiabetesError::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(DiabetesError::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &["a", "b"]).unwrap();

        for column in scaled.axis_iter(Axis(1)) {
            let mean = column.mean().unwrap();
            let var = column.mapv(|v| (v - mean).powi(2)).mean().unwrap();
            assert!(mean.abs() < 1e-10);
            assert!((var - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_population_std() {
        let x = array![[2.0], [4.0], [4.0], [4.0], [5.0], [5.0], [7.0], [9.0]];

        let mut scaler = StandardScaler::new();
        scaler.fit(&x, &["v"]).unwrap();

        assert!((scaler.means()[0] - 5.0).abs() < 1e-12);
        assert!((scaler.scales()[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_keeps_unit_scale() {
        let x = array![[3.0], [3.0], [3.0]];

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x, &["c"]).unwrap();

        assert_eq!(scaler.scales()[0], 1.0);
        assert!(scaled.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_column_count_mismatch() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]], &["a", "b"]).unwrap();

        let err = scaler.transform(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, DiabetesError::ShapeError { .. }));
    }

    #[test]
    fn test_unfitted_transform() {
        let scaler = StandardScaler::new();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(DiabetesError::ModelNotFitted)
        ));
    }
}
