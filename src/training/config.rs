//! Training configuration

use super::decision_tree::Criterion;
use super::random_forest::MaxFeatures;
use crate::error::{DiabetesError, Result};
use crate::schema::TARGET_COLUMN;
use serde::{Deserialize, Serialize};

/// Configuration for the training pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Label column (0/1)
    pub target_column: String,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the split and the forest
    pub random_state: u64,

    /// Number of trees
    pub n_estimators: usize,

    /// Maximum depth per tree; unbounded when `None`
    pub max_depth: Option<usize>,

    pub min_samples_split: usize,

    pub min_samples_leaf: usize,

    /// Features examined per split
    pub max_features: MaxFeatures,

    pub criterion: Criterion,

    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: TARGET_COLUMN.to_string(),
            test_size: 0.2,
            random_state: 42,
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            criterion: Criterion::Gini,
            bootstrap: true,
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the target column
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Builder method to set the number of trees
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Builder method to set the maximum depth
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// Check parameter ranges before any work is done
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(invalid("test_size", self.test_size, "must be strictly between 0 and 1"));
        }
        if self.n_estimators == 0 {
            return Err(invalid("n_estimators", 0, "must be at least 1"));
        }
        if self.max_depth == Some(0) {
            return Err(invalid("max_depth", 0, "must be at least 1"));
        }
        if self.min_samples_split < 2 {
            return Err(invalid("min_samples_split", self.min_samples_split, "must be at least 2"));
        }
        if self.min_samples_leaf == 0 {
            return Err(invalid("min_samples_leaf", 0, "must be at least 1"));
        }
        if let MaxFeatures::Fraction(f) = self.max_features {
            if !(f > 0.0 && f <= 1.0) {
                return Err(invalid("max_features", f, "fraction must be in (0, 1]"));
            }
        }
        if self.target_column.trim().is_empty() {
            return Err(invalid("target_column", "\"\"", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl ToString, reason: &str) -> DiabetesError {
    DiabetesError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.target_column, "Outcome");
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.n_estimators, 100);
        assert!(config.bootstrap);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = TrainingConfig::new()
            .with_n_estimators(10)
            .with_max_depth(Some(4))
            .with_random_state(7);
        assert_eq!(config.n_estimators, 10);
        assert_eq!(config.max_depth, Some(4));
        assert_eq!(config.random_state, 7);
    }

    #[test]
    fn test_invalid_values() {
        assert!(TrainingConfig::new().with_test_size(0.0).validate().is_err());
        assert!(TrainingConfig::new().with_test_size(1.5).validate().is_err());
        assert!(TrainingConfig::new().with_n_estimators(0).validate().is_err());
        assert!(TrainingConfig::new().with_max_depth(Some(0)).validate().is_err());
        assert!(TrainingConfig::new()
            .with_max_features(MaxFeatures::Fraction(0.0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = TrainingConfig::new().with_max_features(MaxFeatures::Fixed(3));
        let json = serde_json::to_string(&config).unwrap();
        let back: TrainingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
