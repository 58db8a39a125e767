//! Hold-out evaluation metrics

use crate::error::{DiabetesError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Binary confusion counts with 1.0 as the positive class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }
}

/// Metrics for model evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion: ConfusionMatrix,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl ModelMetrics {
    /// Compute classification metrics for 0/1 labels
    pub fn compute_classification(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(DiabetesError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(DiabetesError::ValidationError(
                "cannot evaluate on zero samples".to_string(),
            ));
        }

        let confusion = confusion_counts(y_true, y_pred);
        let ConfusionMatrix {
            true_positive: tp,
            false_positive: fp,
            true_negative: tn,
            false_negative: fn_,
        } = confusion;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Ok(Self {
            accuracy: ratio(tp + tn, confusion.total()),
            precision,
            recall,
            f1_score,
            confusion,
            n_samples: y_true.len(),
        })
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> ConfusionMatrix {
    let mut counts = ConfusionMatrix::default();
    for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
        match (t > 0.5, p > 0.5) {
            (true, true) => counts.true_positive += 1,
            (false, true) => counts.false_positive += 1,
            (false, false) => counts.true_negative += 1,
            (true, false) => counts.false_negative += 1,
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_classification_metrics() {
        let y_true = array![1.0, 1.0, 0.0, 0.0, 1.0];
        let y_pred = array![1.0, 0.0, 0.0, 1.0, 1.0];

        let m = ModelMetrics::compute_classification(&y_true, &y_pred).unwrap();
        assert_eq!(m.confusion.true_positive, 2);
        assert_eq!(m.confusion.false_positive, 1);
        assert_eq!(m.confusion.true_negative, 1);
        assert_eq!(m.confusion.false_negative, 1);
        assert!((m.accuracy - 0.6).abs() < 1e-12);
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1_score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_positive_predictions() {
        let m = ModelMetrics::compute_classification(&array![1.0, 0.0], &array![0.0, 0.0]).unwrap();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.f1_score, 0.0);
        assert!((m.accuracy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ModelMetrics::compute_classification(&array![1.0], &array![1.0, 0.0]).is_err());
    }
}
