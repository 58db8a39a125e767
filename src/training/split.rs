//! Seeded hold-out split

use crate::error::{DiabetesError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Result of a train/test split
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    /// Source row of each training sample
    pub train_indices: Vec<usize>,
    /// Source row of each test sample
    pub test_indices: Vec<usize>,
}

/// Shuffle rows with `seed` and hold out `ceil(n * test_size)` of them.
///
/// Both sides must end up non-empty.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    let n_samples = x.nrows();
    if n_samples != y.len() {
        return Err(DiabetesError::ShapeError {
            expected: format!("y length = {}", n_samples),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DiabetesError::InvalidParameter {
            name: "test_size".to_string(),
            value: test_size.to_string(),
            reason: "must be strictly between 0 and 1".to_string(),
        });
    }

    let n_test = (n_samples as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_samples {
        return Err(DiabetesError::ValidationError(format!(
            "cannot split {} rows with test_size {}: both partitions must be non-empty",
            n_samples, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_indices, train_indices) = indices.split_at(n_test);
    let (train_indices, test_indices) = (train_indices.to_vec(), test_indices.to_vec());

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), &train_indices),
        x_test: x.select(Axis(0), &test_indices),
        y_train: y.select(Axis(0), &train_indices),
        y_test: y.select(Axis(0), &test_indices),
        train_indices,
        test_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| (i * 10 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| (i % 2) as f64);
        (x, y)
    }

    #[test]
    fn test_sizes_round_test_side_up() {
        let (x, y) = data(11);
        let split = train_test_split(&x, &y, 0.2, 42).unwrap();

        // ceil(11 * 0.2) = 3
        assert_eq!(split.x_test.nrows(), 3);
        assert_eq!(split.x_train.nrows(), 8);
        assert_eq!(split.y_train.len(), 8);
    }

    #[test]
    fn test_partitions_cover_all_rows_once() {
        let (x, y) = data(50);
        let split = train_test_split(&x, &y, 0.2, 42).unwrap();

        let mut all: Vec<usize> = split
            .train_indices
            .iter()
            .chain(&split.test_indices)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_rows_stay_aligned_with_labels() {
        let (x, y) = data(20);
        let split = train_test_split(&x, &y, 0.25, 9).unwrap();

        for (pos, &src) in split.test_indices.iter().enumerate() {
            assert_eq!(split.x_test[[pos, 0]], x[[src, 0]]);
            assert_eq!(split.y_test[pos], y[src]);
        }
    }

    #[test]
    fn test_same_seed_same_split() {
        let (x, y) = data(30);
        let a = train_test_split(&x, &y, 0.2, 42).unwrap();
        let b = train_test_split(&x, &y, 0.2, 42).unwrap();
        let c = train_test_split(&x, &y, 0.2, 43).unwrap();

        assert_eq!(a.test_indices, b.test_indices);
        assert_ne!(a.test_indices, c.test_indices);
    }

    #[test]
    fn test_degenerate_splits_rejected() {
        let (x, y) = data(1);
        assert!(train_test_split(&x, &y, 0.2, 42).is_err());

        let (x, y) = data(10);
        assert!(train_test_split(&x, &y, 0.0, 42).is_err());
        assert!(train_test_split(&x, &y, 1.0, 42).is_err());
    }
}
