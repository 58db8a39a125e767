//! Decision tree classifier (CART)

use crate::error::{DiabetesError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Nodes with fewer samples than this scan candidate features sequentially
const PARALLEL_SPLIT_MIN_SAMPLES: usize = 256;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node holding the class distribution of its training samples
    Leaf {
        distribution: Vec<f64>,
        n_samples: usize,
    },
    /// Internal node; samples with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Criterion {
    /// Gini impurity
    Gini,
    /// Shannon entropy
    Entropy,
}

impl Criterion {
    fn impurity(self, counts: &[usize], n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let n = n as f64;
        match self {
            Criterion::Gini => {
                1.0 - counts
                    .iter()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            Criterion::Entropy => -counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        }
    }
}

/// Best split found for one node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    weighted_impurity: f64,
}

/// Immutable inputs shared by every recursive call of one fit
struct FitContext<'a> {
    x: &'a Array2<f64>,
    labels: &'a [usize],
    n_classes: usize,
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features examined per split (all when `None`)
    pub max_features: Option<usize>,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Seed for feature sampling
    pub random_state: Option<u64>,
    /// Number of features
    n_features: usize,
    /// Feature importances
    feature_importances: Option<Array1<f64>>,
    /// Class labels, indexed by leaf distribution position
    classes: Vec<f64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new classifier tree
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion: Criterion::Gini,
            random_state: None,
            n_features: 0,
            feature_importances: None,
            classes: Vec::new(),
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set number of features examined per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    /// Set criterion
    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set random state
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        if x.nrows() != y.len() {
            return Err(DiabetesError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let (classes, labels) = encode_labels(y)?;
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_encoded(x, &labels, classes, &indices)?;
        Ok(self)
    }

    /// Fit on the rows named by `sample_indices` (repeats allowed, as in a
    /// bootstrap sample) with labels already encoded as class positions.
    pub(crate) fn fit_encoded(
        &mut self,
        x: &Array2<f64>,
        labels: &[usize],
        classes: Vec<f64>,
        sample_indices: &[usize],
    ) -> Result<()> {
        if sample_indices.len() < self.min_samples_split.max(1) {
            return Err(DiabetesError::ValidationError(format!(
                "Need at least {} samples, got {}",
                self.min_samples_split.max(1),
                sample_indices.len()
            )));
        }
        if x.ncols() == 0 {
            return Err(DiabetesError::ValidationError(
                "cannot fit a tree without features".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(DiabetesError::InvalidParameter {
                name: "min_samples_leaf".to_string(),
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let n_features = x.ncols();
        self.n_features = n_features;
        self.classes = classes;

        let ctx = FitContext {
            x,
            labels,
            n_classes: self.classes.len(),
        };
        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut importances = vec![0.0; n_features];

        self.root = Some(self.build_tree(&ctx, sample_indices, 0, &mut rng, &mut importances));

        // Normalize feature importances
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(())
    }

    fn build_tree(
        &self,
        ctx: &FitContext<'_>,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let counts = class_counts(ctx.labels, indices, ctx.n_classes);
        let parent_impurity = self.criterion.impurity(&counts, n_samples);

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.map_or(false, |d| depth >= d)
            || counts.iter().filter(|&&c| c > 0).count() <= 1;

        if should_stop {
            return leaf(&counts, n_samples);
        }

        let best = match self.find_best_split(ctx, indices, rng) {
            Some(best) if parent_impurity - best.weighted_impurity > 0.0 => best,
            _ => return leaf(&counts, n_samples),
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| ctx.x[[i, best.feature_idx]] <= best.threshold);

        importances[best.feature_idx] +=
            n_samples as f64 * (parent_impurity - best.weighted_impurity);

        let left = Box::new(self.build_tree(ctx, &left_indices, depth + 1, rng, importances));
        let right = Box::new(self.build_tree(ctx, &right_indices, depth + 1, rng, importances));

        TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity: parent_impurity,
        }
    }

    /// Examine `max_features` randomly drawn features; if none of them
    /// separates the node (e.g. all constant here), fall back to the rest.
    fn find_best_split(
        &self,
        ctx: &FitContext<'_>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = ctx.x.ncols();
        let n_try = self.max_features.unwrap_or(n_features).clamp(1, n_features);

        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        let (primary, fallback) = features.split_at(n_try);

        self.best_split_among(ctx, indices, primary)
            .or_else(|| self.best_split_among(ctx, indices, fallback))
    }

    fn best_split_among(
        &self,
        ctx: &FitContext<'_>,
        indices: &[usize],
        features: &[usize],
    ) -> Option<SplitCandidate> {
        let evaluate = |&feature_idx: &usize| self.best_split_for_feature(ctx, indices, feature_idx);

        let results: Vec<Option<SplitCandidate>> = if indices.len() >= PARALLEL_SPLIT_MIN_SAMPLES {
            features.par_iter().map(evaluate).collect()
        } else {
            features.iter().map(evaluate).collect()
        };

        // Earliest feature wins ties so the result does not depend on scheduling
        results.into_iter().flatten().fold(None, |best, candidate| match best {
            Some(b) if b.weighted_impurity <= candidate.weighted_impurity => Some(b),
            _ => Some(candidate),
        })
    }

    /// Sort the node's samples by one feature and sweep every boundary
    /// between distinct values, updating class counts incrementally.
    fn best_split_for_feature(
        &self,
        ctx: &FitContext<'_>,
        indices: &[usize],
        feature_idx: usize,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let mut order: Vec<(f64, usize)> = indices
            .iter()
            .map(|&i| (ctx.x[[i, feature_idx]], ctx.labels[i]))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut right = vec![0usize; ctx.n_classes];
        for &(_, label) in &order {
            right[label] += 1;
        }
        let mut left = vec![0usize; ctx.n_classes];

        let mut best: Option<SplitCandidate> = None;
        for k in 0..n - 1 {
            let (value, label) = order[k];
            left[label] += 1;
            right[label] -= 1;

            let next_value = order[k + 1].0;
            if value >= next_value {
                continue;
            }

            let n_left = k + 1;
            let n_right = n - n_left;
            if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                continue;
            }

            let weighted_impurity = (n_left as f64 * self.criterion.impurity(&left, n_left)
                + n_right as f64 * self.criterion.impurity(&right, n_right))
                / n as f64;

            if best.map_or(true, |b| weighted_impurity < b.weighted_impurity) {
                best = Some(SplitCandidate {
                    feature_idx,
                    threshold: midpoint(value, next_value),
                    weighted_impurity,
                });
            }
        }

        best
    }

    /// Class probabilities for each row, columns ordered as [`Self::classes`]
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let root = self.root.as_ref().ok_or(DiabetesError::ModelNotFitted)?;
        self.check_features(x)?;

        let mut proba = Array2::zeros((x.nrows(), self.classes.len()));
        for (i, row) in x.rows().into_iter().enumerate() {
            let distribution = leaf_distribution(root, row);
            for (j, &p) in distribution.iter().enumerate() {
                proba[[i, j]] = p;
            }
        }
        Ok(proba)
    }

    /// Predicted class label for each row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row)])
            .collect())
    }

    fn check_features(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(DiabetesError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Class labels known to the tree
    pub fn classes(&self) -> &[f64] {
        &self.classes
    }

    /// Get tree depth
    pub fn get_depth(&self) -> usize {
        self.root.as_ref().map_or(0, node_depth)
    }

    /// Get number of leaves
    pub fn get_n_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, count_leaves)
    }
}

/// Map labels to positions in the sorted list of distinct classes
pub(crate) fn encode_labels(y: &Array1<f64>) -> Result<(Vec<f64>, Vec<usize>)> {
    if y.iter().any(|v| !v.is_finite()) {
        return Err(DiabetesError::ValidationError(
            "labels must be finite".to_string(),
        ));
    }

    let mut classes: Vec<f64> = y.to_vec();
    classes.sort_by(f64::total_cmp);
    classes.dedup();

    let labels = y
        .iter()
        .map(|v| classes.partition_point(|c| c < v))
        .collect();

    Ok((classes, labels))
}

/// Index of the largest value; ties resolve to the lowest index
pub(crate) fn argmax(values: ArrayView1<'_, f64>) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
            if v > best_v {
                (i, v)
            } else {
                (best_i, best_v)
            }
        })
        .0
}

fn class_counts(labels: &[usize], indices: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &i in indices {
        counts[labels[i]] += 1;
    }
    counts
}

fn leaf(counts: &[usize], n_samples: usize) -> TreeNode {
    let distribution = counts
        .iter()
        .map(|&c| if n_samples > 0 { c as f64 / n_samples as f64 } else { 0.0 })
        .collect();
    TreeNode::Leaf {
        distribution,
        n_samples,
    }
}

fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low / 2.0 + high / 2.0;
    // Rounding can land the midpoint on the upper value
    if mid >= high {
        low
    } else {
        mid
    }
}

fn leaf_distribution<'a>(mut node: &'a TreeNode, sample: ArrayView1<'_, f64>) -> &'a [f64] {
    loop {
        match node {
            TreeNode::Leaf { distribution, .. } => return distribution,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                node = if sample[*feature_idx] <= *threshold {
                    left.as_ref()
                } else {
                    right.as_ref()
                };
            }
        }
    }
}

fn node_depth(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
    }
}

fn count_leaves(node: &TreeNode) -> usize {
    match node {
        TreeNode::Leaf { .. } => 1,
        TreeNode::Split { left, right, .. } => count_leaves(left) + count_leaves(right),
    }
}
