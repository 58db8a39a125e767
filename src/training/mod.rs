//! Model training module
//!
//! - CART decision trees and a bagged Random Forest classifier
//! - Seeded train/test split and hold-out metrics
//! - The end-to-end training pipeline

mod config;
mod metrics;
mod pipeline;
mod split;
pub mod decision_tree;
pub mod random_forest;

pub use config::TrainingConfig;
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use metrics::{ConfusionMatrix, ModelMetrics};
pub use pipeline::{TrainedArtifacts, TrainingPipeline, TrainingReport};
pub use random_forest::{MaxFeatures, RandomForest};
pub use split::{train_test_split, TrainTestSplit};
