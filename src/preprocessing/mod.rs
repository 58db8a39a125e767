//! Data preprocessing module
//!
//! - Missing value imputation with a zero-as-missing rule
//! - Feature standardization

mod imputer;
mod scaler;

pub use imputer::{ColumnImputation, MeanImputer};
pub use scaler::{ScalerParams, StandardScaler};
