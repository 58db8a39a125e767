//! Shared fixtures for integration tests
#![allow(dead_code)]

use diabetes_predictor::inference::Predictor;
use diabetes_predictor::training::{TrainingConfig, TrainingPipeline};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};

/// The record every fixture labels positive
pub const KNOWN_POSITIVE: [f64; 8] = [6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.627, 50.0];

pub fn known_positive_json() -> Value {
    json!({
        "Pregnancies": 6,
        "Glucose": 148,
        "BloodPressure": 72,
        "SkinThickness": 35,
        "Insulin": 0,
        "BMI": 33.6,
        "DiabetesPedigreeFunction": 0.627,
        "Age": 50
    })
}

pub fn clearly_negative_json() -> Value {
    json!({
        "Pregnancies": 1,
        "Glucose": 85,
        "BloodPressure": 66,
        "SkinThickness": 29,
        "Insulin": 0,
        "BMI": 22.1,
        "DiabetesPedigreeFunction": 0.351,
        "Age": 24
    })
}

/// Deterministic diabetes-shaped data: positives have high glucose, BMI and
/// age; zeros are sprinkled into Insulin and SkinThickness. Row 0 is
/// [`KNOWN_POSITIVE`] with outcome 1.
pub fn synthetic_frame(n: usize, seed: u64) -> DataFrame {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut cols: [Vec<f64>; 8] = Default::default();
    let mut outcome: Vec<i64> = Vec::with_capacity(n);

    for (col, &value) in cols.iter_mut().zip(KNOWN_POSITIVE.iter()) {
        col.push(value);
    }
    outcome.push(1);

    for i in 1..n {
        let positive = i % 3 == 0;
        let (glucose, bmi, age) = if positive {
            (rng.gen_range(140.0_f64..190.0), rng.gen_range(30.0_f64..45.0), rng.gen_range(35.0_f64..65.0))
        } else {
            (rng.gen_range(75.0_f64..115.0), rng.gen_range(18.0_f64..30.0), rng.gen_range(21.0_f64..40.0))
        };
        let insulin = if rng.gen_bool(0.4) { 0.0 } else { rng.gen_range(15.0_f64..300.0) };
        let skin = if rng.gen_bool(0.2) { 0.0 } else { rng.gen_range(10.0_f64..50.0) };

        cols[0].push(f64::from(rng.gen_range(0u8..12)));
        cols[1].push(glucose.round());
        cols[2].push(rng.gen_range(50.0..95.0_f64).round());
        cols[3].push(skin.round());
        cols[4].push(insulin.round());
        cols[5].push((bmi * 10.0).round() / 10.0);
        cols[6].push(rng.gen_range(0.08_f64..1.5));
        cols[7].push(age.round());
        outcome.push(i64::from(positive));
    }

    df!(
        "Pregnancies" => &cols[0],
        "Glucose" => &cols[1],
        "BloodPressure" => &cols[2],
        "SkinThickness" => &cols[3],
        "Insulin" => &cols[4],
        "BMI" => &cols[5],
        "DiabetesPedigreeFunction" => &cols[6],
        "Age" => &cols[7],
        "Outcome" => &outcome
    )
    .unwrap()
}

/// A predictor trained in memory on [`synthetic_frame`]
pub fn trained_predictor(n_estimators: usize) -> Predictor {
    let config = TrainingConfig::new().with_n_estimators(n_estimators);
    TrainingPipeline::new(config)
        .run(&synthetic_frame(200, 7))
        .unwrap()
        .into_predictor()
        .unwrap()
}
