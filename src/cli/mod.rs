//! Diabetes predictor CLI
//!
//! Command-line interface for training, batch scoring and serving.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use crate::inference::{Diagnosis, Predictor};
use crate::schema::validate_columns;
use crate::server::{run_server, ServerConfig};
use crate::training::{TrainingConfig, TrainingPipeline, TrainingReport};
use crate::utils::{DataLoader, DataSaver};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<20} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "diabetes-predictor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and serve a random-forest diabetes predictor")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the scaler and classifier and write both artifacts
    Train {
        /// Training data file (CSV, TSV, JSON, Parquet, XLS, or XLSX)
        #[arg(short, long)]
        data: PathBuf,

        /// Target column name
        #[arg(short, long, default_value = "Outcome")]
        target: String,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Random seed for the split and the forest
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of trees
        #[arg(long, default_value = "100")]
        n_estimators: usize,

        /// Maximum tree depth (unbounded when omitted)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Fit every tree on all training rows instead of a bootstrap sample
        #[arg(long)]
        no_bootstrap: bool,

        /// Classifier artifact output
        #[arg(long, default_value = DEFAULT_MODEL_PATH)]
        model_out: PathBuf,

        /// Scaler artifact output
        #[arg(long, default_value = DEFAULT_SCALER_PATH)]
        scaler_out: PathBuf,

        /// Write a JSON training report here
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Score every row of a data file
    Predict {
        /// Input data file with the eight feature columns
        #[arg(short, long)]
        data: PathBuf,

        /// Classifier artifact
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Scaler artifact
        #[arg(short, long, default_value = DEFAULT_SCALER_PATH)]
        scaler: PathBuf,

        /// Output CSV; a summary is printed when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start the web server
    Serve {
        /// Server host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Server port
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Classifier artifact
        #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Scaler artifact
        #[arg(short, long, default_value = DEFAULT_SCALER_PATH)]
        scaler: PathBuf,

        /// Allowed CORS origin (any origin when omitted)
        #[arg(long)]
        cors_origin: Option<String>,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    DataLoader::new()
        .load_auto(path)
        .with_context(|| format!("failed to load {}", path.display()))
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_path: &Path,
    config: TrainingConfig,
    model_out: &Path,
    scaler_out: &Path,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = load_data(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    step_run(&format!("Training {} trees", config.n_estimators.to_string().cyan()));
    let start = Instant::now();
    let artifacts = TrainingPipeline::new(config).run(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    step_run("Saving artifacts");
    artifacts.save(model_out, scaler_out)?;
    step_done(&format!("{} · {}", model_out.display(), scaler_out.display()));

    if let Some(path) = report_path {
        artifacts.report.save_json(path)?;
        step_ok(&format!("Report written to {}", path.display()));
    }

    print_report(&artifacts.report);
    Ok(())
}

fn print_report(report: &TrainingReport) {
    section("Imputation");
    for entry in report.imputation.iter().filter(|e| e.values_filled > 0) {
        kv(
            &entry.column,
            &format!("{} filled with {:.3}", entry.values_filled, entry.fill_value),
        );
    }

    section("Held-out evaluation");
    let m = &report.metrics;
    kv("Samples", &format!("{} train / {} test", report.n_train, report.n_test));
    println!("  {:<20} {}", muted("Accuracy"), format!("{:.4}", m.accuracy).white().bold());
    kv("Precision", &format!("{:.4}", m.precision));
    kv("Recall", &format!("{:.4}", m.recall));
    kv("F1", &format!("{:.4}", m.f1_score));
    kv(
        "Confusion",
        &format!(
            "tp {}  fp {}  tn {}  fn {}",
            m.confusion.true_positive,
            m.confusion.false_positive,
            m.confusion.true_negative,
            m.confusion.false_negative
        ),
    );

    section("Feature importance");
    let mut importances = report.feature_importances.clone();
    importances.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, value) in &importances {
        kv(name, &format!("{:.4}", value));
    }
    println!();
}

pub fn cmd_predict(
    data_path: &Path,
    model_path: &Path,
    scaler_path: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading artifacts");
    let predictor = Predictor::load(model_path, scaler_path)?;
    step_done(&format!("{} trees", predictor.model().n_trees()));

    step_run("Loading data");
    let mut df = load_data(data_path)?;
    validate_columns(&df, false)?;
    step_done(&format!("{} rows", df.height()));

    step_run("Scoring");
    let start = Instant::now();
    let predictions = predictor.predict_frame(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    let labels: Vec<i32> = predictions.iter().map(|p| i32::from(p.diagnosis.label())).collect();
    let probabilities: Vec<f64> = predictions.iter().map(|p| p.probability).collect();
    let messages: Vec<&str> = predictions.iter().map(|p| p.diagnosis.message()).collect();
    df.with_column(Series::new("Prediction".into(), labels))?;
    df.with_column(Series::new("Probability".into(), probabilities))?;
    df.with_column(Series::new("Diagnosis".into(), messages))?;

    let positives = predictions
        .iter()
        .filter(|p| p.diagnosis == Diagnosis::Positive)
        .count();
    println!();
    kv("Positive", &positives.to_string());
    kv("Negative", &(predictions.len() - positives).to_string());

    match output {
        Some(path) => {
            DataSaver::save_csv(&mut df, path)?;
            step_ok(&format!("Predictions written to {}", path.display()));
        }
        None => {
            println!();
            println!("{}", df.head(Some(10)));
        }
    }
    println!();
    Ok(())
}

pub async fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    run_server(config).await
}
