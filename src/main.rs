//! Diabetes predictor - Main Entry Point

use clap::Parser;
use diabetes_predictor::cli::{cmd_predict, cmd_serve, cmd_train, Cli, Commands};
use diabetes_predictor::server::ServerConfig;
use diabetes_predictor::training::TrainingConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diabetes_predictor=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            target,
            test_size,
            seed,
            n_estimators,
            max_depth,
            no_bootstrap,
            model_out,
            scaler_out,
            report,
        } => {
            let config = TrainingConfig::new()
                .with_target(target)
                .with_test_size(test_size)
                .with_random_state(seed)
                .with_n_estimators(n_estimators)
                .with_max_depth(max_depth)
                .with_bootstrap(!no_bootstrap);
            cmd_train(&data, config, &model_out, &scaler_out, report.as_deref())?;
        }
        Commands::Predict { data, model, scaler, output } => {
            cmd_predict(&data, &model, &scaler, output.as_deref())?;
        }
        Commands::Serve { host, port, model, scaler, cors_origin } => {
            let config = ServerConfig::default()
                .with_host(host)
                .with_port(port)
                .with_artifacts(model, scaler)
                .with_cors_origin(cors_origin);
            cmd_serve(config).await?;
        }
    }

    Ok(())
}
