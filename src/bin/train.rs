//! Trains the Crane3R inverse-kinematics network and writes its artifacts.
//!
//! Paths and hyperparameters come from `TrainConfig::crane3r()`; set `RUST_LOG`
//! to change log verbosity.

use kine_dnn::config::{TrainConfig, DEFAULT_LOG_FILTER};
use kine_dnn::data::{load_dataset, split_train_validation};
use kine_dnn::export::OnnxExporter;
use kine_dnn::metrics::RegressionMetrics;
use kine_dnn::network::NeuralNetwork;
use kine_dnn::trainer::Trainer;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let config = TrainConfig::crane3r();
    config.validate()?;

    let dataset = load_dataset(&config.data)?;
    let split = split_train_validation(&dataset, config.validation_fraction, config.seed)?;

    let mut network = NeuralNetwork::inverse_kinematics(config.seed);
    let report = Trainer::new(config.clone())?.fit(&mut network, &split)?;
    tracing::info!(
        epochs_run = report.epochs_run,
        final_train_loss = report.final_train_loss,
        final_val_loss = report.final_val_loss,
        stop_reason = ?report.stop_reason,
        "training complete"
    );

    let predictions = network.predict(split.validation.positions.view())?;
    for (joint, metrics) in RegressionMetrics::per_column(predictions.view(), split.validation.angles.view())
        .iter()
        .enumerate()
    {
        tracing::info!(joint, rmse = metrics.rmse, mae = metrics.mae, r_squared = metrics.r_squared, "validation");
    }

    network.save_checkpoint(&config.checkpoint_path)?;
    config.save_json(config.sidecar_path())?;
    if let Some(onnx_path) = &config.onnx_path {
        OnnxExporter::export(&network, onnx_path)?;
    }

    Ok(())
}
