//! # kine-dnn - Learned Inverse Kinematics
//!
//! kine-dnn trains a small feed-forward network that maps a Cartesian target
//! position to the joint angles of a three-joint crane (Crane3R), and ships the
//! result as a parameter checkpoint and as a portable ONNX graph.
//!
//! ## Pipeline
//!
//! 1. [`data`] loads two headerless CSV tables (positions, joint angles) and
//!    splits them 80/20 with a fixed seed
//! 2. [`network`] builds the 3 -> 64 -> 128 -> 64 -> 3 regressor
//! 3. [`trainer`] runs full-batch Adam on mean squared error, validating every
//!    epoch and optionally stopping early
//! 4. [`export`] writes the checkpoint and the ONNX graph
//! 5. [`solver`] answers IK queries from either artifact
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kine_dnn::config::TrainConfig;
//! use kine_dnn::data::{load_dataset, split_train_validation};
//! use kine_dnn::network::NeuralNetwork;
//! use kine_dnn::trainer::Trainer;
//!
//! # fn main() -> kine_dnn::error::Result<()> {
//! let config = TrainConfig::crane3r();
//! let dataset = load_dataset(&config.data)?;
//! let split = split_train_validation(&dataset, config.validation_fraction, config.seed)?;
//!
//! let mut network = NeuralNetwork::inverse_kinematics(config.seed);
//! let report = Trainer::new(config.clone())?.fit(&mut network, &split)?;
//! network.save_checkpoint(&config.checkpoint_path)?;
//! println!("stopped after {} epochs: {:?}", report.epochs_run, report.stop_reason);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - ReLU and linear activations
//! - [`config`] - Training presets and data locations
//! - [`data`] - CSV loading and train/validation splitting
//! - [`error`] - Error types and result handling
//! - [`export`] - Checkpoints and ONNX graphs
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Mean squared error
//! - [`metrics`] - Loss history and regression metrics
//! - [`network`] - The feed-forward network
//! - [`optimizer`] - Adam and SGD
//! - [`solver`] - IK solvers over trained artifacts
//! - [`trainer`] - The training loop

#[macro_use]
pub mod macros;

pub mod activations;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod layers;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod solver;
pub mod trainer;

#[cfg(test)]
mod tests;
