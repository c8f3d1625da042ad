//! Runs the trained Crane3R network on a single target position.

use kine_dnn::config::{TrainConfig, DEFAULT_LOG_FILTER};
use kine_dnn::network::NeuralNetwork;
use kine_dnn::solver::{DnnSolver, IkSolver};
use ndarray::ArrayView1;
use tracing_subscriber::EnvFilter;

// Hand-picked target inside the crane's workspace.
#[allow(clippy::approx_constant)]
const QUERY: [f32; 3] = [5.55, 7.4, 3.14];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    let config = TrainConfig::crane3r();

    let mut network = NeuralNetwork::inverse_kinematics(config.seed);
    network.load_parameters(&config.checkpoint_path)?;
    network.eval();

    let target = ArrayView1::from(&QUERY[..]);
    let predicted = network.predict_one(target)?;

    println!("Input Position: {}", target);
    println!("Predicted Joint Angles (in degrees): {}", predicted);

    if let Some(onnx_path) = config.onnx_path.as_deref().filter(|p| p.exists()) {
        let solver = DnnSolver::from_onnx(onnx_path)?;
        let angles = solver.solve_ik(QUERY)?;
        println!("ONNX Joint Angles (in degrees): {:?}", angles);
    }

    Ok(())
}
