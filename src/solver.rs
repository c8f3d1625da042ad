//! Inverse-kinematics solvers backed by a trained network.

use std::path::Path;

use ndarray::ArrayView1;

use crate::error::{IkError, Result};
use crate::export::OnnxImporter;
use crate::network::{NeuralNetwork, JOINT_DIM, POSITION_DIM};

/// Maps an end-effector target position to joint values.
pub trait IkSolver {
    fn solve_ik(&self, target: [f32; POSITION_DIM]) -> Result<Vec<f32>>;
}

/// Solves by evaluating an exported ONNX graph.
///
/// The graph is read and validated once, at construction.
pub struct DnnSolver {
    network: NeuralNetwork,
}

impl DnnSolver {
    pub fn from_onnx<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let network = OnnxImporter::import(path)?;
        tracing::debug!(path = %path.display(), parameters = network.parameter_count(), "ONNX solver loaded");
        Self::from_network(network)
    }

    pub fn from_network(mut network: NeuralNetwork) -> Result<Self> {
        check_widths(&network)?;
        network.eval();
        Ok(DnnSolver { network })
    }
}

impl IkSolver for DnnSolver {
    fn solve_ik(&self, target: [f32; POSITION_DIM]) -> Result<Vec<f32>> {
        solve(&self.network, target)
    }
}

/// Solves from a bincode checkpoint, without going through ONNX.
pub struct CheckpointSolver {
    network: NeuralNetwork,
}

impl CheckpointSolver {
    pub fn from_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut network = NeuralNetwork::load_checkpoint(path)?;
        check_widths(&network)?;
        network.eval();
        Ok(CheckpointSolver { network })
    }
}

impl IkSolver for CheckpointSolver {
    fn solve_ik(&self, target: [f32; POSITION_DIM]) -> Result<Vec<f32>> {
        solve(&self.network, target)
    }
}

fn check_widths(network: &NeuralNetwork) -> Result<()> {
    if network.input_size() != POSITION_DIM || network.output_size() != JOINT_DIM {
        return Err(IkError::dimension_mismatch(
            format!("{} -> {} network", POSITION_DIM, JOINT_DIM),
            format!("{} -> {} network", network.input_size(), network.output_size()),
        ));
    }
    Ok(())
}

fn solve(network: &NeuralNetwork, target: [f32; POSITION_DIM]) -> Result<Vec<f32>> {
    let angles = network.predict_one(ArrayView1::from(&target[..]))?;
    Ok(angles.to_vec())
}
