use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{IkError, Result};
use crate::layers::DenseLayer;
use crate::network::NeuralNetwork;

/// Bumped whenever the on-disk layout of [`Checkpoint`] changes.
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Learned parameters of one dense layer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LayerState {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Everything needed to restore a trained network, and nothing else:
/// no optimizer state, no cached activations.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Checkpoint {
    pub format_version: u32,
    pub layers: Vec<LayerState>,
}

impl Checkpoint {
    pub fn from_network(network: &NeuralNetwork) -> Self {
        Checkpoint {
            format_version: CHECKPOINT_FORMAT_VERSION,
            layers: network
                .layers
                .iter()
                .map(|layer| LayerState {
                    weights: layer.weights.clone(),
                    biases: layer.biases.clone(),
                    activation: layer.activation,
                })
                .collect(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let checkpoint: Checkpoint = bincode::deserialize(&bytes)?;
        if checkpoint.format_version != CHECKPOINT_FORMAT_VERSION {
            return Err(IkError::Serialization(format!(
                "unsupported checkpoint format version {} (expected {})",
                checkpoint.format_version, CHECKPOINT_FORMAT_VERSION
            )));
        }
        Ok(checkpoint)
    }

    /// Rebuild a network with exactly the saved topology.
    pub fn into_network(self) -> Result<NeuralNetwork> {
        let layers = self
            .layers
            .into_iter()
            .map(|state| DenseLayer::try_from_parameters(state.weights, state.biases, state.activation))
            .collect::<Result<Vec<_>>>()?;
        NeuralNetwork::from_layers(layers)
    }
}

impl NeuralNetwork {
    /// Serialize the network's parameters to `path`.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        Checkpoint::from_network(self).write(path)?;
        tracing::info!(path = %path.display(), parameters = self.parameter_count(), "checkpoint written");
        Ok(())
    }

    /// Construct a network from a checkpoint, taking its topology from the file.
    pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self> {
        Checkpoint::read(path.as_ref())?.into_network()
    }

    /// Overwrite this network's parameters with those saved at `path`.
    ///
    /// Fails without modifying `self` if the saved topology differs in layer
    /// count, any parameter shape, or any activation.
    pub fn load_parameters<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let checkpoint = Checkpoint::read(path.as_ref())?;
        self.apply_checkpoint(checkpoint)
    }

    pub fn apply_checkpoint(&mut self, checkpoint: Checkpoint) -> Result<()> {
        if checkpoint.layers.len() != self.layers.len() {
            return Err(IkError::ParameterMismatch(format!(
                "checkpoint has {} layers, model has {}",
                checkpoint.layers.len(),
                self.layers.len()
            )));
        }
        for (i, (state, layer)) in checkpoint.layers.iter().zip(&self.layers).enumerate() {
            if state.weights.dim() != layer.weights.dim() || state.biases.dim() != layer.biases.dim() {
                return Err(IkError::ParameterMismatch(format!(
                    "layer {}: checkpoint weights {:?} / biases {}, model weights {:?} / biases {}",
                    i,
                    state.weights.dim(),
                    state.biases.len(),
                    layer.weights.dim(),
                    layer.biases.len()
                )));
            }
            if state.activation != layer.activation {
                return Err(IkError::ParameterMismatch(format!(
                    "layer {}: checkpoint activation {:?}, model activation {:?}",
                    i, state.activation, layer.activation
                )));
            }
        }

        for (state, layer) in checkpoint.layers.into_iter().zip(self.layers.iter_mut()) {
            *layer = DenseLayer::from_parameters(state.weights, state.biases, state.activation);
        }
        Ok(())
    }
}
