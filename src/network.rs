use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::activations::Activation;
use crate::error::{IkError, Result};
use crate::layers::initialization::seeded_rng;
use crate::layers::{DenseLayer, LayerGradients, WeightInit};
use crate::loss::Loss;
use crate::optimizer::Optimizer;

/// Input width: a Cartesian target position (x, y, z).
pub const POSITION_DIM: usize = 3;

/// Output width: one angle per crane joint.
pub const JOINT_DIM: usize = 3;

/// Layer widths of the inverse-kinematics regressor.
pub const IK_TOPOLOGY: [usize; 5] = [POSITION_DIM, 64, 128, 64, JOINT_DIM];

/// Whether forward passes keep what backpropagation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

/// A feed-forward network of dense layers.
///
/// [`NeuralNetwork::predict`] is a pure function of the parameters. Only
/// [`NeuralNetwork::forward_batch`] in [`Mode::Train`] caches intermediate
/// activations, and only [`NeuralNetwork::train_batch`] mutates parameters.
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    mode: Mode,
}

impl NeuralNetwork {
    /// Create a network with the given layer sizes and activations.
    /// `activations[i]` is applied after the affine transform `layer_sizes[i] -> layer_sizes[i + 1]`.
    pub fn new(layer_sizes: &[usize], activations: &[Activation], init: WeightInit, seed: u64) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(IkError::invalid_parameter(
                "layer_sizes",
                "must have at least 2 layer sizes",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(IkError::DimensionMismatch {
                expected: format!("{} activations", layer_sizes.len() - 1),
                actual: format!("{} activations", activations.len()),
            });
        }

        let mut rng = seeded_rng(seed);
        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, init, &mut rng))
            .collect();

        Ok(NeuralNetwork { layers, mode: Mode::Train })
    }

    /// The 3 -> 64 -> 128 -> 64 -> 3 regressor with ReLU between hidden layers
    /// and a linear output.
    pub fn inverse_kinematics(seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let last = IK_TOPOLOGY.len() - 2;
        let layers = IK_TOPOLOGY
            .windows(2)
            .enumerate()
            .map(|(i, window)| {
                let activation = if i == last { Activation::Linear } else { Activation::Relu };
                DenseLayer::new(window[0], window[1], activation, WeightInit::FanInUniform, &mut rng)
            })
            .collect();
        NeuralNetwork { layers, mode: Mode::Train }
    }

    /// Assemble a network from prebuilt layers, checking that consecutive widths chain.
    pub fn from_layers(layers: Vec<DenseLayer>) -> Result<Self> {
        if layers.is_empty() {
            return Err(IkError::invalid_parameter("layers", "network needs at least one layer"));
        }
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(IkError::dimension_mismatch(
                    format!("layer {} input width {}", i + 1, pair[0].output_size()),
                    format!("layer {} input width {}", i + 1, pair[1].input_size()),
                ));
            }
        }
        Ok(NeuralNetwork { layers, mode: Mode::Train })
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(DenseLayer::parameter_count).sum()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch to training mode: forward passes cache activations again.
    pub fn train(&mut self) {
        self.mode = Mode::Train;
    }

    /// Switch to evaluation mode and release any cached activations.
    pub fn eval(&mut self) {
        self.mode = Mode::Eval;
        for layer in &mut self.layers {
            layer.clear_cache();
        }
    }

    /// Predict a batch `[n, input_size]` without side effects.
    pub fn predict(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input_width(inputs.ncols())?;
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.predict_batch(current.view());
        }
        Ok(current)
    }

    /// Predict a single input vector.
    pub fn predict_one(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        let batch = input.insert_axis(Axis(0));
        let output = self.predict(batch)?;
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Forward pass over a batch. In train mode each layer caches its inputs for
    /// [`NeuralNetwork::backward_batch`]; in eval mode this is the same as `predict`.
    pub fn forward_batch(&mut self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        if self.mode == Mode::Eval {
            return self.predict(inputs);
        }
        self.check_input_width(inputs.ncols())?;
        let mut current = inputs.to_owned();
        for layer in &mut self.layers {
            current = layer.forward_batch(current.view());
        }
        Ok(current)
    }

    /// Backpropagate dLoss/dOutput through every layer, returning per-layer
    /// gradients in layer order.
    pub fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<Vec<LayerGradients>> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (adjusted_error, weight_gradients, bias_gradients) = layer.backward_batch(current_error.view())?;
            gradients.push((weight_gradients, bias_gradients));
            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        Ok(gradients)
    }

    /// One full-batch gradient step. Returns the loss measured before the update.
    pub fn train_batch<L, O>(
        &mut self,
        inputs: ArrayView2<f32>,
        targets: ArrayView2<f32>,
        loss: &L,
        optimizer: &mut O,
        learning_rate: f32,
    ) -> Result<f32>
    where
        L: Loss + ?Sized,
        O: Optimizer + ?Sized,
    {
        if self.mode != Mode::Train {
            return Err(IkError::Training("train_batch() called in eval mode".to_string()));
        }
        if inputs.nrows() != targets.nrows() {
            return Err(IkError::dimension_mismatch(
                format!("{} target rows", inputs.nrows()),
                format!("{} target rows", targets.nrows()),
            ));
        }
        if targets.ncols() != self.output_size() {
            return Err(IkError::dimension_mismatch(
                format!("{} target columns", self.output_size()),
                format!("{} target columns", targets.ncols()),
            ));
        }

        let outputs = self.forward_batch(inputs)?;
        let batch_loss = loss.compute_batch(outputs.view(), targets);
        if !batch_loss.is_finite() {
            return Err(IkError::Training(format!("loss diverged to {}", batch_loss)));
        }
        let output_errors = loss.gradient_batch(outputs.view(), targets);
        let gradients = self.backward_batch(output_errors.view())?;
        optimizer.step(&mut self.layers, &gradients, learning_rate)?;
        Ok(batch_loss)
    }

    fn check_input_width(&self, width: usize) -> Result<()> {
        if width != self.input_size() {
            return Err(IkError::dimension_mismatch(
                format!("{} input columns", self.input_size()),
                format!("{} input columns", width),
            ));
        }
        Ok(())
    }
}
