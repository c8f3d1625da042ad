use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{IkError, Result};
use crate::layers::{DenseLayer, LayerGradients};

/// Applies one parameter update to every layer of a network.
///
/// `gradients[i]` belongs to `layers[i]`.
pub trait Optimizer {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) -> Result<()>;
}

/// Which optimizer a training run uses.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OptimizerKind {
    Sgd,
    #[default]
    Adam,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl OptimizerWrapper {
    pub fn from_kind(kind: OptimizerKind) -> Self {
        match kind {
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::default()),
        }
    }
}

impl Optimizer for OptimizerWrapper {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) -> Result<()> {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.step(layers, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.step(layers, gradients, learning_rate),
        }
    }
}

/// Plain gradient descent.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }

    pub fn update_weights(&mut self, weights: &mut Array2<f32>, gradients: &Array2<f32>, learning_rate: f32) {
        weights.zip_mut_with(gradients, |w, &g| *w -= learning_rate * g);
    }

    pub fn update_biases(&mut self, biases: &mut Array1<f32>, gradients: &Array1<f32>, learning_rate: f32) {
        biases.zip_mut_with(gradients, |b, &g| *b -= learning_rate * g);
    }
}

impl Optimizer for SGD {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) -> Result<()> {
        check_gradients(layers, gradients)?;
        for (layer, (weight_gradients, bias_gradients)) in layers.iter_mut().zip(gradients) {
            self.update_weights(&mut layer.weights, weight_gradients, learning_rate);
            self.update_biases(&mut layer.biases, bias_gradients, learning_rate);
        }
        Ok(())
    }
}

/// First and second moment estimates for one layer.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct Moments {
    m_weights: Array2<f32>,
    v_weights: Array2<f32>,
    m_biases: Array1<f32>,
    v_biases: Array1<f32>,
}

impl Moments {
    fn zeros_like(layer: &DenseLayer) -> Self {
        Moments {
            m_weights: Array2::zeros(layer.weights.dim()),
            v_weights: Array2::zeros(layer.weights.dim()),
            m_biases: Array1::zeros(layer.biases.dim()),
            v_biases: Array1::zeros(layer.biases.dim()),
        }
    }

    fn fits(&self, layer: &DenseLayer) -> bool {
        self.m_weights.dim() == layer.weights.dim() && self.m_biases.dim() == layer.biases.dim()
    }
}

/// Adam with bias-corrected moment estimates.
///
/// Moment buffers are allocated on the first step, one per layer, so the same
/// optimizer can be built before the network it will train.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    moments: Vec<Moments>,
    /// Number of steps taken so far.
    pub t: u32,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            moments: Vec::new(),
            t: 0,
        }
    }

    fn ensure_state(&mut self, layers: &[DenseLayer]) -> Result<()> {
        if self.moments.is_empty() {
            self.moments = layers.iter().map(Moments::zeros_like).collect();
            return Ok(());
        }
        if self.moments.len() != layers.len() || !self.moments.iter().zip(layers).all(|(m, l)| m.fits(l)) {
            return Err(IkError::Training(
                "Adam state was built for a different network topology".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) -> Result<()> {
        check_gradients(layers, gradients)?;
        self.ensure_state(layers)?;

        self.t += 1;
        let t = self.t as i32;
        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let correction1 = 1.0 - beta1.powi(t);
        let correction2 = 1.0 - beta2.powi(t);

        for ((layer, (weight_gradients, bias_gradients)), moments) in
            layers.iter_mut().zip(gradients).zip(self.moments.iter_mut())
        {
            Zip::from(&mut layer.weights)
                .and(&mut moments.m_weights)
                .and(&mut moments.v_weights)
                .and(weight_gradients)
                .for_each(|w, m, v, &g| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / correction1;
                    let v_hat = *v / correction2;
                    *w -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
                });

            Zip::from(&mut layer.biases)
                .and(&mut moments.m_biases)
                .and(&mut moments.v_biases)
                .and(bias_gradients)
                .for_each(|b, m, v, &g| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    let m_hat = *m / correction1;
                    let v_hat = *v / correction2;
                    *b -= learning_rate * m_hat / (v_hat.sqrt() + epsilon);
                });
        }
        Ok(())
    }
}

fn check_gradients(layers: &[DenseLayer], gradients: &[LayerGradients]) -> Result<()> {
    if layers.len() != gradients.len() {
        return Err(IkError::dimension_mismatch(
            format!("{} gradient pairs", layers.len()),
            format!("{} gradient pairs", gradients.len()),
        ));
    }
    for (i, (layer, (wg, bg))) in layers.iter().zip(gradients).enumerate() {
        if wg.dim() != layer.weights.dim() || bg.dim() != layer.biases.dim() {
            return Err(IkError::dimension_mismatch(
                format!("layer {} gradients {:?}/{:?}", i, layer.weights.dim(), layer.biases.dim()),
                format!("layer {} gradients {:?}/{:?}", i, wg.dim(), bg.dim()),
            ));
        }
    }
    Ok(())
}
