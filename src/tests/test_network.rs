use ndarray::{arr1, arr2, Array2};
use tempfile::tempdir;

use crate::activations::Activation;
use crate::layers::WeightInit;
use crate::loss::{Loss, MeanSquaredError};
use crate::network::{Mode, NeuralNetwork, IK_TOPOLOGY};
use crate::optimizer::SGD;

#[test]
fn test_inverse_kinematics_topology() {
    let network = NeuralNetwork::inverse_kinematics(42);

    assert_eq!(network.layers.len(), IK_TOPOLOGY.len() - 1);
    for (layer, window) in network.layers.iter().zip(IK_TOPOLOGY.windows(2)) {
        assert_eq!(layer.weights.shape(), [window[0], window[1]]);
    }
    let activations: Vec<_> = network.layers.iter().map(|l| l.activation).collect();
    assert_eq!(
        activations,
        vec![Activation::Relu, Activation::Relu, Activation::Relu, Activation::Linear]
    );
    assert_eq!(network.parameter_count(), 256 + 8320 + 8256 + 195);
}

#[test]
fn test_new_rejects_bad_shapes() {
    assert!(NeuralNetwork::new(&[3], &[], WeightInit::FanInUniform, 0).is_err());
    assert!(NeuralNetwork::new(&[3, 4, 3], &[Activation::Relu], WeightInit::FanInUniform, 0).is_err());
}

#[test]
fn test_predict_output_shape() {
    let network = NeuralNetwork::inverse_kinematics(42);
    let inputs = Array2::<f32>::zeros((5, 3));
    let outputs = network.predict(inputs.view()).unwrap();
    assert_eq!(outputs.shape(), [5, 3]);
}

#[test]
fn test_predict_rejects_wrong_width() {
    let network = NeuralNetwork::inverse_kinematics(42);
    let inputs = Array2::<f32>::zeros((1, 4));
    assert!(network.predict(inputs.view()).is_err());
}

#[test]
fn test_predict_is_pure() {
    let network = NeuralNetwork::inverse_kinematics(7);
    let before = network.layers.clone();
    let input = arr1(&[5.55, 7.4, 3.25]);

    let first = network.predict_one(input.view()).unwrap();
    let second = network.predict_one(input.view()).unwrap();

    assert_eq!(first, second);
    for (layer, saved) in network.layers.iter().zip(&before) {
        assert_eq!(layer.weights, saved.weights);
        assert_eq!(layer.biases, saved.biases);
    }
}

#[test]
fn test_same_seed_same_network() {
    let a = NeuralNetwork::inverse_kinematics(3);
    let b = NeuralNetwork::inverse_kinematics(3);
    let c = NeuralNetwork::inverse_kinematics(4);
    let input = arr2(&[[1.0, 2.0, 3.0]]);

    assert_eq!(a.predict(input.view()).unwrap(), b.predict(input.view()).unwrap());
    assert_ne!(a.layers[0].weights, c.layers[0].weights);
}

#[test]
fn test_mode_switching() {
    let mut network = NeuralNetwork::inverse_kinematics(1);
    assert_eq!(network.mode(), Mode::Train);
    network.eval();
    assert_eq!(network.mode(), Mode::Eval);
    network.train();
    assert_eq!(network.mode(), Mode::Train);
}

#[test]
fn test_train_batch_rejected_in_eval_mode() {
    let mut network = NeuralNetwork::inverse_kinematics(1);
    network.eval();
    let inputs = Array2::<f32>::zeros((2, 3));
    let targets = Array2::<f32>::zeros((2, 3));
    let mut optimizer = SGD::new();

    let result = network.train_batch(inputs.view(), targets.view(), &MeanSquaredError, &mut optimizer, 0.01);
    assert!(result.is_err());
}

#[test]
fn test_train_batch_rejects_misaligned_targets() {
    let mut network = NeuralNetwork::inverse_kinematics(1);
    let inputs = Array2::<f32>::zeros((2, 3));
    let targets = Array2::<f32>::zeros((3, 3));
    let mut optimizer = SGD::new();

    let result = network.train_batch(inputs.view(), targets.view(), &MeanSquaredError, &mut optimizer, 0.01);
    assert!(result.is_err());
}

#[test]
fn test_gradients_match_finite_differences() {
    let mut network = NeuralNetwork::new(
        &[2, 3, 1],
        &[Activation::Linear, Activation::Linear],
        WeightInit::FanInUniform,
        11,
    )
    .unwrap();
    let inputs = arr2(&[[0.5, -1.0], [1.5, 0.25]]);
    let targets = arr2(&[[1.0], [-0.5]]);
    let loss = MeanSquaredError;

    let outputs = network.forward_batch(inputs.view()).unwrap();
    let errors = loss.gradient_batch(outputs.view(), targets.view());
    let gradients = network.backward_batch(errors.view()).unwrap();

    let eps = 1e-2;
    for layer_index in 0..network.layers.len() {
        let shape = network.layers[layer_index].weights.dim();
        for i in 0..shape.0 {
            for j in 0..shape.1 {
                let mut plus = network.clone();
                plus.layers[layer_index].weights[[i, j]] += eps;
                let mut minus = network.clone();
                minus.layers[layer_index].weights[[i, j]] -= eps;

                let loss_plus = loss.compute_batch(plus.predict(inputs.view()).unwrap().view(), targets.view());
                let loss_minus = loss.compute_batch(minus.predict(inputs.view()).unwrap().view(), targets.view());
                let numeric = (loss_plus - loss_minus) / (2.0 * eps);
                let analytic = gradients[layer_index].0[[i, j]];

                assert!(
                    (numeric - analytic).abs() < 1e-2,
                    "layer {} weight ({}, {}): numeric {} vs analytic {}",
                    layer_index,
                    i,
                    j,
                    numeric,
                    analytic
                );
            }
        }
    }
}

#[test]
fn test_sgd_step_reduces_loss() {
    let mut network = NeuralNetwork::inverse_kinematics(9);
    let inputs = arr2(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 0.5, -1.0]]);
    let targets = arr2(&[[0.0, 0.0, 0.0], [0.1, 0.1, 0.1], [0.3, -0.2, 0.5]]);
    let mut optimizer = SGD::new();

    let before = network
        .train_batch(inputs.view(), targets.view(), &MeanSquaredError, &mut optimizer, 1e-3)
        .unwrap();
    let after = MeanSquaredError.compute_batch(network.predict(inputs.view()).unwrap().view(), targets.view());
    assert!(after < before, "loss went from {} to {}", before, after);
}

#[test]
fn test_checkpoint_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.bin");

    let network = NeuralNetwork::inverse_kinematics(42);
    network.save_checkpoint(&path).unwrap();
    let restored = NeuralNetwork::load_checkpoint(&path).unwrap();

    let input = arr2(&[[5.55, 7.4, 3.25], [0.0, -1.0, 2.0]]);
    assert_eq!(network.predict(input.view()).unwrap(), restored.predict(input.view()).unwrap());
}

#[test]
fn test_load_parameters_into_fresh_network() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.bin");

    let trained = NeuralNetwork::inverse_kinematics(1);
    trained.save_checkpoint(&path).unwrap();

    let mut fresh = NeuralNetwork::inverse_kinematics(2);
    fresh.load_parameters(&path).unwrap();
    for (a, b) in trained.layers.iter().zip(&fresh.layers) {
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.biases, b.biases);
    }
}

#[test]
fn test_load_parameters_rejects_other_topology() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.bin");

    let small = NeuralNetwork::new(&[3, 8, 3], &[Activation::Relu, Activation::Linear], WeightInit::FanInUniform, 0)
        .unwrap();
    small.save_checkpoint(&path).unwrap();

    let mut network = NeuralNetwork::inverse_kinematics(5);
    let before = network.layers[0].weights.clone();
    assert!(network.load_parameters(&path).is_err());
    assert_eq!(network.layers[0].weights, before);
}

#[test]
fn test_dense_network_macro() {
    let network = dense_network!(seed = 3; (3, 8, Activation::Relu), (8, 3, Activation::Linear)).unwrap();
    assert_eq!(network.input_size(), 3);
    assert_eq!(network.output_size(), 3);
    assert_eq!(network.parameter_count(), 3 * 8 + 8 + 8 * 3 + 3);
}

#[test]
fn test_dense_network_macro_rejects_unchained_widths() {
    let result = dense_network!(seed = 3; (3, 8, Activation::Relu), (4, 3, Activation::Linear));
    assert!(result.is_err());
}
