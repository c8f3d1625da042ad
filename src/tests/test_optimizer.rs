use ndarray::{arr1, arr2, Array1, Array2};
use crate::activations::Activation;
use crate::layers::{DenseLayer, LayerGradients};
use crate::optimizer::{Adam, Optimizer, OptimizerKind, OptimizerWrapper, SGD};

fn layer(weights: Array2<f32>, biases: Array1<f32>) -> DenseLayer {
    DenseLayer::from_parameters(weights, biases, Activation::Linear)
}

fn assert_close(actual: &Array2<f32>, expected: &Array2<f32>, tolerance: f32) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() < tolerance, "{} vs {}", a, e);
    }
}

#[test]
fn test_sgd_update_weights() {
    let mut optimizer = SGD::new();
    let mut weights = Array2::<f32>::ones((2, 2));
    let gradients = arr2(&[[0.1, 0.2], [0.3, 0.4]]);
    optimizer.update_weights(&mut weights, &gradients, 0.01);

    assert_close(&weights, &arr2(&[[0.999, 0.998], [0.997, 0.996]]), 1e-6);
}

#[test]
fn test_sgd_update_biases() {
    let mut optimizer = SGD::new();
    let mut biases = arr1(&[1.0, -1.0]);
    optimizer.update_biases(&mut biases, &arr1(&[0.5, -0.5]), 0.1);

    assert!((biases[0] - 0.95).abs() < 1e-6);
    assert!((biases[1] + 0.95).abs() < 1e-6);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    let mut layers = vec![layer(arr2(&[[1.0, 1.0], [1.0, 1.0]]), arr1(&[0.0, 0.0]))];
    let gradients: Vec<LayerGradients> = vec![(arr2(&[[0.5, -2.0], [1e-3, -10.0]]), arr1(&[3.0, -0.25]))];
    let mut optimizer = Adam::default();

    optimizer.step(&mut layers, &gradients, 0.001).unwrap();

    // With bias correction the first update is lr * sign(g).
    assert_close(&layers[0].weights, &arr2(&[[0.999, 1.001], [0.999, 1.001]]), 1e-5);
    assert!((layers[0].biases[0] + 0.001).abs() < 1e-5);
    assert!((layers[0].biases[1] - 0.001).abs() < 1e-5);
    assert_eq!(optimizer.t, 1);
}

#[test]
fn test_adam_counts_steps_not_layers() {
    let mut layers = vec![
        layer(Array2::zeros((2, 3)), Array1::zeros(3)),
        layer(Array2::zeros((3, 1)), Array1::zeros(1)),
    ];
    let gradients: Vec<LayerGradients> = vec![
        (Array2::ones((2, 3)), Array1::ones(3)),
        (Array2::ones((3, 1)), Array1::ones(1)),
    ];
    let mut optimizer = Adam::default();

    optimizer.step(&mut layers, &gradients, 0.01).unwrap();
    optimizer.step(&mut layers, &gradients, 0.01).unwrap();
    assert_eq!(optimizer.t, 2);
}

#[test]
fn test_adam_rejects_topology_change() {
    let mut optimizer = Adam::default();
    let mut layers = vec![layer(Array2::zeros((2, 2)), Array1::zeros(2))];
    let gradients: Vec<LayerGradients> = vec![(Array2::ones((2, 2)), Array1::ones(2))];
    optimizer.step(&mut layers, &gradients, 0.01).unwrap();

    let mut other = vec![layer(Array2::zeros((3, 2)), Array1::zeros(2))];
    let other_gradients: Vec<LayerGradients> = vec![(Array2::ones((3, 2)), Array1::ones(2))];
    assert!(optimizer.step(&mut other, &other_gradients, 0.01).is_err());
}

#[test]
fn test_step_rejects_gradient_count_mismatch() {
    let mut layers = vec![layer(Array2::zeros((2, 2)), Array1::zeros(2))];
    let mut optimizer = SGD::new();
    assert!(optimizer.step(&mut layers, &[], 0.01).is_err());
}

#[test]
fn test_step_rejects_gradient_shape_mismatch() {
    let mut layers = vec![layer(Array2::zeros((2, 2)), Array1::zeros(2))];
    let gradients: Vec<LayerGradients> = vec![(Array2::ones((2, 3)), Array1::ones(2))];
    let mut optimizer = OptimizerWrapper::from_kind(OptimizerKind::Adam);
    assert!(optimizer.step(&mut layers, &gradients, 0.01).is_err());
}

#[test]
fn test_wrapper_dispatch() {
    assert!(matches!(OptimizerWrapper::from_kind(OptimizerKind::Sgd), OptimizerWrapper::SGD(_)));
    assert!(matches!(OptimizerWrapper::from_kind(OptimizerKind::default()), OptimizerWrapper::Adam(_)));
}
