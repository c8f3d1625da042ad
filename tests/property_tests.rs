#[cfg(test)]
mod property_tests {
    use kine_dnn::activations::Activation;
    use kine_dnn::data::{split_train_validation, Dataset};
    use kine_dnn::export::OnnxExporter;
    use kine_dnn::export::OnnxImporter;
    use kine_dnn::layers::WeightInit;
    use kine_dnn::network::NeuralNetwork;
    use ndarray::Array2;
    use proptest::prelude::*;

    // Strategy for generating valid layer sizes
    fn layer_sizes_strategy() -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(1usize..=32, 2..=5)
    }

    // Strategy for generating a batch of positions inside a plausible workspace
    fn positions_strategy() -> impl Strategy<Value = Array2<f32>> {
        (1usize..=16).prop_flat_map(|rows| {
            prop::collection::vec(-20.0f32..20.0, rows * 3)
                .prop_map(move |v| Array2::from_shape_vec((rows, 3), v).unwrap())
        })
    }

    fn indexed_dataset(samples: usize) -> Dataset {
        let positions = Array2::from_shape_fn((samples, 3), |(i, _)| i as f32);
        let angles = Array2::from_shape_fn((samples, 3), |(i, _)| -(i as f32));
        Dataset::new(positions, angles).unwrap()
    }

    proptest! {
        #[test]
        fn test_output_shape(layer_sizes in layer_sizes_strategy(), rows in 0usize..8) {
            let activations = vec![Activation::Relu; layer_sizes.len() - 1];
            let network = NeuralNetwork::new(&layer_sizes, &activations, WeightInit::FanInUniform, 0).unwrap();

            let input = Array2::zeros((rows, layer_sizes[0]));
            let output = network.predict(input.view()).unwrap();

            prop_assert_eq!(output.shape(), &[rows, layer_sizes[layer_sizes.len() - 1]]);
        }

        #[test]
        fn test_predict_is_deterministic(positions in positions_strategy(), seed in any::<u64>()) {
            let network = NeuralNetwork::inverse_kinematics(seed);
            let first = network.predict(positions.view()).unwrap();
            let second = network.predict(positions.view()).unwrap();

            prop_assert!(first.iter().all(|v| v.is_finite()));
            prop_assert_eq!(first, second);
        }

        #[test]
        fn test_split_partitions_rows(samples in 2usize..200, fraction in 0.05f64..0.5, seed in any::<u64>()) {
            let dataset = indexed_dataset(samples);
            let split = split_train_validation(&dataset, fraction, seed).unwrap();

            let mut all: Vec<usize> = split.train_indices.iter().chain(&split.validation_indices).copied().collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..samples).collect::<Vec<_>>());
            prop_assert!(!split.train.is_empty());
            prop_assert!(!split.validation.is_empty());

            for (row, &source) in split.train_indices.iter().enumerate() {
                prop_assert_eq!(split.train.positions[[row, 0]], source as f32);
                prop_assert_eq!(split.train.angles[[row, 0]], -(source as f32));
            }
        }

        #[test]
        fn test_split_is_reproducible(samples in 2usize..200, seed in any::<u64>()) {
            let dataset = indexed_dataset(samples);
            let a = split_train_validation(&dataset, 0.2, seed).unwrap();
            let b = split_train_validation(&dataset, 0.2, seed).unwrap();
            prop_assert_eq!(a.validation_indices, b.validation_indices);
            prop_assert_eq!(a.train_indices, b.train_indices);
        }

        #[test]
        fn test_onnx_preserves_predictions(positions in positions_strategy(), seed in 0u64..1000) {
            let network = NeuralNetwork::inverse_kinematics(seed);
            let bytes = OnnxExporter::to_bytes(&network).unwrap();
            let imported = OnnxImporter::from_bytes(&bytes).unwrap();

            let expected = network.predict(positions.view()).unwrap();
            let actual = imported.predict(positions.view()).unwrap();
            prop_assert_eq!(expected, actual);
        }
    }
}
