/// A macro to create a seeded `NeuralNetwork` from `(input, output, activation)` triples.
///
/// # Examples
///
/// ```
/// use kine_dnn::activations::Activation;
/// use kine_dnn::dense_network;
///
/// let network = dense_network!(seed = 7;
///     (3, 16, Activation::Relu),
///     (16, 3, Activation::Linear)
/// ).unwrap();
/// assert_eq!(network.parameter_count(), 3 * 16 + 16 + 16 * 3 + 3);
/// ```
///
/// Consecutive widths must chain; a mismatch comes back as an `Err`.
#[macro_export]
macro_rules! dense_network {
    (seed = $seed:expr; $( ($input_size:expr, $output_size:expr, $activation:expr) ),+ $(,)? ) => {{
        let mut rng = $crate::layers::initialization::seeded_rng($seed);
        let layers = vec![$(
            $crate::layers::DenseLayer::new(
                $input_size,
                $output_size,
                $activation,
                $crate::layers::WeightInit::FanInUniform,
                &mut rng,
            )
        ),+];
        $crate::network::NeuralNetwork::from_layers(layers)
    }};
}
