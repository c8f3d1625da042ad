//! # Activation Functions
//!
//! The inverse-kinematics regressor only needs two activations:
//!
//! - **ReLU**: `max(0, x)`, applied after every hidden layer
//! - **Linear**: identity, used on the output layer so joint angles are unbounded
//!
//! ```rust
//! use kine_dnn::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
