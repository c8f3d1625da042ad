//! Persisting trained networks.
//!
//! - [`checkpoint`]: bincode parameter snapshots, the training-side artifact
//! - [`onnx`]: a portable ONNX graph for inference runtimes
//! - [`proto`]: the ONNX protobuf messages the graph is encoded with

pub mod checkpoint;
pub mod onnx;
pub mod proto;

pub use checkpoint::{Checkpoint, LayerState, CHECKPOINT_FORMAT_VERSION};
pub use onnx::{OnnxExporter, OnnxImporter, INPUT_NAME, OPSET_VERSION, OUTPUT_NAME};
