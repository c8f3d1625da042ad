use std::fs;
use std::path::Path;

use ndarray::{Array1, Array2};
use prost::Message;

use super::proto::{
    AttributeProto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto, ValueInfoProto,
};
use crate::activations::Activation;
use crate::error::{IkError, Result};
use crate::layers::DenseLayer;
use crate::network::NeuralNetwork;

/// Name of the graph's single input tensor.
pub const INPUT_NAME: &str = "input";

/// Name of the graph's single output tensor.
pub const OUTPUT_NAME: &str = "output";

/// Operator set the exported graph targets.
pub const OPSET_VERSION: i64 = 13;

/// ONNX IR version matching [`OPSET_VERSION`].
pub const IR_VERSION: i64 = 7;

const BATCH_DIM: &str = "batch_size";
const GRAPH_NAME: &str = "inverse_kinematics";

/// ONNX export for dense networks.
///
/// Every layer becomes a `Gemm` node (plus a `Relu` node for hidden layers).
/// Parameters are written as initializers, so the graph has no `Constant`
/// nodes left to fold.
pub struct OnnxExporter;

impl OnnxExporter {
    /// Trace `network` and write it to `path` as an ONNX model.
    pub fn export<P: AsRef<Path>>(network: &NeuralNetwork, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = Self::to_bytes(network)?;
        fs::write(path, &bytes)?;
        tracing::info!(
            path = %path.display(),
            bytes = bytes.len(),
            opset = OPSET_VERSION,
            "ONNX graph exported"
        );
        Ok(())
    }

    pub fn to_bytes(network: &NeuralNetwork) -> Result<Vec<u8>> {
        Ok(Self::to_model(network)?.encode_to_vec())
    }

    /// Build the model proto after tracing the network with a zero-valued dummy input.
    pub fn to_model(network: &NeuralNetwork) -> Result<ModelProto> {
        if network.layers.is_empty() {
            return Err(IkError::Export("cannot export a network without layers".to_string()));
        }
        let dummy = Array2::<f32>::zeros((1, network.input_size()));
        let traced = network.predict(dummy.view())?;
        if traced.ncols() != network.output_size() || traced.iter().any(|v| !v.is_finite()) {
            return Err(IkError::Export(
                "tracing with a zero input did not produce a finite output of the expected width".to_string(),
            ));
        }

        let mut graph = GraphProto {
            name: GRAPH_NAME.to_string(),
            input: vec![ValueInfoProto::batched_float(INPUT_NAME, BATCH_DIM, network.input_size())],
            output: vec![ValueInfoProto::batched_float(OUTPUT_NAME, BATCH_DIM, network.output_size())],
            ..Default::default()
        };

        let last = network.layers.len() - 1;
        let mut current = INPUT_NAME.to_string();
        for (i, layer) in network.layers.iter().enumerate() {
            let prefix = format!("fc{}", i + 1);
            let weight_name = format!("{}.weight", prefix);
            let bias_name = format!("{}.bias", prefix);
            let activation_op = layer.activation.onnx_op();

            let gemm_out = match (i == last, activation_op) {
                (true, None) => OUTPUT_NAME.to_string(),
                _ => format!("{}/Gemm_output", prefix),
            };

            graph.initializer.push(TensorProto::float(
                &weight_name,
                &[layer.input_size(), layer.output_size()],
                layer.weights.iter().copied(),
            ));
            graph.initializer.push(TensorProto::float(
                &bias_name,
                &[layer.output_size()],
                layer.biases.iter().copied(),
            ));
            graph.node.push(NodeProto {
                input: vec![current.clone(), weight_name, bias_name],
                output: vec![gemm_out.clone()],
                name: format!("{}/Gemm", prefix),
                op_type: "Gemm".to_string(),
                attribute: vec![
                    AttributeProto::float("alpha", 1.0),
                    AttributeProto::float("beta", 1.0),
                    AttributeProto::int("transA", 0),
                    AttributeProto::int("transB", 0),
                ],
                ..Default::default()
            });
            current = gemm_out;

            if let Some(op) = activation_op {
                let act_out = if i == last {
                    OUTPUT_NAME.to_string()
                } else {
                    format!("{}/{}_output", prefix, op)
                };
                graph.node.push(NodeProto {
                    input: vec![current.clone()],
                    output: vec![act_out.clone()],
                    name: format!("{}/{}", prefix, op),
                    op_type: op.to_string(),
                    ..Default::default()
                });
                current = act_out;
            }

            tracing::debug!(
                layer = i,
                input_size = layer.input_size(),
                output_size = layer.output_size(),
                activation = ?layer.activation,
                "layer exported"
            );
        }

        Ok(ModelProto {
            ir_version: IR_VERSION,
            producer_name: env!("CARGO_PKG_NAME").to_string(),
            producer_version: env!("CARGO_PKG_VERSION").to_string(),
            graph: Some(graph),
            opset_import: vec![OperatorSetIdProto {
                domain: String::new(),
                version: OPSET_VERSION,
            }],
            ..Default::default()
        })
    }
}

/// Reads ONNX files made of `Gemm`/`Relu`/`Identity` chains back into a network.
pub struct OnnxImporter;

impl OnnxImporter {
    pub fn import<P: AsRef<Path>>(path: P) -> Result<NeuralNetwork> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<NeuralNetwork> {
        let model = ModelProto::decode(bytes)?;
        Self::from_model(&model)
    }

    pub fn from_model(model: &ModelProto) -> Result<NeuralNetwork> {
        let graph = model
            .graph
            .as_ref()
            .ok_or_else(|| IkError::Export("model has no graph".to_string()))?;

        let input = single(&graph.input, "input")?;
        let output = single(&graph.output, "output")?;

        let mut layers: Vec<DenseLayer> = Vec::new();
        let mut current = input.name.clone();

        for node in &graph.node {
            let node_input = node
                .input
                .first()
                .ok_or_else(|| IkError::Export(format!("node '{}' has no inputs", node.name)))?;
            if *node_input != current {
                return Err(IkError::Export(format!(
                    "node '{}' reads '{}' but the chain is at '{}'",
                    node.name, node_input, current
                )));
            }

            match node.op_type.as_str() {
                "Gemm" => layers.push(gemm_layer(graph, node)?),
                "Relu" => match layers.last_mut() {
                    Some(layer) if layer.activation == Activation::Linear => {
                        layer.activation = Activation::Relu;
                    }
                    _ => {
                        return Err(IkError::Export(format!(
                            "node '{}' applies Relu without a preceding Gemm",
                            node.name
                        )))
                    }
                },
                "Identity" => {}
                other => {
                    return Err(IkError::Export(format!(
                        "unsupported operator '{}' in node '{}'",
                        other, node.name
                    )))
                }
            }

            current = node
                .output
                .first()
                .cloned()
                .ok_or_else(|| IkError::Export(format!("node '{}' has no outputs", node.name)))?;
        }

        if current != output.name {
            return Err(IkError::Export(format!(
                "graph output '{}' is never produced (chain ends at '{}')",
                output.name, current
            )));
        }

        let network = NeuralNetwork::from_layers(layers)?;
        if let Some(Some(width)) = input.static_dims().get(1) {
            if *width as usize != network.input_size() {
                return Err(IkError::dimension_mismatch(
                    format!("{} input columns", width),
                    format!("{} input columns", network.input_size()),
                ));
            }
        }
        Ok(network)
    }
}

fn single<'a>(values: &'a [ValueInfoProto], what: &str) -> Result<&'a ValueInfoProto> {
    match values {
        [value] => Ok(value),
        _ => Err(IkError::Export(format!(
            "expected exactly one graph {}, found {}",
            what,
            values.len()
        ))),
    }
}

fn gemm_layer(graph: &GraphProto, node: &NodeProto) -> Result<DenseLayer> {
    let float_attr = |name: &str, default: f32| {
        node.attribute.iter().find(|a| a.name == name).map_or(default, |a| a.f)
    };
    let int_attr = |name: &str, default: i64| {
        node.attribute.iter().find(|a| a.name == name).map_or(default, |a| a.i)
    };

    if float_attr("alpha", 1.0) != 1.0 || float_attr("beta", 1.0) != 1.0 || int_attr("transA", 0) != 0 {
        return Err(IkError::Export(format!(
            "node '{}': only Gemm with alpha = beta = 1 and transA = 0 is supported",
            node.name
        )));
    }

    let weights_name = node
        .input
        .get(1)
        .ok_or_else(|| IkError::Export(format!("node '{}' is missing its weight input", node.name)))?;
    let weights = matrix(graph, weights_name)?;
    let weights = if int_attr("transB", 0) != 0 {
        weights.reversed_axes().as_standard_layout().to_owned()
    } else {
        weights
    };

    let biases = match node.input.get(2).filter(|name| !name.is_empty()) {
        Some(name) => vector(graph, name)?,
        None => Array1::zeros(weights.ncols()),
    };

    DenseLayer::try_from_parameters(weights, biases, Activation::Linear)
}

fn initializer<'a>(graph: &'a GraphProto, name: &str) -> Result<&'a TensorProto> {
    graph
        .initializer
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| IkError::Export(format!("initializer '{}' not found", name)))
}

fn tensor_values(tensor: &TensorProto, expected_len: usize) -> Result<Vec<f32>> {
    let values = tensor
        .float_values()
        .ok_or_else(|| IkError::Export(format!("initializer '{}' is not a float tensor", tensor.name)))?;
    if values.len() != expected_len {
        return Err(IkError::Export(format!(
            "initializer '{}' holds {} values, its dims imply {}",
            tensor.name,
            values.len(),
            expected_len
        )));
    }
    Ok(values)
}

fn matrix(graph: &GraphProto, name: &str) -> Result<Array2<f32>> {
    let tensor = initializer(graph, name)?;
    let (rows, cols) = match tensor.dims.as_slice() {
        [rows, cols] => (dim(name, *rows)?, dim(name, *cols)?),
        dims => {
            return Err(IkError::Export(format!(
                "initializer '{}' has dims {:?}, expected a matrix",
                name, dims
            )))
        }
    };
    let len = rows
        .checked_mul(cols)
        .ok_or_else(|| IkError::Export(format!("initializer '{}' dims {} x {} overflow", name, rows, cols)))?;
    let values = tensor_values(tensor, len)?;
    Array2::from_shape_vec((rows, cols), values).map_err(|e| IkError::Export(e.to_string()))
}

fn vector(graph: &GraphProto, name: &str) -> Result<Array1<f32>> {
    let tensor = initializer(graph, name)?;
    let len = match tensor.dims.as_slice() {
        [len] => dim(name, *len)?,
        dims => {
            return Err(IkError::Export(format!(
                "initializer '{}' has dims {:?}, expected a vector",
                name, dims
            )))
        }
    };
    Ok(Array1::from_vec(tensor_values(tensor, len)?))
}

fn dim(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| IkError::Export(format!("initializer '{}' has invalid dimension {}", name, value)))
}
