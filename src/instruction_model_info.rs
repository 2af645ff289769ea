//! Data structures describing an instruction model.
//!
//! An `InstructionModelInfo` lists the computation buffers, the instructions
//! that move data between them and the weights those instructions use. A
//! compiled dense network is just one DOT instruction per layer.

use crate::activation::Activation;
use serde::{Deserialize, Serialize};

/// Validation data checked when the model is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationData {
    /// List of input data where each item is a list of feature values.
    pub inputs: Vec<Vec<f32>>,
    /// List of expected outputs corresponding to the input data.
    pub expected_outputs: Vec<Vec<f32>>,
}

/// Information required to configure a model instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstructionInfo {
    #[serde(rename = "DOT")]
    Dot(DotInstructionInfo),
    #[serde(rename = "ACTIVATION")]
    Activation(ActivationInstructionInfo),
}

impl InstructionInfo {
    /// Returns the list of input buffer indices required for this instruction.
    pub fn get_inputs(&self) -> Vec<usize> {
        match self {
            InstructionInfo::Dot(info) => vec![info.input],
            InstructionInfo::Activation(info) => vec![info.input],
        }
    }

    /// Returns the output buffer index for this instruction.
    /// Activations run in place, so their output is their input.
    pub fn output(&self) -> usize {
        match self {
            InstructionInfo::Dot(info) => info.output,
            InstructionInfo::Activation(info) => info.input,
        }
    }
}

/// Represents a dense (dot product + bias) operation instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotInstructionInfo {
    /// Input index of the target buffer.
    pub input: usize,
    /// Output index of the target buffer.
    pub output: usize,
    /// Weights index targeting the weights of a given layer.
    pub weights: usize,
    /// Activation function (may be null).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<Activation>,
}

/// Represents a single activation function operation instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationInstructionInfo {
    /// Input index of the target buffer. Same as the output because it operates in place.
    pub input: usize,
    pub activation: Activation,
}

/// Full description of an instruction model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructionModelInfo {
    /// Number of input values; must exactly fill the leading buffer(s).
    pub feature_size: usize,
    /// Size of each computation buffer. Buffer 0 holds the input.
    pub computation_buffer_sizes: Vec<usize>,
    pub instructions: Vec<InstructionInfo>,
    /// `weights[set][row][column]`, one row per output value.
    pub weights: Vec<Vec<Vec<f32>>>,
    pub bias: Vec<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_data: Option<ValidationData>,
}

impl InstructionModelInfo {
    /// Total number of weight and bias values held by the model.
    pub fn parameter_count(&self) -> usize {
        let weights: usize = self
            .weights
            .iter()
            .flat_map(|matrix| matrix.iter())
            .map(Vec::len)
            .sum();
        let bias: usize = self.bias.iter().map(Vec::len).sum();
        weights + bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_json_shape() {
        let info = InstructionInfo::Dot(DotInstructionInfo {
            input: 0,
            output: 1,
            weights: 0,
            activation: Some(Activation::Tanh),
        });
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "DOT");
        assert_eq!(json["activation"], "TANH");
    }

    #[test]
    fn test_activation_instruction_is_in_place() {
        let info = InstructionInfo::Activation(ActivationInstructionInfo {
            input: 2,
            activation: Activation::Relu,
        });
        assert_eq!(info.get_inputs(), vec![2]);
        assert_eq!(info.output(), 2);
    }

    #[test]
    fn test_parameter_count() {
        let info = InstructionModelInfo {
            feature_size: 2,
            computation_buffer_sizes: vec![2, 3],
            instructions: vec![],
            weights: vec![vec![vec![0.0; 2]; 3]],
            bias: vec![vec![0.0; 3]],
            validation_data: None,
        };
        assert_eq!(info.parameter_count(), 9);
    }
}
