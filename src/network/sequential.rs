//! Sequential stack of dense layers.
//!
//! `SequentialConfig` describes the stack, `Sequential` holds the
//! initialised weights and knows how to compile itself into an
//! `InstructionModel` and how to print a layer summary.

use std::fmt;

use log::debug;
use rand::Rng;

use crate::activation::Activation;
use crate::errors::{NetworkError, NetworkResult};
use crate::instruction_model::{InstructionModel, MAX_COMPUTATION_BUFFER_SIZE, MAX_WEIGHT_SIZE};
use crate::instruction_model_info::{DotInstructionInfo, InstructionInfo, InstructionModelInfo};
use crate::network::initializers::glorot_uniform;

const SUMMARY_WIDTH: usize = 65;

/// Configuration for a Dense layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseConfig {
    /// Number of input features.
    pub input_size: usize,
    /// Number of output features.
    pub units: usize,
    pub activation: Activation,
}

/// Configuration for building a `Sequential` network.
#[derive(Debug, Clone)]
pub struct SequentialConfig {
    input_size: usize,
    layer_configs: Vec<DenseConfig>,
}

impl SequentialConfig {
    /// Starts a network whose input holds `input_size` values.
    pub fn with_input_size(input_size: usize) -> Self {
        Self {
            input_size,
            layer_configs: Vec::new(),
        }
    }

    /// Adds a dense layer fed by the previous layer (or the input).
    pub fn dense(mut self, units: usize, activation: Activation) -> Self {
        let input_size = self
            .layer_configs
            .last()
            .map_or(self.input_size, |layer| layer.units);

        self.layer_configs.push(DenseConfig {
            input_size,
            units,
            activation,
        });
        self
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn layer_configs(&self) -> &[DenseConfig] {
        &self.layer_configs
    }

    /// Weights plus biases of every layer, `None` on overflow.
    pub fn param_count(&self) -> Option<usize> {
        self.layer_configs.iter().try_fold(0usize, |total, layer| -> Option<usize> {
            layer
                .input_size
                .checked_mul(layer.units)?
                .checked_add(layer.units)?
                .checked_add(total)
        })
    }

    /// Length of the unified computation buffer of the compiled network.
    pub fn computation_buffer_size(&self) -> Option<usize> {
        self.layer_configs
            .iter()
            .try_fold(self.input_size, |total, layer| total.checked_add(layer.units))
    }

    /// Initialises every layer: Glorot-uniform kernels and zero biases.
    pub fn build<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> NetworkResult<Sequential> {
        if self.input_size == 0 {
            return Err(NetworkError::InvalidInputSize);
        }
        if self.layer_configs.is_empty() {
            return Err(NetworkError::NoLayers);
        }
        if let Some(index) = self.layer_configs.iter().position(|layer| layer.units == 0) {
            return Err(NetworkError::InvalidLayerWidth { index });
        }
        check_engine_limits(self.param_count(), self.computation_buffer_size())?;

        let layers = self
            .layer_configs
            .iter()
            .enumerate()
            .map(|(index, config)| DenseLayer {
                name: layer_name(index),
                input_size: config.input_size,
                units: config.units,
                activation: config.activation,
                kernel: glorot_uniform(config.input_size, config.units, rng),
                bias: vec![0.0; config.units],
            })
            .collect();

        let network = Sequential {
            name: name.to_string(),
            input_size: self.input_size,
            layers,
        };
        debug!(
            "Built network '{}' with {} dense layers and {} parameters",
            network.name,
            network.layers.len(),
            network.param_count()
        );
        Ok(network)
    }
}

/// Rejects sizes the instruction model would refuse, before any weight is allocated.
pub(crate) fn check_engine_limits(
    param_count: Option<usize>,
    computation_buffer_size: Option<usize>,
) -> NetworkResult<()> {
    if !param_count.is_some_and(|count| count <= MAX_WEIGHT_SIZE) {
        return Err(NetworkError::TooManyParameters {
            max: MAX_WEIGHT_SIZE,
        });
    }
    if !computation_buffer_size.is_some_and(|size| size <= MAX_COMPUTATION_BUFFER_SIZE) {
        return Err(NetworkError::ComputationBufferTooLarge {
            max: MAX_COMPUTATION_BUFFER_SIZE,
        });
    }
    Ok(())
}

/// `dense`, `dense_1`, `dense_2`, ...
fn layer_name(index: usize) -> String {
    if index == 0 {
        "dense".to_string()
    } else {
        format!("dense_{}", index)
    }
}

/// A dense (fully connected) layer: `activation(kernel * input + bias)`.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    name: String,
    input_size: usize,
    units: usize,
    activation: Activation,
    /// One row per unit, each `input_size` long.
    kernel: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl DenseLayer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn kernel(&self) -> &[Vec<f32>] {
        &self.kernel
    }

    pub fn bias(&self) -> &[f32] {
        &self.bias
    }

    pub fn param_count(&self) -> usize {
        self.input_size * self.units + self.units
    }
}

/// An initialised stack of dense layers.
#[derive(Debug, Clone)]
pub struct Sequential {
    name: String,
    input_size: usize,
    layers: Vec<DenseLayer>,
}

impl Sequential {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(self.input_size, DenseLayer::units)
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn param_count(&self) -> usize {
        self.layers.iter().map(DenseLayer::param_count).sum()
    }

    /// Describes the network as instruction model data: buffer 0 is the input
    /// and layer `i` writes buffer `i + 1` through one DOT instruction.
    pub fn to_instruction_model_info(&self) -> InstructionModelInfo {
        let mut computation_buffer_sizes = Vec::with_capacity(self.layers.len() + 1);
        computation_buffer_sizes.push(self.input_size);
        computation_buffer_sizes.extend(self.layers.iter().map(DenseLayer::units));

        let instructions = (0..self.layers.len())
            .map(|i| {
                InstructionInfo::Dot(DotInstructionInfo {
                    input: i,
                    output: i + 1,
                    weights: i,
                    activation: Some(self.layers[i].activation),
                })
            })
            .collect();

        InstructionModelInfo {
            feature_size: self.input_size,
            computation_buffer_sizes,
            instructions,
            weights: self.layers.iter().map(|l| l.kernel.clone()).collect(),
            bias: self.layers.iter().map(|l| l.bias.clone()).collect(),
            validation_data: None,
        }
    }

    /// Compiles the network into an executable instruction model.
    pub fn compile(&self) -> NetworkResult<InstructionModel> {
        Ok(InstructionModel::new(self.to_instruction_model_info())?)
    }

    /// Layer table with output shapes and parameter counts.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Sequential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model: \"{}\"", self.name)?;
        writeln!(f, "{}", "_".repeat(SUMMARY_WIDTH))?;
        writeln!(
            f,
            " {:<28} {:<24} {:>10}",
            "Layer (type)", "Output Shape", "Param #"
        )?;
        writeln!(f, "{}", "=".repeat(SUMMARY_WIDTH))?;
        writeln!(
            f,
            " {:<28} {:<24} {:>10}",
            "input_layer (InputLayer)",
            format!("(None, {})", self.input_size),
            0
        )?;
        for layer in &self.layers {
            writeln!(
                f,
                " {:<28} {:<24} {:>10}",
                format!("{} (Dense)", layer.name),
                format!("(None, {})", layer.units),
                group_thousands(layer.param_count())
            )?;
        }
        writeln!(f, "{}", "=".repeat(SUMMARY_WIDTH))?;

        let total = self.param_count();
        let bytes = total * std::mem::size_of::<f32>();
        writeln!(
            f,
            " Total params: {} ({})",
            group_thousands(total),
            readable_size(bytes)
        )?;
        writeln!(
            f,
            " Trainable params: {} ({})",
            group_thousands(total),
            readable_size(bytes)
        )?;
        writeln!(f, " Non-trainable params: 0 ({})", readable_size(0))?;
        write!(f, "{}", "_".repeat(SUMMARY_WIDTH))
    }
}

/// `1234567` -> `1,234,567`.
pub(crate) fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Byte count with a binary unit and two decimals, e.g. `2.42 KB`.
pub(crate) fn readable_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}
