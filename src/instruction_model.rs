//! Core instruction model for neural network inference.
//!
//! An `InstructionModel` owns a validated list of instructions and the
//! layout of the unified computation buffer they run over. It is the
//! inference call the benchmarks time.

use log::debug;

use crate::errors::{InstructionModelError, Result};
use crate::instruction_model_info::{InstructionInfo, InstructionModelInfo};
use crate::instructions::{Instruction, create_instruction};

/// Maximum computation buffer size.
pub const MAX_COMPUTATION_BUFFER_SIZE: usize = 1_000_000;

/// Maximum weight size.
pub const MAX_WEIGHT_SIZE: usize = 10_000_000;

/// Tolerance used when checking `validation_data` on creation.
const VALIDATION_DELTA: f32 = 1e-5;

/// A model compiled into a sequence of instructions over one computation buffer.
///
/// The buffer layout is the concatenation of all computation buffers; the
/// input occupies the first `feature_size` values and the output the last
/// buffer.
pub struct InstructionModel {
    instructions: Vec<Box<dyn Instruction>>,
    feature_size: usize,
    computation_buffer_sizes: Vec<usize>,
    computation_buffer_indexes: Vec<usize>,
    output_index_start: usize,
    output_index_end: usize,
}

impl std::fmt::Debug for InstructionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstructionModel")
            .field("instructions", &self.instructions.len())
            .field("feature_size", &self.feature_size)
            .field("computation_buffer_sizes", &self.computation_buffer_sizes)
            .finish()
    }
}

impl InstructionModel {
    /// Creates a new InstructionModel from InstructionModelInfo.
    pub fn new(instruction_model_info: InstructionModelInfo) -> Result<Self> {
        Self::validate_inputs(&instruction_model_info)?;

        let computation_buffer_sizes = instruction_model_info.computation_buffer_sizes.clone();
        let feature_size = instruction_model_info.feature_size;

        let (computation_buffer_indexes, output_index_end) =
            Self::calculate_computation_buffer_indexes(&computation_buffer_sizes)?;
        let output_index_start =
            output_index_end - computation_buffer_sizes[computation_buffer_sizes.len() - 1];

        Self::validate_required_memory(output_index_end)?;

        let instructions = Self::validate_and_create_instructions(
            &instruction_model_info,
            &computation_buffer_indexes,
            &computation_buffer_sizes,
        )?;

        let model = InstructionModel {
            instructions,
            feature_size,
            computation_buffer_sizes,
            computation_buffer_indexes,
            output_index_start,
            output_index_end,
        };

        if let Some(validation_data) = &instruction_model_info.validation_data {
            model.validate_model(
                &validation_data.inputs,
                &validation_data.expected_outputs,
                VALIDATION_DELTA,
            )?;
        }

        debug!(
            "Created instruction model: {} instructions, {} floats of working memory",
            model.instructions.len(),
            model.output_index_end
        );

        Ok(model)
    }

    /// Validates that the feature size exactly fills one or more complete leading buffers.
    fn validate_feature_size(feature_size: usize, buffer_sizes: &[usize]) -> Result<()> {
        if feature_size == 0 {
            return Err(InstructionModelError::InvalidInputLayerSize);
        }

        let mut accumulated = 0;
        let mut accumulated_capacities = Vec::new();

        for &capacity in buffer_sizes {
            accumulated += capacity;
            accumulated_capacities.push(accumulated);
            if accumulated == feature_size {
                return Ok(());
            } else if accumulated > feature_size {
                break;
            }
        }

        Err(InstructionModelError::InvalidFeatureSize {
            expected: feature_size,
            actual: accumulated,
            capacities: accumulated_capacities,
        })
    }

    /// Performs basic initial validation of the inputs of the model.
    fn validate_inputs(instruction_model_info: &InstructionModelInfo) -> Result<()> {
        if instruction_model_info.computation_buffer_sizes.is_empty() {
            return Err(InstructionModelError::NoLayersProvided);
        }

        if instruction_model_info.bias.len() != instruction_model_info.weights.len() {
            return Err(InstructionModelError::BiasWeightsMismatch);
        }

        if instruction_model_info.instructions.is_empty() {
            return Err(InstructionModelError::NoInstructionsProvided);
        }

        if instruction_model_info.bias.len() > instruction_model_info.instructions.len() {
            return Err(InstructionModelError::TooManyWeightsForInstructions);
        }

        for (i, (bias_vec, weights_matrix)) in instruction_model_info
            .bias
            .iter()
            .zip(instruction_model_info.weights.iter())
            .enumerate()
        {
            if bias_vec.len() != weights_matrix.len() {
                return Err(InstructionModelError::BiasWeightsSizeMismatch {
                    index: i,
                    bias_size: bias_vec.len(),
                    weights_size: weights_matrix.len(),
                });
            }
        }

        let calculated_size = instruction_model_info.parameter_count();
        if calculated_size > MAX_WEIGHT_SIZE {
            return Err(InstructionModelError::WeightSizeExceedsLimit {
                actual: calculated_size,
                max: MAX_WEIGHT_SIZE,
            });
        }

        Self::validate_feature_size(
            instruction_model_info.feature_size,
            &instruction_model_info.computation_buffer_sizes,
        )?;

        if let Some(validation_data) = &instruction_model_info.validation_data {
            if validation_data.inputs.len() != validation_data.expected_outputs.len() {
                return Err(InstructionModelError::ValidationInputOutputMismatch);
            }
        }

        Ok(())
    }

    /// Validate if the model required memory is within the maximum allowed.
    fn validate_required_memory(output_index_end: usize) -> Result<()> {
        if output_index_end > MAX_COMPUTATION_BUFFER_SIZE {
            return Err(InstructionModelError::ComputationBufferSizeExceedsLimit {
                actual: output_index_end,
                max: MAX_COMPUTATION_BUFFER_SIZE,
            });
        }
        Ok(())
    }

    /// Returns the start offset of every buffer and the total buffer length.
    fn calculate_computation_buffer_indexes(
        computation_buffer_sizes: &[usize],
    ) -> Result<(Vec<usize>, usize)> {
        let mut computation_buffer_indexes = Vec::with_capacity(computation_buffer_sizes.len());
        let mut index = 0;

        for (i, &size) in computation_buffer_sizes.iter().enumerate() {
            if size == 0 && i > 0 {
                return Err(InstructionModelError::InvalidLayerSize);
            }
            computation_buffer_indexes.push(index);
            index += size;
        }

        Ok((computation_buffer_indexes, index))
    }

    fn validate_and_create_instructions(
        instruction_model_info: &InstructionModelInfo,
        computation_buffer_indexes: &[usize],
        computation_buffer_sizes: &[usize],
    ) -> Result<Vec<Box<dyn Instruction>>> {
        let weights = &instruction_model_info.weights;
        let bias = &instruction_model_info.bias;

        let mut instructions = Vec::with_capacity(instruction_model_info.instructions.len());
        let mut used_weights = vec![false; weights.len()];

        for instruction_info in &instruction_model_info.instructions {
            for &input_index in &instruction_info.get_inputs() {
                Self::validate_buffer_index("input", input_index, computation_buffer_sizes.len())?;
            }
            Self::validate_buffer_index(
                "output",
                instruction_info.output(),
                computation_buffer_sizes.len(),
            )?;

            let instruction = create_instruction(
                instruction_info,
                computation_buffer_indexes,
                computation_buffer_sizes,
                weights,
                bias,
            )?;

            if let InstructionInfo::Dot(info) = instruction_info {
                used_weights[info.weights] = true;
            }

            instructions.push(instruction);
        }

        if let Some(index) = used_weights.iter().position(|&used| !used) {
            return Err(InstructionModelError::UnusedWeights { index });
        }

        Ok(instructions)
    }

    fn validate_buffer_index(label: &str, buffer_index: usize, max_size: usize) -> Result<()> {
        if buffer_index >= max_size {
            return Err(InstructionModelError::BufferIndexOutOfBounds {
                label: label.to_string(),
                index: buffer_index,
            });
        }
        Ok(())
    }

    /// Runs inference on every input and compares the result with the expected output.
    pub fn validate_model(
        &self,
        inputs: &[Vec<f32>],
        outputs: &[Vec<f32>],
        delta: f32,
    ) -> Result<()> {
        if inputs.len() != outputs.len() {
            return Err(InstructionModelError::InputOutputCountMismatch);
        }

        let mut temporary_buffer = vec![0.0f32; self.output_index_end];
        let last_layer_size = self.get_output_size();

        for (i, (input, expected_output)) in inputs.iter().zip(outputs.iter()).enumerate() {
            if input.len() != self.feature_size {
                return Err(InstructionModelError::ValidationInputSizeMismatch {
                    provided: input.len(),
                    expected: self.feature_size,
                });
            }
            if expected_output.len() != last_layer_size {
                return Err(InstructionModelError::ValidationOutputSizeMismatch {
                    index: i,
                    provided: expected_output.len(),
                    expected: last_layer_size,
                });
            }

            temporary_buffer[..self.feature_size].copy_from_slice(input);
            self.predict_with_buffer(&mut temporary_buffer)?;

            let computed = &temporary_buffer[self.output_index_start..self.output_index_end];
            let mismatch = expected_output
                .iter()
                .zip(computed)
                .any(|(expected, actual)| (expected - actual).abs() > delta);
            if mismatch {
                return Err(InstructionModelError::ValidationMismatch {
                    case_number: i,
                    inputs: input.clone(),
                    expected: expected_output.clone(),
                    computed: computed.to_vec(),
                });
            }
        }

        Ok(())
    }

    /// Returns the required memory size.
    pub fn required_memory(&self) -> usize {
        self.output_index_end
    }

    /// Runs every instruction over a caller-owned buffer. The input must
    /// already sit in the first `feature_size` values.
    #[inline]
    pub fn predict_with_buffer(&self, unified_computation_buffer: &mut [f32]) -> Result<()> {
        if unified_computation_buffer.len() < self.output_index_end {
            return Err(InstructionModelError::ComputationBufferTooSmall {
                buffer_size: unified_computation_buffer.len(),
                required_size: self.output_index_end,
            });
        }

        for instruction in &self.instructions {
            instruction.apply(unified_computation_buffer)?;
        }

        Ok(())
    }

    /// Predicts output, allocating a new computation buffer.
    pub fn predict(&self, input: &[f32]) -> Result<Vec<f32>> {
        if input.len() != self.feature_size {
            return Err(InstructionModelError::ValidationInputSizeMismatch {
                provided: input.len(),
                expected: self.feature_size,
            });
        }

        let mut unified_computation_buffer = vec![0.0f32; self.output_index_end];
        unified_computation_buffer[..self.feature_size].copy_from_slice(input);

        self.predict_with_buffer(&mut unified_computation_buffer)?;

        Ok(unified_computation_buffer[self.output_index_start..self.output_index_end].to_vec())
    }

    /// Returns the output region of a buffer previously passed to `predict_with_buffer`.
    pub fn output_slice<'a>(&self, unified_computation_buffer: &'a [f32]) -> &'a [f32] {
        &unified_computation_buffer[self.output_index_start..self.output_index_end]
    }

    /// Returns the size of the input layer.
    pub fn get_feature_size(&self) -> usize {
        self.feature_size
    }

    /// Returns the size of the output layer.
    pub fn get_output_size(&self) -> usize {
        self.output_index_end - self.output_index_start
    }

    /// Returns the start index of the output layer in the computation buffer.
    pub fn get_output_index_start(&self) -> usize {
        self.output_index_start
    }

    pub fn get_computation_buffer_sizes(&self) -> &[usize] {
        &self.computation_buffer_sizes
    }

    pub fn get_computation_buffer_indexes(&self) -> &[usize] {
        &self.computation_buffer_indexes
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::Activation;
    use crate::instruction_model_info::{DotInstructionInfo, ValidationData};

    fn dot(input: usize, output: usize, weights: usize) -> InstructionInfo {
        InstructionInfo::Dot(DotInstructionInfo {
            input,
            output,
            weights,
            activation: None,
        })
    }

    fn single_layer_info() -> InstructionModelInfo {
        InstructionModelInfo {
            feature_size: 2,
            computation_buffer_sizes: vec![2, 1],
            instructions: vec![dot(0, 1, 0)],
            weights: vec![vec![vec![2.0, 0.5]]],
            bias: vec![vec![0.25]],
            validation_data: None,
        }
    }

    #[test]
    fn test_invalid_feature_size() {
        let result = InstructionModel::validate_feature_size(5, &[2, 2]);
        assert!(matches!(
            result,
            Err(InstructionModelError::InvalidFeatureSize {
                expected: 5,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_feature_size() {
        let result = InstructionModel::validate_feature_size(0, &[2, 2]);
        assert!(matches!(
            result,
            Err(InstructionModelError::InvalidInputLayerSize)
        ));
    }

    #[test]
    fn test_no_layers_provided() {
        let mut info = single_layer_info();
        info.computation_buffer_sizes = vec![];
        assert!(matches!(
            InstructionModel::validate_inputs(&info),
            Err(InstructionModelError::NoLayersProvided)
        ));
    }

    #[test]
    fn test_no_instructions_provided() {
        let mut info = single_layer_info();
        info.instructions = vec![];
        info.weights = vec![];
        info.bias = vec![];
        assert!(matches!(
            InstructionModel::validate_inputs(&info),
            Err(InstructionModelError::NoInstructionsProvided)
        ));
    }

    #[test]
    fn test_bias_weights_mismatch() {
        let mut info = single_layer_info();
        info.bias = vec![];
        assert!(matches!(
            InstructionModel::validate_inputs(&info),
            Err(InstructionModelError::BiasWeightsMismatch)
        ));
    }

    #[test]
    fn test_too_many_weights_for_instructions() {
        let mut info = single_layer_info();
        info.weights.push(vec![vec![1.0, 1.0]]);
        info.bias.push(vec![0.0]);
        assert!(matches!(
            InstructionModel::validate_inputs(&info),
            Err(InstructionModelError::TooManyWeightsForInstructions)
        ));
    }

    #[test]
    fn test_bias_weights_size_mismatch() {
        let mut info = single_layer_info();
        info.bias = vec![vec![0.25, 0.5]];
        assert!(matches!(
            InstructionModel::validate_inputs(&info),
            Err(InstructionModelError::BiasWeightsSizeMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_validation_input_output_mismatch() {
        let mut info = single_layer_info();
        info.validation_data = Some(ValidationData {
            inputs: vec![vec![1.0, 1.0]],
            expected_outputs: vec![],
        });
        assert!(matches!(
            InstructionModel::validate_inputs(&info),
            Err(InstructionModelError::ValidationInputOutputMismatch)
        ));
    }

    #[test]
    fn test_invalid_layer_size() {
        let result = InstructionModel::calculate_computation_buffer_indexes(&[1, 0]);
        assert!(matches!(
            result,
            Err(InstructionModelError::InvalidLayerSize)
        ));
    }

    #[test]
    fn test_buffer_indexes() {
        let (indexes, end) =
            InstructionModel::calculate_computation_buffer_indexes(&[1, 315, 315, 10]).unwrap();
        assert_eq!(indexes, vec![0, 1, 316, 631]);
        assert_eq!(end, 641);
    }

    #[test]
    fn test_buffer_index_out_of_bounds() {
        let result = InstructionModel::validate_buffer_index("test", 5, 3);
        assert!(matches!(
            result,
            Err(InstructionModelError::BufferIndexOutOfBounds { label, index: 5 }) if label == "test"
        ));
    }

    #[test]
    fn test_predict_single_layer() {
        let model = InstructionModel::new(single_layer_info()).unwrap();
        let output = model.predict(&[1.0, -1.0]).unwrap();
        assert!((output[0] - 1.75).abs() < 0.00005);
    }

    #[test]
    fn test_computation_buffer_too_small() {
        let model = InstructionModel::new(single_layer_info()).unwrap();
        let mut small_buffer = vec![0.0; 2];
        assert!(matches!(
            model.predict_with_buffer(&mut small_buffer),
            Err(InstructionModelError::ComputationBufferTooSmall {
                buffer_size: 2,
                required_size: 3
            })
        ));
    }

    #[test]
    fn test_predict_input_size_mismatch() {
        let model = InstructionModel::new(single_layer_info()).unwrap();
        assert!(matches!(
            model.predict(&[1.0]),
            Err(InstructionModelError::ValidationInputSizeMismatch {
                provided: 1,
                expected: 2
            })
        ));
    }

    #[test]
    fn test_validation_output_size_mismatch() {
        let model = InstructionModel::new(single_layer_info()).unwrap();
        let result = model.validate_model(&[vec![1.0, 1.0]], &[vec![1.0, 2.0]], 1e-5);
        assert!(matches!(
            result,
            Err(InstructionModelError::ValidationOutputSizeMismatch {
                index: 0,
                provided: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn test_validation_data_checked_on_creation() {
        let mut info = single_layer_info();
        info.validation_data = Some(ValidationData {
            inputs: vec![vec![1.0, -1.0]],
            expected_outputs: vec![vec![9.0]],
        });
        assert!(matches!(
            InstructionModel::new(info),
            Err(InstructionModelError::ValidationMismatch { case_number: 0, .. })
        ));
    }

    #[test]
    fn test_unused_weights() {
        let mut info = single_layer_info();
        info.computation_buffer_sizes = vec![2, 1, 1];
        info.instructions.push(InstructionInfo::Activation(
            crate::instruction_model_info::ActivationInstructionInfo {
                input: 1,
                activation: Activation::Tanh,
            },
        ));
        info.weights.push(vec![vec![1.0]]);
        info.bias.push(vec![0.0]);
        assert!(matches!(
            InstructionModel::new(info),
            Err(InstructionModelError::UnusedWeights { index: 1 })
        ));
    }
}
