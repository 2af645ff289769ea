//! Instruction implementations for dense-network inference.
//!
//! Each instruction reads from and writes to regions of a single unified
//! computation buffer.

use crate::errors::InstructionModelError;
use crate::instruction_model_info::InstructionInfo;

pub mod activation_instruction;
pub mod dot_instruction;

pub use activation_instruction::ActivationInstruction;
pub use dot_instruction::DotInstruction;

/// Base trait for all instruction types.
pub trait Instruction: Send + Sync {
    /// Applies the instruction to the computation buffer.
    fn apply(&self, unified_computation_buffer: &mut [f32]) -> Result<(), InstructionModelError>;
}

/// Creates an instruction from instruction info and model context.
pub fn create_instruction(
    instruction_info: &InstructionInfo,
    computation_buffer_indexes: &[usize],
    computation_buffer_sizes: &[usize],
    weights: &[Vec<Vec<f32>>],
    bias: &[Vec<f32>],
) -> Result<Box<dyn Instruction>, InstructionModelError> {
    match instruction_info {
        InstructionInfo::Dot(info) => {
            if info.input == info.output {
                return Err(InstructionModelError::SameInputOutputIndexes {
                    instruction_type: "DOT".to_string(),
                });
            }

            let weights_matrix = weights
                .get(info.weights)
                .ok_or(InstructionModelError::WeightsIndexOutOfBounds {
                    index: info.weights,
                })?;
            let bias_vector =
                bias.get(info.weights)
                    .ok_or(InstructionModelError::WeightsIndexOutOfBounds {
                        index: info.weights,
                    })?;

            let input_size = computation_buffer_sizes[info.input];
            let output_size = computation_buffer_sizes[info.output];

            if weights_matrix.len() != output_size {
                return Err(InstructionModelError::WeightsRowSizeMismatch {
                    weights_rows: weights_matrix.len(),
                    output_size,
                });
            }
            if bias_vector.len() != output_size {
                return Err(InstructionModelError::BiasOutputSizeMismatch {
                    bias_index: info.weights,
                    output_index: info.output,
                    bias_size: bias_vector.len(),
                    output_size,
                });
            }
            for row in weights_matrix {
                if row.len() != input_size {
                    return Err(InstructionModelError::WeightsColumnSizeMismatch {
                        input_index: info.input,
                        weights_columns: row.len(),
                        input_size,
                    });
                }
            }

            let instruction = DotInstruction::new(
                computation_buffer_indexes[info.input],
                computation_buffer_indexes[info.output],
                output_size,
                weights_matrix,
                bias_vector,
                info.activation,
            )?;
            Ok(Box::new(instruction))
        }
        InstructionInfo::Activation(info) => Ok(Box::new(ActivationInstruction::new(
            info.activation,
            computation_buffer_indexes[info.input],
            computation_buffer_sizes[info.input],
        ))),
    }
}
