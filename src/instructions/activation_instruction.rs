//! Activation instruction implementation.

use crate::activation::Activation;
use crate::errors::InstructionModelError;
use crate::instructions::Instruction;

/// Represents an instruction that applies an activation function to values in place.
pub struct ActivationInstruction {
    activation: Activation,
    output_ptr: usize,
    data_size: usize,
}

impl ActivationInstruction {
    pub fn new(activation: Activation, output_ptr: usize, data_size: usize) -> Self {
        Self {
            activation,
            output_ptr,
            data_size,
        }
    }
}

impl Instruction for ActivationInstruction {
    fn apply(&self, unified_computation_buffer: &mut [f32]) -> Result<(), InstructionModelError> {
        let end = self.output_ptr + self.data_size;
        if unified_computation_buffer.len() < end {
            return Err(InstructionModelError::ComputationBufferTooSmall {
                buffer_size: unified_computation_buffer.len(),
                required_size: end,
            });
        }
        self.activation
            .apply_in_place(&mut unified_computation_buffer[self.output_ptr..end]);
        Ok(())
    }
}
