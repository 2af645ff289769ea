//! Dot product instruction implementation.
//!
//! Represents an instruction that performs a complete dense-layer step:
//! a matrix-vector product, bias addition and an optional activation.

use crate::activation::Activation;
use crate::errors::InstructionModelError;
use crate::instructions::{Instruction, activation_instruction::ActivationInstruction};
use crate::utils::dot::{DotKernel, dot};

/// Dense (matrix-vector) operation followed by bias and activation.
///
/// Weights are kept as one contiguous row-major block of
/// `data_size * input_size` values so each output row is a single slice.
pub struct DotInstruction {
    weights: Vec<f32>,
    bias: Vec<f32>,
    input_ptr: usize,
    input_size: usize,
    output_ptr: usize,
    data_size: usize,
    kernel: DotKernel,
    activation_instruction: Option<ActivationInstruction>,
}

impl DotInstruction {
    /// Creates a new DotInstruction.
    ///
    /// `weights` must hold `data_size` rows of equal length; the row length is the
    /// input size. The input and output regions must not overlap.
    pub fn new(
        input_ptr: usize,
        output_ptr: usize,
        data_size: usize,
        weights: &[Vec<f32>],
        bias: &[f32],
        activation: Option<Activation>,
    ) -> Result<Self, InstructionModelError> {
        if weights.len() != data_size {
            return Err(InstructionModelError::WeightsRowSizeMismatch {
                weights_rows: weights.len(),
                output_size: data_size,
            });
        }
        let input_size = weights.first().map_or(0, Vec::len);
        if input_size == 0 || data_size == 0 {
            return Err(InstructionModelError::InvalidLayerSize);
        }

        let mut flat = Vec::with_capacity(data_size * input_size);
        for row in weights {
            if row.len() != input_size {
                return Err(InstructionModelError::WeightsColumnSizeMismatch {
                    input_index: input_ptr,
                    weights_columns: row.len(),
                    input_size,
                });
            }
            flat.extend_from_slice(row);
        }

        let activation_instruction =
            activation.map(|act| ActivationInstruction::new(act, output_ptr, data_size));

        Ok(Self {
            weights: flat,
            bias: bias.to_vec(),
            input_ptr,
            input_size,
            output_ptr,
            data_size,
            kernel: DotKernel::detect(),
            activation_instruction,
        })
    }

    /// Splits the unified buffer into the (read-only) input region and the
    /// (writable) output region.
    fn regions<'a>(&self, buffer: &'a mut [f32]) -> (&'a [f32], &'a mut [f32]) {
        if self.input_ptr < self.output_ptr {
            let (head, tail) = buffer.split_at_mut(self.output_ptr);
            (
                &head[self.input_ptr..self.input_ptr + self.input_size],
                &mut tail[..self.data_size],
            )
        } else {
            let (head, tail) = buffer.split_at_mut(self.input_ptr);
            (
                &tail[..self.input_size],
                &mut head[self.output_ptr..self.output_ptr + self.data_size],
            )
        }
    }

    #[inline(always)]
    fn apply_forward_pass(&self, unified_computation_buffer: &mut [f32]) {
        let (input, output) = self.regions(unified_computation_buffer);

        for ((weights_row, &bias_value), out) in self
            .weights
            .chunks_exact(self.input_size)
            .zip(self.bias.iter())
            .zip(output.iter_mut())
        {
            *out = bias_value + dot(self.kernel, weights_row, input);
        }
    }
}

impl Instruction for DotInstruction {
    fn apply(&self, unified_computation_buffer: &mut [f32]) -> Result<(), InstructionModelError> {
        let required = (self.input_ptr + self.input_size).max(self.output_ptr + self.data_size);
        if unified_computation_buffer.len() < required {
            return Err(InstructionModelError::ComputationBufferTooSmall {
                buffer_size: unified_computation_buffer.len(),
                required_size: required,
            });
        }

        self.apply_forward_pass(unified_computation_buffer);

        if let Some(ref activation_instruction) = self.activation_instruction {
            activation_instruction.apply(unified_computation_buffer)?;
        }

        Ok(())
    }
}
