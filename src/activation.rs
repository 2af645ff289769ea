//! Activation functions applied by dense layers.
//!
//! Dense layers in the benchmarked networks default to `Tanh`; the other
//! variants exist so a configuration can swap the hidden or output
//! activation without touching the layer construction code.

use serde::{Deserialize, Serialize};

/// Represents the type of activation function to be applied after a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Activation {
    /// Rectified Linear Unit activation function: f(x) = max(0, x).
    Relu,
    /// Sigmoid activation function: f(x) = 1 / (1 + exp(-x)).
    Sigmoid,
    /// Hyperbolic tangent activation function: f(x) = tanh(x).
    #[default]
    Tanh,
    /// Softmax activation function:
    ///
    /// ```text
    /// Softmax(x_i) = exp(x_i - max(x)) / sum_j exp(x_j - max(x))
    /// ```
    ///
    /// Subtracting the maximum keeps the exponentials from overflowing.
    Softmax,
    /// Identity: f(x) = x.
    Linear,
}

impl Activation {
    /// Get activation by string name, case-insensitive.
    pub fn get_by_name(type_name: &str) -> Option<Self> {
        match type_name.to_ascii_uppercase().as_str() {
            "RELU" => Some(Activation::Relu),
            "SIGMOID" => Some(Activation::Sigmoid),
            "TANH" => Some(Activation::Tanh),
            "SOFTMAX" => Some(Activation::Softmax),
            "LINEAR" => Some(Activation::Linear),
            _ => None,
        }
    }

    /// Apply the activation function to a single value.
    pub fn apply_single(self, x: f32) -> f32 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
            Activation::Linear => x,
            // Only meaningful over a vector; a lone value is left unnormalized.
            Activation::Softmax => x.exp(),
        }
    }

    /// Apply the activation function to a slice of values in place.
    pub fn apply_in_place(self, values: &mut [f32]) {
        match self {
            Activation::Linear => {}
            Activation::Softmax => {
                let max_val = values.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
                let mut sum = 0.0f32;

                for val in values.iter_mut() {
                    *val = (*val - max_val).exp();
                    sum += *val;
                }

                for val in values.iter_mut() {
                    *val /= sum;
                }
            }
            _ => {
                for val in values.iter_mut() {
                    *val = self.apply_single(*val);
                }
            }
        }
    }
}
