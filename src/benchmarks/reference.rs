//! Straightforward forward pass used to cross-check the instruction model.

use crate::activation::Activation;
use crate::network::Sequential;

struct ReferenceLayer {
    kernel: Vec<Vec<f32>>,
    bias: Vec<f32>,
    activation: Activation,
}

/// Copy of a network's parameters evaluated with plain nested loops.
pub struct ReferenceNetwork {
    input_size: usize,
    layers: Vec<ReferenceLayer>,
}

impl From<&Sequential> for ReferenceNetwork {
    fn from(network: &Sequential) -> Self {
        Self {
            input_size: network.input_size(),
            layers: network
                .layers()
                .iter()
                .map(|layer| ReferenceLayer {
                    kernel: layer.kernel().to_vec(),
                    bias: layer.bias().to_vec(),
                    activation: layer.activation(),
                })
                .collect(),
        }
    }
}

impl ReferenceNetwork {
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Evaluates every layer in turn; `input` must hold `input_size` values.
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        let mut activations = input.to_vec();
        for layer in &self.layers {
            let mut output: Vec<f32> = layer
                .kernel
                .iter()
                .zip(&layer.bias)
                .map(|(row, bias)| {
                    let mut sum = *bias;
                    for (w, x) in row.iter().zip(&activations) {
                        sum += w * x;
                    }
                    sum
                })
                .collect();
            layer.activation.apply_in_place(&mut output);
            activations = output;
        }
        activations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{SequentialConfig, rng_from_seed};

    #[test]
    fn test_forward_matches_hand_computation() {
        let network = SequentialConfig::with_input_size(2)
            .dense(1, Activation::Linear)
            .build("hand", &mut rng_from_seed(Some(3)))
            .unwrap();
        let layer = &network.layers()[0];
        let expected = layer.kernel()[0][0] * 0.5 + layer.kernel()[0][1] * -1.0 + layer.bias()[0];

        let reference = ReferenceNetwork::from(&network);
        assert_eq!(reference.input_size(), 2);
        let output = reference.forward(&[0.5, -1.0]);
        assert_eq!(output.len(), 1);
        assert!((output[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_forward_agrees_with_compiled_model() {
        let network = SequentialConfig::with_input_size(1)
            .dense(32, Activation::Tanh)
            .dense(32, Activation::Tanh)
            .dense(4, Activation::Tanh)
            .build("agree", &mut rng_from_seed(Some(9)))
            .unwrap();
        let model = network.compile().unwrap();

        let expected = ReferenceNetwork::from(&network).forward(&[0.7]);
        let actual = model.predict(&[0.7]).unwrap();
        assert_eq!(expected.len(), 4);
        for (e, a) in expected.iter().zip(&actual) {
            assert!((e - a).abs() < 1e-4);
        }
    }
}
