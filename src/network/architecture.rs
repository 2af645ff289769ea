//! `[N, m, k]` network shape: `input -> Dense(m) x k -> Dense(N)`.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::errors::{NetworkError, NetworkResult};
use crate::network::sequential::{SequentialConfig, check_engine_limits};

/// Shape of a benchmarked network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    /// Width of the last layer (N).
    pub output_width: usize,
    /// Width of every hidden layer (m).
    pub hidden_width: usize,
    /// Number of hidden layers (k); may be 0.
    pub hidden_depth: usize,
}

impl Architecture {
    pub fn new(
        output_width: usize,
        hidden_width: usize,
        hidden_depth: usize,
    ) -> NetworkResult<Self> {
        Self::from_layers_size(&[output_width, hidden_width, hidden_depth])
    }

    /// Parses a `[N, m, k]` triplet.
    pub fn from_layers_size(layers_size: &[usize]) -> NetworkResult<Self> {
        let invalid = |message: &str| NetworkError::InvalidArchitecture {
            layers_size: layers_size.to_vec(),
            message: message.to_string(),
        };

        let &[output_width, hidden_width, hidden_depth] = layers_size else {
            return Err(invalid(
                "expected exactly three values: [last_layer_width, hidden_width, hidden_depth]",
            ));
        };
        if output_width == 0 {
            return Err(invalid("last layer width must be greater than 0"));
        }
        if hidden_width == 0 {
            return Err(invalid("hidden layer width must be greater than 0"));
        }

        Ok(Self {
            output_width,
            hidden_width,
            hidden_depth,
        })
    }

    pub fn layers_size(&self) -> [usize; 3] {
        [self.output_width, self.hidden_width, self.hidden_depth]
    }

    /// Expands the triplet into `hidden_depth` hidden layers plus the output layer.
    pub fn sequential_config(
        &self,
        input_size: usize,
        hidden_activation: Activation,
        output_activation: Activation,
    ) -> SequentialConfig {
        let config = (0..self.hidden_depth).fold(
            SequentialConfig::with_input_size(input_size),
            |config, _| config.dense(self.hidden_width, hidden_activation),
        );
        config.dense(self.output_width, output_activation)
    }

    /// Weights plus biases of the expanded network, `None` on overflow.
    pub fn param_count(&self, input_size: usize) -> Option<usize> {
        let (m, n) = (self.hidden_width, self.output_width);
        let dense = |fan_in: usize, units: usize| -> Option<usize> {
            fan_in.checked_mul(units)?.checked_add(units)
        };

        if self.hidden_depth == 0 {
            return dense(input_size, n);
        }
        let first = dense(input_size, m)?;
        let middle = (self.hidden_depth - 1).checked_mul(dense(m, m)?)?;
        let last = dense(m, n)?;
        first.checked_add(middle)?.checked_add(last)
    }

    /// Length of the unified computation buffer: input, every hidden layer and the output.
    pub fn computation_buffer_size(&self, input_size: usize) -> Option<usize> {
        self.hidden_width
            .checked_mul(self.hidden_depth)?
            .checked_add(input_size)?
            .checked_add(self.output_width)
    }

    /// Fails when the expanded network would exceed the instruction model limits.
    /// Checked on the triplet alone, so nothing is expanded or allocated.
    pub fn check_limits(&self, input_size: usize) -> NetworkResult<()> {
        check_engine_limits(
            self.param_count(input_size),
            self.computation_buffer_size(input_size),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_layers_size() {
        let arch = Architecture::from_layers_size(&[10, 310, 2]).unwrap();
        assert_eq!(arch.output_width, 10);
        assert_eq!(arch.hidden_width, 310);
        assert_eq!(arch.hidden_depth, 2);
        assert_eq!(arch.layers_size(), [10, 310, 2]);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            Architecture::from_layers_size(&[10, 310]),
            Err(NetworkError::InvalidArchitecture { .. })
        ));
        assert!(matches!(
            Architecture::from_layers_size(&[10, 310, 2, 1]),
            Err(NetworkError::InvalidArchitecture { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_widths() {
        assert!(Architecture::new(0, 10, 1).is_err());
        assert!(Architecture::new(10, 0, 1).is_err());
        assert!(Architecture::new(10, 10, 0).is_ok());
    }

    #[test]
    fn test_sequential_config_shape() {
        let config = Architecture::new(20, 180, 4)
            .unwrap()
            .sequential_config(1, Activation::Tanh, Activation::Tanh);
        let units: Vec<usize> = config.layer_configs().iter().map(|l| l.units).collect();
        assert_eq!(units, vec![180, 180, 180, 180, 20]);
        assert_eq!(config.layer_configs()[0].input_size, 1);
    }

    #[test]
    fn test_zero_depth_is_single_layer() {
        let config = Architecture::new(5, 100, 0)
            .unwrap()
            .sequential_config(3, Activation::Relu, Activation::Sigmoid);
        assert_eq!(config.layer_configs().len(), 1);
        assert_eq!(config.layer_configs()[0].input_size, 3);
        assert_eq!(config.layer_configs()[0].activation, Activation::Sigmoid);
    }

    #[test]
    fn test_param_count() {
        // 1 -> 315 -> 315 -> 1
        let arch = Architecture::new(1, 315, 2).unwrap();
        assert_eq!(arch.param_count(1), Some(630 + 99_540 + 316));
        assert_eq!(Architecture::new(5, 100, 0).unwrap().param_count(3), Some(20));
        assert_eq!(arch.computation_buffer_size(1), Some(1 + 630 + 1));
    }

    #[test]
    fn test_param_count_overflow_is_none() {
        let arch = Architecture::new(1, usize::MAX / 2, 3).unwrap();
        assert_eq!(arch.param_count(1), None);
        assert_eq!(arch.computation_buffer_size(1), None);
    }

    #[test]
    fn test_check_limits() {
        assert!(Architecture::new(1000, 100, 1).unwrap().check_limits(1).is_ok());
        assert!(matches!(
            Architecture::new(1, 100_000, 2).unwrap().check_limits(1),
            Err(NetworkError::TooManyParameters { .. })
        ));
        assert!(matches!(
            Architecture::new(1, 1, 2_000_000).unwrap().check_limits(1),
            Err(NetworkError::ComputationBufferTooLarge { .. })
        ));
        assert!(matches!(
            Architecture::new(1, usize::MAX, usize::MAX).unwrap().check_limits(1),
            Err(NetworkError::TooManyParameters { .. })
        ));
    }
}
