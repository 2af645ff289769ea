//! Benchmark configuration and result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::benchmark_errors::{BenchmarkError, BenchmarkResult};
use crate::activation::Activation;
use crate::network::Architecture;

/// `[N, m, k]` triplets of the default sweep, one network per entry.
const DEFAULT_SWEEP: [[usize; 3]; 10] = [
    [1, 315, 2],
    [2, 315, 2],
    [5, 315, 2],
    [10, 310, 2],
    [20, 180, 4],
    [50, 175, 4],
    [100, 200, 3],
    [200, 100, 9],
    [500, 100, 6],
    [1000, 100, 1],
];

const DEFAULT_MODEL: &str = "Model10";

/// A named network entry in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// `[last_layer_width, hidden_width, hidden_depth]`.
    pub layers_size: Vec<usize>,
}

impl ModelConfig {
    pub fn architecture(&self) -> BenchmarkResult<Architecture> {
        Ok(Architecture::from_layers_size(&self.layers_size)?)
    }
}

/// Settings of the repeated timing loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Inference calls per measurement.
    pub number: u32,
    /// Number of measurements.
    pub repeat: u32,
    /// Untimed calls before the first measurement.
    pub warmup_runs: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            number: 1000,
            repeat: 5,
            warmup_runs: 5,
        }
    }
}

/// Top-level benchmark configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Model run when no explicit selection is made.
    pub model: String,
    pub models: BTreeMap<String, ModelConfig>,
    pub timing: TimingConfig,
    /// Width of the random input vector.
    pub input_size: usize,
    /// RNG seed for weights and input; entropy when absent.
    pub seed: Option<u64>,
    pub hidden_activation: Activation,
    pub output_activation: Activation,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        let models = DEFAULT_SWEEP
            .iter()
            .map(|layers_size| {
                (
                    format!("Model{}", layers_size[0]),
                    ModelConfig {
                        layers_size: layers_size.to_vec(),
                    },
                )
            })
            .collect();

        Self {
            model: DEFAULT_MODEL.to_string(),
            models,
            timing: TimingConfig::default(),
            input_size: 1,
            seed: None,
            hidden_activation: Activation::Tanh,
            output_activation: Activation::Tanh,
        }
    }
}

/// Command-line style overrides applied on top of a loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model: Option<String>,
    pub number: Option<u32>,
    pub repeat: Option<u32>,
    pub warmup_runs: Option<u32>,
    pub seed: Option<u64>,
    pub input_size: Option<usize>,
    pub hidden_activation: Option<Activation>,
    pub output_activation: Option<Activation>,
}

impl BenchmarkConfig {
    /// Replaces every field for which an override is present.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(model) = &overrides.model {
            self.model = model.clone();
        }
        if let Some(number) = overrides.number {
            self.timing.number = number;
        }
        if let Some(repeat) = overrides.repeat {
            self.timing.repeat = repeat;
        }
        if let Some(warmup_runs) = overrides.warmup_runs {
            self.timing.warmup_runs = warmup_runs;
        }
        if let Some(seed) = overrides.seed {
            self.seed = Some(seed);
        }
        if let Some(input_size) = overrides.input_size {
            self.input_size = input_size;
        }
        if let Some(activation) = overrides.hidden_activation {
            self.hidden_activation = activation;
        }
        if let Some(activation) = overrides.output_activation {
            self.output_activation = activation;
        }
        self
    }

    /// Validates timing settings, input size and every model entry.
    pub fn validate(&self) -> BenchmarkResult<()> {
        if self.timing.number == 0 {
            return Err(BenchmarkError::InvalidNumExecutions {
                value: self.timing.number,
            });
        }

        if self.timing.repeat == 0 {
            return Err(BenchmarkError::InvalidRepeatCount {
                value: self.timing.repeat,
            });
        }

        if self.input_size == 0 {
            return Err(BenchmarkError::ConfigValidationError {
                field: "input_size".to_string(),
                message: "Input size must be greater than 0".to_string(),
            });
        }

        if self.models.is_empty() {
            return Err(BenchmarkError::ConfigValidationError {
                field: "models".to_string(),
                message: "At least one model must be configured".to_string(),
            });
        }

        for (name, model) in &self.models {
            model
                .architecture()
                .map_err(|e| BenchmarkError::ConfigValidationError {
                    field: format!("models.{}.layers_size", name),
                    message: e.to_string(),
                })?;
        }

        Ok(())
    }

    /// Looks up a model's architecture by name.
    pub fn architecture(&self, name: &str) -> BenchmarkResult<Architecture> {
        self.models
            .get(name)
            .ok_or_else(|| BenchmarkError::UnknownModel {
                name: name.to_string(),
                available: self.models.keys().cloned().collect(),
            })?
            .architecture()
    }

    /// Model names ordered by last layer width, then name.
    pub fn sweep_order(&self) -> Vec<String> {
        let mut entries: Vec<(usize, &String)> = self
            .models
            .iter()
            .map(|(name, model)| (model.layers_size.first().copied().unwrap_or(0), name))
            .collect();
        entries.sort();
        entries.into_iter().map(|(_, name)| name.clone()).collect()
    }
}

/// Measurements of one timed model.
#[derive(Debug, Clone)]
pub struct TimingResults {
    pub name: String,
    /// Calls per measurement.
    pub number: u32,
    /// Wall time of each measurement, in seconds.
    pub measurements_s: Vec<f64>,
}

impl TimingResults {
    pub fn new(name: String, number: u32, measurements_s: Vec<f64>) -> Self {
        Self {
            name,
            number,
            measurements_s,
        }
    }

    /// Each measurement as milliseconds per call.
    pub fn per_loop_ms(&self) -> Vec<f64> {
        let number = f64::from(self.number.max(1));
        self.measurements_s
            .iter()
            .map(|seconds| seconds * 1000.0 / number)
            .collect()
    }

    pub fn mean_ms(&self) -> f64 {
        let values = self.per_loop_ms();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Population standard deviation (ddof = 0) of the per-call times.
    pub fn std_ms(&self) -> f64 {
        let values = self.per_loop_ms();
        if values.is_empty() {
            return 0.0;
        }
        let mean = self.mean_ms();
        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    pub fn best_ms(&self) -> f64 {
        self.per_loop_ms()
            .into_iter()
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Timing: {:.4} ms ± {:.4} ms per loop",
            self.mean_ms(),
            self.std_ms()
        )
    }
}
