//! Core benchmark execution logic.

use super::benchmark_errors::{BenchmarkError, BenchmarkResult};
use super::benchmark_types::{BenchmarkConfig, TimingResults};
use super::performance_metrics::{
    print_performance_analysis, print_section_header, repeat_timing, verify_outputs_match,
};
use super::reference::ReferenceNetwork;
use crate::network::{random_normal, rng_from_seed};
use log::{debug, error, info, warn};
use std::fs;
use std::hint::black_box;
use std::io::ErrorKind;
use std::path::Path;

/// Maximum absolute difference tolerated between the reference and the compiled model.
pub const VERIFICATION_EPSILON: f32 = 1e-4;

/// Configuration loader that handles JSON files with fallbacks
pub struct ConfigLoader;

impl ConfigLoader {
    pub const DEFAULT_CONFIG_PATH: &'static str = "configs/benchmark.json";

    /// Load a configuration file with fallback to defaults
    pub fn load_config<T: serde::de::DeserializeOwned + Default>(
        path: &Path,
        config_name: &str,
    ) -> BenchmarkResult<T> {
        match Self::load_from_path(path) {
            Err(BenchmarkError::ConfigFileNotFound { .. }) => {
                warn!(
                    "Config file '{}' not found, using default configuration for {}",
                    path.display(),
                    config_name
                );
                Ok(T::default())
            }
            other => other,
        }
    }

    /// Load a configuration file, failing when it is missing.
    pub fn load_from_path<T: serde::de::DeserializeOwned>(path: &Path) -> BenchmarkResult<T> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => BenchmarkError::ConfigFileNotFound {
                path: path.display().to_string(),
            },
            _ => BenchmarkError::IoError(e),
        })?;

        serde_json::from_str(&content).map_err(|e| BenchmarkError::ConfigParseError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// An explicit path must exist; the default path falls back to built-in settings.
    pub fn load(path: Option<&Path>) -> BenchmarkResult<BenchmarkConfig> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_config(Path::new(Self::DEFAULT_CONFIG_PATH), "benchmark"),
        }
    }
}

/// Main benchmark runner
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    pub fn new(config: BenchmarkConfig) -> BenchmarkResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Configured models in sweep order.
    pub fn list_models(&self) -> Vec<String> {
        self.config.sweep_order()
    }

    /// Prints the configured models with their `[N, m, k]` triplets.
    pub fn print_models(&self) {
        println!("Available models:");
        for name in self.list_models() {
            let layers_size = &self.config.models[&name].layers_size;
            let marker = if name == self.config.model { "*" } else { " " };
            println!("  {} {:<12} layers_size = {:?}", marker, name, layers_size);
        }
    }

    /// Runs the model selected in the configuration.
    pub fn run_selected(&self) -> BenchmarkResult<TimingResults> {
        self.run_model(&self.config.model)
    }

    /// Builds, verifies and times one named model.
    pub fn run_model(&self, name: &str) -> BenchmarkResult<TimingResults> {
        let architecture = self.config.architecture(name)?;
        architecture.check_limits(self.config.input_size)?;
        let mut rng = rng_from_seed(self.config.seed);

        let network = architecture
            .sequential_config(
                self.config.input_size,
                self.config.hidden_activation,
                self.config.output_activation,
            )
            .build(name, &mut rng)?;

        print_section_header(&format!(
            "{}: layers_size = {:?}",
            name,
            architecture.layers_size()
        ));
        println!("{}", network);

        let model = network.compile()?;
        let input = random_normal(self.config.input_size, &mut rng);
        debug!("{} input: {:?}", name, input);

        info!("Verifying {} against the reference forward pass...", name);
        let reference_output = ReferenceNetwork::from(&network).forward(&input);
        let model_output = model.predict(&input)?;
        if verify_outputs_match(&reference_output, &model_output, VERIFICATION_EPSILON) {
            info!("✅ Outputs match");
            info!(
                "   Sample values: {:?}",
                &model_output[..5.min(model_output.len())]
            );
        } else {
            error!("❌ Outputs do not match for {}", name);
            return Err(BenchmarkError::OutputVerificationFailed {
                model: name.to_string(),
            });
        }

        let timing = &self.config.timing;
        let feature_size = model.get_feature_size();
        let mut buffer = vec![0.0f32; model.required_memory()];
        let results = repeat_timing(
            name,
            timing.number,
            timing.repeat,
            timing.warmup_runs,
            || {
                buffer[..feature_size].copy_from_slice(black_box(&input));
                model.predict_with_buffer(&mut buffer)?;
                black_box(model.output_slice(&buffer));
                Ok::<(), BenchmarkError>(())
            },
        )?;

        println!("{}", results.summary_line());
        Ok(results)
    }

    /// Runs every configured model, continuing past failures.
    pub fn run_all(&self) -> BenchmarkResult<Vec<TimingResults>> {
        info!("Starting sweep over {} models", self.config.models.len());

        let mut results = Vec::new();
        let mut errors = Vec::new();

        for name in self.list_models() {
            match self.run_model(&name) {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!("Benchmark {} failed: {}", name, e);
                    errors.push(name);
                }
            }
        }

        print_performance_analysis(&results);

        if errors.is_empty() {
            info!("All benchmarks completed successfully");
            Ok(results)
        } else {
            Err(BenchmarkError::BenchmarkExecutionError {
                benchmark_name: "all".to_string(),
                message: format!(
                    "{} of {} models failed: {}",
                    errors.len(),
                    self.config.models.len(),
                    errors.join(", ")
                ),
            })
        }
    }
}
