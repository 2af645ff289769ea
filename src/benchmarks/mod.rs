//! Timing harness for the dense network sweep.
//!
//! Each configured model is built, checked against a plain forward pass and
//! then timed over repeated batches of single-sample inferences.

pub mod benchmark_errors;
pub mod benchmark_runner;
pub mod benchmark_types;
pub mod performance_metrics;
pub mod reference;

pub use benchmark_errors::{BenchmarkError, BenchmarkResult};
pub use benchmark_runner::{BenchmarkRunner, ConfigLoader, VERIFICATION_EPSILON};
pub use benchmark_types::{
    BenchmarkConfig, ConfigOverrides, ModelConfig, TimingConfig, TimingResults,
};
pub use performance_metrics::{
    print_performance_analysis, print_section_header, repeat_timing, verify_outputs_match,
};
pub use reference::ReferenceNetwork;
