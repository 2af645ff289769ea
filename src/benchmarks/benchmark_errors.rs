//! Error types for benchmark operations.

use thiserror::Error;

use crate::errors::{InstructionModelError, NetworkError};

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("Configuration file not found: {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration file '{path}': {source}")]
    ConfigParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration validation error for field '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid number of executions: {value}. Must be greater than 0")]
    InvalidNumExecutions { value: u32 },

    #[error("Invalid repeat count: {value}. Must be greater than 0")]
    InvalidRepeatCount { value: u32 },

    #[error("Unknown model '{name}'. Available: {}", .available.join(", "))]
    UnknownModel { name: String, available: Vec<String> },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Inference error: {0}")]
    Inference(#[from] InstructionModelError),

    #[error("Output verification failed for model '{model}'")]
    OutputVerificationFailed { model: String },

    #[error("Benchmark '{benchmark_name}' execution error: {message}")]
    BenchmarkExecutionError {
        benchmark_name: String,
        message: String,
    },
}

pub type BenchmarkResult<T> = Result<T, BenchmarkError>;
