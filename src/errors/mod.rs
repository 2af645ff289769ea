//! Error types for the benchmark harness.
//!
//! Each concern has its own enum: the inference engine, network
//! construction, and the benchmark layer (which lives next to the runner in
//! `benchmarks::benchmark_errors`).

mod instruction_model_error;
mod network_error;

pub use instruction_model_error::InstructionModelError;
pub use network_error::NetworkError;

/// Result type alias for instruction model operations.
pub type Result<T> = std::result::Result<T, InstructionModelError>;

/// Result type alias for network construction.
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;
