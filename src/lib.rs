//! Inference latency benchmarks for small dense feed-forward networks.
//!
//! Networks are described as `[N, m, k]` triplets, built with Glorot-initialised
//! weights and compiled into an instruction model: a sequence of DOT
//! instructions operating on one unified computation buffer.

pub mod activation;
pub mod benchmarks;
pub mod errors;
pub mod instruction_model;
pub mod instruction_model_info;
pub mod instructions;
pub mod network;
pub(crate) mod utils;

pub use activation::Activation;
pub use errors::{InstructionModelError, NetworkError};
pub use instruction_model::InstructionModel;
pub use instruction_model_info::{InstructionModelInfo, ValidationData};
pub use network::{Architecture, Sequential, SequentialConfig};
