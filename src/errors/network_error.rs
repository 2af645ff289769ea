//! Errors raised while describing, building or compiling a dense network.

use thiserror::Error;

use super::InstructionModelError;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Network has no dense layers defined")]
    NoLayers,

    #[error("Input size must be greater than 0")]
    InvalidInputSize,

    #[error("Dense layer {index} must have at least one unit")]
    InvalidLayerWidth { index: usize },

    #[error("Invalid architecture {layers_size:?}: {message}")]
    InvalidArchitecture {
        layers_size: Vec<usize>,
        message: String,
    },

    #[error("Network exceeds the limit of {max} weight and bias values")]
    TooManyParameters { max: usize },

    #[error("Network needs more than {max} floats of working memory")]
    ComputationBufferTooLarge { max: usize },

    #[error("Failed to compile network into an instruction model: {0}")]
    Compile(#[from] InstructionModelError),
}
