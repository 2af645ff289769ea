//! Construction of the dense feed-forward networks under benchmark.

pub mod architecture;
pub mod initializers;
pub mod sequential;

pub use architecture::Architecture;
pub use initializers::{glorot_uniform, random_normal, rng_from_seed};
pub use sequential::{DenseConfig, DenseLayer, Sequential, SequentialConfig};
