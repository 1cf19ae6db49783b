//! Parameter tables for the value networks.

pub mod loader;

pub use loader::{LAYER_NAMES, LayerWeights, NetworkManifest, WeightError};
