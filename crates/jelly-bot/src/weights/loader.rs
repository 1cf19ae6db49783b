//! Weight loading from JSON files exported by the training pipeline.
//!
//! The format mirrors a PyTorch `state_dict` for a four-layer MLP:
//! `fc1`, `fc2`, `fc3` and `value_head`, each holding a `weight` matrix
//! (`out × in`, one row per output unit) and a `bias` vector.

use jelly_core::math::{DenseLayer, DimensionError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const LAYER_NAMES: [&str; 4] = ["fc1", "fc2", "fc3", "value_head"];

#[derive(Debug, Error)]
pub enum WeightError {
    #[error("failed to read weight file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write weight file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse weight JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("layer {layer}: {message}")]
    Schema { layer: &'static str, message: String },
    #[error("layer {layer}: {source}")]
    Dimension {
        layer: &'static str,
        #[source]
        source: DimensionError,
    },
}

/// JSON format for one affine layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub weight: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LayerWeights {
    pub fn zeros(input_size: usize, output_size: usize) -> Self {
        Self {
            weight: vec![vec![0.0; input_size]; output_size],
            bias: vec![0.0; output_size],
        }
    }

    fn rows(&self) -> usize {
        self.weight.len()
    }

    fn cols(&self) -> usize {
        self.weight.first().map_or(0, Vec::len)
    }

    fn validate(&self, layer: &'static str, expected_cols: usize) -> Result<(), WeightError> {
        let schema = |message: String| WeightError::Schema { layer, message };

        if self.rows() == 0 {
            return Err(schema("weight matrix has no rows".to_string()));
        }
        if let Some((row, values)) = self
            .weight
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != expected_cols)
        {
            return Err(schema(format!(
                "row {row} has {} columns, expected {expected_cols}",
                values.len()
            )));
        }
        if self.bias.len() != self.rows() {
            return Err(schema(format!(
                "bias has {} entries for {} rows",
                self.bias.len(),
                self.rows()
            )));
        }
        let finite = self.weight.iter().flatten().chain(&self.bias).all(|v| v.is_finite());
        if !finite {
            return Err(schema("contains non-finite values".to_string()));
        }
        Ok(())
    }

    fn to_dense(&self, layer: &'static str) -> Result<DenseLayer, WeightError> {
        let flat: Vec<f32> = self.weight.iter().flatten().copied().collect();
        DenseLayer::new(self.cols(), self.rows(), flat, self.bias.clone())
            .map_err(|source| WeightError::Dimension { layer, source })
    }
}

/// Complete parameter table for one value network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkManifest {
    pub fc1: LayerWeights,
    pub fc2: LayerWeights,
    pub fc3: LayerWeights,
    pub value_head: LayerWeights,
}

impl NetworkManifest {
    /// All-zero network with the given hidden widths; evaluates to `tanh(0) = 0`.
    pub fn zeros(input_size: usize, hidden: [usize; 3]) -> Self {
        Self {
            fc1: LayerWeights::zeros(input_size, hidden[0]),
            fc2: LayerWeights::zeros(hidden[0], hidden[1]),
            fc3: LayerWeights::zeros(hidden[1], hidden[2]),
            value_head: LayerWeights::zeros(hidden[2], 1),
        }
    }

    /// Sets the value-head bias, so an otherwise zero network outputs `tanh(bias)`.
    pub fn with_value_bias(mut self, bias: f32) -> Self {
        if let Some(slot) = self.value_head.bias.first_mut() {
            *slot = bias;
        }
        self
    }

    /// Load weights from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WeightError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| WeightError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, WeightError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save weights to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WeightError> {
        let path = path.as_ref();
        let json = serde_json::to_string(self)?;
        fs::write(path, json).map_err(|source| WeightError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    fn layers(&self) -> [(&'static str, &LayerWeights); 4] {
        [
            (LAYER_NAMES[0], &self.fc1),
            (LAYER_NAMES[1], &self.fc2),
            (LAYER_NAMES[2], &self.fc3),
            (LAYER_NAMES[3], &self.value_head),
        ]
    }

    /// Validate that the layers chain from `input_size` features down to one scalar
    pub fn validate(&self, input_size: usize) -> Result<(), WeightError> {
        let mut expected_cols = input_size;
        for (name, layer) in self.layers() {
            layer.validate(name, expected_cols)?;
            expected_cols = layer.rows();
        }
        if self.value_head.rows() != 1 {
            return Err(WeightError::Schema {
                layer: LAYER_NAMES[3],
                message: format!("expected 1 output row, got {}", self.value_head.rows()),
            });
        }
        Ok(())
    }

    /// Validates and converts into dense layers in evaluation order.
    pub fn to_layers(&self, input_size: usize) -> Result<[DenseLayer; 4], WeightError> {
        self.validate(input_size)?;
        Ok([
            self.fc1.to_dense(LAYER_NAMES[0])?,
            self.fc2.to_dense(LAYER_NAMES[1])?,
            self.fc3.to_dense(LAYER_NAMES[2])?,
            self.value_head.to_dense(LAYER_NAMES[3])?,
        ])
    }
}
