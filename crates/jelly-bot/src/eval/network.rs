//! Four-layer MLP value network.
//!
//! Architecture:
//!   - fc1, fc2, fc3: affine + ReLU
//!   - value_head: affine to one unit, then `tanh`
//!
//! Hidden widths come from the weight file; only the input width is fixed
//! by the encoder the network is paired with.

use crate::weights::{NetworkManifest, WeightError};
use jelly_core::math::{DenseLayer, DimensionError, relu_in_place};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ValueNetwork {
    hidden: [DenseLayer; 3],
    head: DenseLayer,
}

impl ValueNetwork {
    pub fn from_manifest(manifest: &NetworkManifest, input_size: usize) -> Result<Self, WeightError> {
        let [fc1, fc2, fc3, head] = manifest.to_layers(input_size)?;
        Ok(Self {
            hidden: [fc1, fc2, fc3],
            head,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P, input_size: usize) -> Result<Self, WeightError> {
        let manifest = NetworkManifest::from_file(path)?;
        Self::from_manifest(&manifest, input_size)
    }

    pub fn input_size(&self) -> usize {
        self.hidden[0].input_size()
    }

    /// Scalar value in `[-1, 1]` from the side to move's perspective.
    pub fn forward(&self, input: &[f32]) -> Result<f64, DimensionError> {
        let mut activations = input.to_vec();
        for layer in &self.hidden {
            activations = layer.forward(&activations)?;
            relu_in_place(&mut activations);
        }
        let output = self.head.forward(&activations)?;
        let raw = output.first().copied().unwrap_or_default();
        Ok(f64::from(raw).tanh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::LayerWeights;

    #[test]
    fn zero_network_outputs_zero() {
        let net = ValueNetwork::from_manifest(&NetworkManifest::zeros(4, [3, 3, 2]), 4).unwrap();
        assert_eq!(net.forward(&[1.0, -1.0, 2.0, 0.5]).unwrap(), 0.0);
    }

    #[test]
    fn value_bias_passes_through_tanh() {
        let manifest = NetworkManifest::zeros(4, [3, 3, 2]).with_value_bias(0.7);
        let net = ValueNetwork::from_manifest(&manifest, 4).unwrap();
        let value = net.forward(&[0.0; 4]).unwrap();
        assert!((value - 0.7f64.tanh()).abs() < 1e-6);
    }

    #[test]
    fn hidden_relu_blocks_negative_paths() {
        // One-wide network: x -> -x -> relu -> identity chain.
        let manifest = NetworkManifest {
            fc1: LayerWeights {
                weight: vec![vec![-1.0]],
                bias: vec![0.0],
            },
            fc2: LayerWeights {
                weight: vec![vec![1.0]],
                bias: vec![0.0],
            },
            fc3: LayerWeights {
                weight: vec![vec![1.0]],
                bias: vec![0.0],
            },
            value_head: LayerWeights {
                weight: vec![vec![1.0]],
                bias: vec![0.0],
            },
        };
        let net = ValueNetwork::from_manifest(&manifest, 1).unwrap();
        assert_eq!(net.forward(&[2.0]).unwrap(), 0.0);
        assert!((net.forward(&[-0.5]).unwrap() - 0.5f64.tanh()).abs() < 1e-6);
    }

    #[test]
    fn wrong_input_length_is_an_error() {
        let net = ValueNetwork::from_manifest(&NetworkManifest::zeros(4, [2, 2, 2]), 4).unwrap();
        assert!(matches!(
            net.forward(&[0.0; 3]),
            Err(DimensionError::InputLength {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn large_activations_saturate() {
        let mut manifest = NetworkManifest::zeros(1, [1, 1, 1]);
        manifest.fc1.weight = vec![vec![100.0]];
        manifest.fc2.weight = vec![vec![100.0]];
        manifest.fc3.weight = vec![vec![100.0]];
        manifest.value_head.weight = vec![vec![100.0]];
        let net = ValueNetwork::from_manifest(&manifest, 1).unwrap();
        let value = net.forward(&[1.0]).unwrap();
        assert!(value <= 1.0 && value > 0.999);
    }
}
