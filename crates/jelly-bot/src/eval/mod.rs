//! Learned position evaluators.
//!
//! - `PostRevealEvaluator` scores positions where the bullet count is known.
//! - `PreRevealEvaluator` scores positions where no bullet has been seen yet.
//!
//! Both return a value in `[-1, 1]` from the perspective of the player to move.

pub mod encode;
pub mod network;

pub use encode::{PRE_REVEAL_INPUT, POST_REVEAL_INPUT, encode_post_reveal, encode_pre_reveal};
pub use network::ValueNetwork;

use crate::weights::{NetworkManifest, WeightError};
use jelly_core::math::DimensionError;
use std::path::Path;
use std::sync::Arc;

/// Value network over `(remaining, bullets_remaining, score_diff)`.
#[derive(Debug, Clone)]
pub struct PostRevealEvaluator {
    network: ValueNetwork,
}

impl PostRevealEvaluator {
    pub fn from_manifest(manifest: &NetworkManifest) -> Result<Self, WeightError> {
        Ok(Self {
            network: ValueNetwork::from_manifest(manifest, POST_REVEAL_INPUT)?,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WeightError> {
        Ok(Self {
            network: ValueNetwork::from_file(path, POST_REVEAL_INPUT)?,
        })
    }

    pub fn evaluate(
        &self,
        remaining: usize,
        bullets_remaining: usize,
        score_diff: f64,
    ) -> Result<f64, DimensionError> {
        self.network
            .forward(&encode_post_reveal(remaining, bullets_remaining, score_diff))
    }
}

/// Intuition network over `(remaining, score_diff)` with the bullet count hidden.
#[derive(Debug, Clone)]
pub struct PreRevealEvaluator {
    network: ValueNetwork,
}

impl PreRevealEvaluator {
    pub fn from_manifest(manifest: &NetworkManifest) -> Result<Self, WeightError> {
        Ok(Self {
            network: ValueNetwork::from_manifest(manifest, PRE_REVEAL_INPUT)?,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WeightError> {
        Ok(Self {
            network: ValueNetwork::from_file(path, PRE_REVEAL_INPUT)?,
        })
    }

    pub fn evaluate(&self, remaining: usize, score_diff: f64) -> Result<f64, DimensionError> {
        self.network.forward(&encode_pre_reveal(remaining, score_diff))
    }
}

/// Both evaluators, shared read-only across engines and threads.
#[derive(Debug, Clone)]
pub struct EngineWeights {
    pub post_reveal: Arc<PostRevealEvaluator>,
    pub pre_reveal: Arc<PreRevealEvaluator>,
}

impl EngineWeights {
    pub fn new(post_reveal: PostRevealEvaluator, pre_reveal: PreRevealEvaluator) -> Self {
        Self {
            post_reveal: Arc::new(post_reveal),
            pre_reveal: Arc::new(pre_reveal),
        }
    }

    pub fn from_manifests(
        value_net: &NetworkManifest,
        intuition_net: &NetworkManifest,
    ) -> Result<Self, WeightError> {
        Ok(Self::new(
            PostRevealEvaluator::from_manifest(value_net)?,
            PreRevealEvaluator::from_manifest(intuition_net)?,
        ))
    }

    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        value_net: P,
        intuition_net: Q,
    ) -> Result<Self, WeightError> {
        Ok(Self::new(
            PostRevealEvaluator::from_file(value_net)?,
            PreRevealEvaluator::from_file(intuition_net)?,
        ))
    }

    /// Zero-weight networks whose outputs are `tanh(value_bias)` and
    /// `tanh(intuition_bias)` regardless of input.
    pub fn constant(value_bias: f32, intuition_bias: f32) -> Result<Self, WeightError> {
        let hidden = [8, 8, 4];
        let post = NetworkManifest::zeros(POST_REVEAL_INPUT, hidden).with_value_bias(value_bias);
        let pre = NetworkManifest::zeros(PRE_REVEAL_INPUT, hidden).with_value_bias(intuition_bias);
        Self::from_manifests(&post, &pre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluators_reject_swapped_manifests() {
        let pre = NetworkManifest::zeros(PRE_REVEAL_INPUT, [4, 4, 4]);
        assert!(PostRevealEvaluator::from_manifest(&pre).is_err());
        let post = NetworkManifest::zeros(POST_REVEAL_INPUT, [4, 4, 4]);
        assert!(PreRevealEvaluator::from_manifest(&post).is_err());
    }

    #[test]
    fn constant_weights_are_input_independent() {
        let weights = EngineWeights::constant(0.3, -0.2).unwrap();
        let a = weights.post_reveal.evaluate(10, 3, 12.0).unwrap();
        let b = weights.post_reveal.evaluate(2, 1, -400.0).unwrap();
        assert_eq!(a, b);
        assert!((a - 0.3f64.tanh()).abs() < 1e-6);
        let c = weights.pre_reveal.evaluate(27, 0.0).unwrap();
        assert!((c + 0.2f64.tanh()).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_indices_still_evaluate() {
        let weights = EngineWeights::constant(0.0, 0.0).unwrap();
        assert_eq!(weights.post_reveal.evaluate(27, 8, 0.0).unwrap(), 0.0);
        assert_eq!(weights.pre_reveal.evaluate(40, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn weights_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let value_path = dir.path().join("value.json");
        let intuition_path = dir.path().join("intuition.json");
        NetworkManifest::zeros(POST_REVEAL_INPUT, [4, 4, 2])
            .with_value_bias(1.0)
            .to_file(&value_path)
            .unwrap();
        NetworkManifest::zeros(PRE_REVEAL_INPUT, [4, 4, 2])
            .to_file(&intuition_path)
            .unwrap();
        let weights = EngineWeights::from_files(&value_path, &intuition_path).unwrap();
        let value = weights.post_reveal.evaluate(5, 2, 0.0).unwrap();
        assert!((value - 1.0f64.tanh()).abs() < 1e-6);
    }
}
