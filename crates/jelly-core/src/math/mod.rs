//! Numeric primitives shared by the evaluators and the decision engine.
//!
//! - `combinatorics`: exact binomial coefficients and the hypergeometric law.
//! - `dense`: validated affine layers and activations.

mod combinatorics;
mod dense;

pub use combinatorics::{combinations, hypergeometric_pmf, hypergeometric_support};
pub use dense::{DenseLayer, DimensionError, relu_in_place};

/// Sign-preserving logarithmic compression, `sign(x) * ln(1 + |x|)`.
pub fn symlog(x: f64) -> f64 {
    x.signum() * x.abs().ln_1p()
}

/// Network feature for a score differential: `symlog(x) / 10` clamped to `[-1, 1]`.
pub fn score_feature(score_diff: f64) -> f32 {
    (symlog(score_diff) / 10.0).clamp(-1.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::{score_feature, symlog};

    #[test]
    fn symlog_is_odd_and_zero_at_origin() {
        assert_eq!(symlog(0.0), 0.0);
        for x in [0.5, 1.0, 7.0, 1024.0] {
            assert!((symlog(x) + symlog(-x)).abs() < 1e-12);
        }
        assert!((symlog(std::f64::consts::E - 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn score_feature_saturates() {
        assert_eq!(score_feature(0.0), 0.0);
        assert_eq!(score_feature(1e12), 1.0);
        assert_eq!(score_feature(-1e12), -1.0);
        let mid = score_feature(100.0);
        assert!(mid > 0.0 && mid < 1.0);
    }
}
