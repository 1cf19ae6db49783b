use crate::math::combinations;
use crate::model::rules::{MAX_BULLETS, MIN_BULLETS, POOL_SIZE};
use thiserror::Error;

/// Hypotheses with less posterior mass than this are skipped by consumers.
pub const PRIOR_EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeliefError {
    #[error("remaining pool size {remaining} exceeds the initial pool of {max}")]
    RemainingOutOfRange { remaining: usize, max: usize },
}

/// Posterior over the total bullet count `r ∈ [MIN_BULLETS, MAX_BULLETS]`,
/// conditioned on every draw so far having been bullet-free.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeliefDistribution {
    remaining: usize,
    probabilities: [f64; MAX_BULLETS],
    degenerate: bool,
}

impl BeliefDistribution {
    /// Derives the posterior for a pool with `remaining` tokens left.
    ///
    /// With `drawn = POOL_SIZE - remaining`, the likelihood of `r` bullets is
    /// `C(POOL_SIZE - r, drawn) / C(POOL_SIZE, drawn)` (zero when fewer than
    /// `drawn` safe tokens exist). The uniform prior cancels in normalization.
    /// If every likelihood vanishes the result falls back to uniform.
    pub fn posterior(remaining: usize) -> Result<Self, BeliefError> {
        if remaining > POOL_SIZE {
            return Err(BeliefError::RemainingOutOfRange {
                remaining,
                max: POOL_SIZE,
            });
        }
        let drawn = POOL_SIZE - remaining;
        let all_outcomes = combinations(POOL_SIZE, drawn);

        let mut likelihoods = [0.0f64; MAX_BULLETS];
        for (slot, bullets) in likelihoods.iter_mut().zip(MIN_BULLETS..=MAX_BULLETS) {
            let safe = POOL_SIZE - bullets;
            if drawn <= safe {
                *slot = combinations(safe, drawn) / all_outcomes;
            }
        }

        let total: f64 = likelihoods.iter().sum();
        let degenerate = total <= 0.0 || !total.is_finite();
        let probabilities = if degenerate {
            [1.0 / MAX_BULLETS as f64; MAX_BULLETS]
        } else {
            likelihoods.map(|p| p / total)
        };

        Ok(Self {
            remaining,
            probabilities,
            degenerate,
        })
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// True when the uniform fallback was used.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    pub fn probabilities(&self) -> &[f64; MAX_BULLETS] {
        &self.probabilities
    }

    /// Posterior mass of exactly `bullets` total bullets.
    pub fn probability(&self, bullets: usize) -> f64 {
        if (MIN_BULLETS..=MAX_BULLETS).contains(&bullets) {
            self.probabilities[bullets - MIN_BULLETS]
        } else {
            0.0
        }
    }

    /// `(bullets, probability)` pairs in ascending bullet order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        (MIN_BULLETS..=MAX_BULLETS).zip(self.probabilities.iter().copied())
    }

    /// Hypotheses carrying at least [`PRIOR_EPSILON`] of the mass.
    pub fn significant(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.iter().filter(|(_, p)| *p >= PRIOR_EPSILON)
    }

    pub fn expected_bullets(&self) -> f64 {
        self.iter().map(|(bullets, p)| bullets as f64 * p).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pool_is_uniform() {
        let belief = BeliefDistribution::posterior(POOL_SIZE).unwrap();
        for (_, p) in belief.iter() {
            assert!((p - 1.0 / MAX_BULLETS as f64).abs() < 1e-12);
        }
        assert!(!belief.is_degenerate());
        assert!((belief.expected_bullets() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn every_pool_size_is_a_distribution() {
        for remaining in 0..=POOL_SIZE {
            let belief = BeliefDistribution::posterior(remaining).unwrap();
            let total: f64 = belief.probabilities().iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "remaining {remaining}: {total}");
            assert!(belief.probabilities().iter().all(|p| *p >= 0.0));
        }
    }

    #[test]
    fn clean_draws_shift_mass_to_fewer_bullets() {
        let early = BeliefDistribution::posterior(24).unwrap();
        let late = BeliefDistribution::posterior(12).unwrap();
        assert!(late.expected_bullets() < early.expected_bullets());
        assert!(late.probability(1) > late.probability(8));
    }

    #[test]
    fn impossible_hypotheses_get_zero_mass() {
        // 21 clean draws leave 6 tokens, so at most 6 bullets fit.
        let belief = BeliefDistribution::posterior(6).unwrap();
        assert_eq!(belief.probability(7), 0.0);
        assert_eq!(belief.probability(8), 0.0);
        assert!(belief.probability(6) > 0.0);
        assert_eq!(belief.significant().count(), 6);
    }

    #[test]
    fn empty_pool_falls_back_to_uniform() {
        let belief = BeliefDistribution::posterior(0).unwrap();
        assert!(belief.is_degenerate());
        assert_eq!(belief.probability(3), 1.0 / MAX_BULLETS as f64);
    }

    #[test]
    fn out_of_range_hypotheses_have_no_mass() {
        let belief = BeliefDistribution::posterior(20).unwrap();
        assert_eq!(belief.probability(0), 0.0);
        assert_eq!(belief.probability(MAX_BULLETS + 1), 0.0);
    }

    #[test]
    fn oversized_pool_is_rejected() {
        assert_eq!(
            BeliefDistribution::posterior(POOL_SIZE + 1),
            Err(BeliefError::RemainingOutOfRange {
                remaining: POOL_SIZE + 1,
                max: POOL_SIZE
            })
        );
    }
}
