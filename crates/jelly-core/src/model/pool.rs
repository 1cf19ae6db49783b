use crate::model::rules::{DrawOutcome, POOL_SIZE, RulesError};
use serde::{Deserialize, Serialize};

/// Tokens left in the shared pool and how many of them are bullets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolState {
    remaining: usize,
    bullets_remaining: usize,
}

impl PoolState {
    pub fn new(remaining: usize, bullets_remaining: usize) -> Result<Self, RulesError> {
        if bullets_remaining > remaining {
            return Err(RulesError::InconsistentPool {
                remaining,
                bullets: bullets_remaining,
            });
        }
        Ok(Self {
            remaining,
            bullets_remaining,
        })
    }

    /// Full pool holding `bullets` bullets.
    pub fn fresh(bullets: usize) -> Result<Self, RulesError> {
        Self::new(POOL_SIZE, bullets)
    }

    pub(crate) const fn from_parts_unchecked(remaining: usize, bullets_remaining: usize) -> Self {
        Self {
            remaining,
            bullets_remaining,
        }
    }

    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    pub const fn bullets_remaining(&self) -> usize {
        self.bullets_remaining
    }

    pub const fn drawn(&self) -> usize {
        POOL_SIZE.saturating_sub(self.remaining)
    }

    /// Play ends once the last bullet has been drawn.
    pub const fn is_exhausted(&self) -> bool {
        self.bullets_remaining == 0
    }

    pub fn is_legal_draw(&self, draw_count: usize) -> bool {
        (1..=self.remaining).contains(&draw_count)
    }

    pub fn apply(&mut self, outcome: &DrawOutcome) {
        debug_assert!(outcome.remaining <= self.remaining);
        debug_assert!(outcome.bullets_remaining <= self.bullets_remaining);
        self.remaining = outcome.remaining;
        self.bullets_remaining = outcome.bullets_remaining;
    }
}

#[cfg(test)]
mod tests {
    use super::PoolState;
    use crate::model::rules::{DrawOutcome, POOL_SIZE, RulesError};

    #[test]
    fn rejects_more_bullets_than_tokens() {
        assert_eq!(
            PoolState::new(2, 3),
            Err(RulesError::InconsistentPool {
                remaining: 2,
                bullets: 3
            })
        );
    }

    #[test]
    fn legal_draws_span_one_to_remaining() {
        let pool = PoolState::new(4, 1).unwrap();
        assert!(!pool.is_legal_draw(0));
        assert!(pool.is_legal_draw(1));
        assert!(pool.is_legal_draw(4));
        assert!(!pool.is_legal_draw(5));
    }

    #[test]
    fn apply_tracks_outcome() {
        let mut pool = PoolState::fresh(3).unwrap();
        assert_eq!(pool.drawn(), 0);
        pool.apply(&DrawOutcome {
            bullets_drawn: 1,
            remaining: POOL_SIZE - 4,
            bullets_remaining: 2,
        });
        assert_eq!(pool.remaining(), POOL_SIZE - 4);
        assert_eq!(pool.drawn(), 4);
        assert!(!pool.is_exhausted());
    }
}
