//! Game law: pool constants, the scoring formula and the draw process.

use crate::model::pool::PoolState;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens in the pool at the start of every game.
pub const POOL_SIZE: usize = 27;
pub const MIN_BULLETS: usize = 1;
pub const MAX_BULLETS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("draw count must be at least 1")]
    EmptyDraw,
    #[error("cannot draw {requested} tokens from a pool of {remaining}")]
    DrawTooLarge { requested: usize, remaining: usize },
    #[error("pool of {remaining} tokens cannot hold {bullets} bullets")]
    InconsistentPool { remaining: usize, bullets: usize },
}

/// Points earned for drawing `draw_count` tokens of which `bullets_drawn` were bullets.
///
/// A clean draw is worth `2^(k-1)`; any bullet turns that into a loss of
/// `bullets_drawn * 2^(k-1)`. Draws larger than the full pool, or more
/// bullets than tokens drawn, are rejected.
pub fn score(draw_count: usize, bullets_drawn: usize) -> Result<i64, RulesError> {
    if draw_count == 0 {
        return Err(RulesError::EmptyDraw);
    }
    if draw_count > POOL_SIZE {
        return Err(RulesError::DrawTooLarge {
            requested: draw_count,
            remaining: POOL_SIZE,
        });
    }
    if bullets_drawn > draw_count {
        return Err(RulesError::InconsistentPool {
            remaining: draw_count,
            bullets: bullets_drawn,
        });
    }
    let base = 1i64 << (draw_count - 1);
    if bullets_drawn == 0 {
        Ok(base)
    } else {
        // Bounded by 27 * 2^26 after the checks above.
        Ok(-(bullets_drawn as i64) * base)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub bullets_drawn: usize,
    pub remaining: usize,
    pub bullets_remaining: usize,
}

impl DrawOutcome {
    pub fn pool(&self) -> PoolState {
        PoolState::from_parts_unchecked(self.remaining, self.bullets_remaining)
    }
}

/// Draws `draw_count` tokens one at a time without replacement.
///
/// Each token is a bullet with probability `bullets / remaining` at the moment
/// it is drawn. Stops early if the pool empties.
pub fn simulate_draw<R: Rng + ?Sized>(
    rng: &mut R,
    draw_count: usize,
    remaining: usize,
    bullets: usize,
) -> Result<DrawOutcome, RulesError> {
    if draw_count == 0 {
        return Err(RulesError::EmptyDraw);
    }
    if bullets > remaining {
        return Err(RulesError::InconsistentPool { remaining, bullets });
    }

    let mut current_remaining = remaining;
    let mut current_bullets = bullets;
    let mut bullets_drawn = 0usize;

    for _ in 0..draw_count {
        if current_remaining == 0 {
            break;
        }
        let threshold = current_bullets as f64 / current_remaining as f64;
        if rng.r#gen::<f64>() < threshold {
            bullets_drawn += 1;
            current_bullets -= 1;
        }
        current_remaining -= 1;
    }

    Ok(DrawOutcome {
        bullets_drawn,
        remaining: current_remaining,
        bullets_remaining: current_bullets,
    })
}

/// Total bullets for a new game, uniform in `[MIN_BULLETS, MAX_BULLETS]`.
pub fn generate_bullet_count<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.gen_range(MIN_BULLETS..=MAX_BULLETS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn clean_draw_doubles_per_token() {
        assert_eq!(score(1, 0), Ok(1));
        assert_eq!(score(2, 0), Ok(2));
        assert_eq!(score(5, 0), Ok(16));
        assert_eq!(score(27, 0), Ok(1 << 26));
    }

    #[test]
    fn bullets_multiply_the_loss() {
        assert_eq!(score(1, 1), Ok(-1));
        assert_eq!(score(4, 1), Ok(-8));
        assert_eq!(score(4, 3), Ok(-24));
    }

    #[test]
    fn oversized_draws_are_rejected() {
        assert_eq!(
            score(POOL_SIZE + 1, 0),
            Err(RulesError::DrawTooLarge {
                requested: POOL_SIZE + 1,
                remaining: POOL_SIZE
            })
        );
        assert!(score(64, 0).is_err());
        assert!(score(65, 0).is_err());
        assert!(score(usize::MAX, 1).is_err());
        assert_eq!(
            score(2, 3),
            Err(RulesError::InconsistentPool {
                remaining: 2,
                bullets: 3
            })
        );
        assert_eq!(score(POOL_SIZE, POOL_SIZE), Ok(-(POOL_SIZE as i64) << 26));
    }

    proptest! {
        #[test]
        fn clean_draw_law(draw in 1usize..=POOL_SIZE) {
            prop_assert_eq!(score(draw, 0), Ok(2i64.pow(draw as u32 - 1)));
        }

        #[test]
        fn bullet_draw_law(draw in 1usize..=POOL_SIZE, bullets in 1usize..=MAX_BULLETS) {
            prop_assume!(bullets <= draw);
            prop_assert_eq!(
                score(draw, bullets),
                Ok(-(bullets as i64) * 2i64.pow(draw as u32 - 1))
            );
        }
    }

    #[test]
    fn zero_draw_is_rejected() {
        assert_eq!(score(0, 0), Err(RulesError::EmptyDraw));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            simulate_draw(&mut rng, 0, 27, 3),
            Err(RulesError::EmptyDraw)
        );
    }

    #[test]
    fn simulate_draw_conserves_tokens() {
        let mut rng = StdRng::seed_from_u64(7);
        for draw in 1..=10 {
            let outcome = simulate_draw(&mut rng, draw, 20, 5).unwrap();
            assert_eq!(outcome.remaining, 20 - draw);
            assert_eq!(outcome.bullets_remaining + outcome.bullets_drawn, 5);
            assert!(outcome.bullets_drawn <= draw);
        }
    }

    #[test]
    fn simulate_draw_stops_when_pool_empties() {
        let mut rng = StdRng::seed_from_u64(11);
        let outcome = simulate_draw(&mut rng, 10, 3, 1).unwrap();
        assert_eq!(outcome.remaining, 0);
        assert_eq!(outcome.bullets_drawn, 1);
        assert_eq!(outcome.bullets_remaining, 0);
    }

    #[test]
    fn all_bullet_pool_always_hits() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = simulate_draw(&mut rng, 4, 5, 5).unwrap();
        assert_eq!(outcome.bullets_drawn, 4);
        assert_eq!(outcome.bullets_remaining, 1);
    }

    #[test]
    fn simulate_draw_is_reproducible_from_seed() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(
                simulate_draw(&mut a, 6, 27, 8),
                simulate_draw(&mut b, 6, 27, 8)
            );
        }
    }

    #[test]
    fn inconsistent_pool_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            simulate_draw(&mut rng, 1, 2, 3),
            Err(RulesError::InconsistentPool {
                remaining: 2,
                bullets: 3
            })
        );
    }

    #[test]
    fn bullet_count_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut seen = [false; MAX_BULLETS + 1];
        for _ in 0..2_000 {
            let count = generate_bullet_count(&mut rng);
            assert!((MIN_BULLETS..=MAX_BULLETS).contains(&count));
            seen[count] = true;
        }
        assert!(seen[MIN_BULLETS..].iter().all(|hit| *hit));
    }
}
