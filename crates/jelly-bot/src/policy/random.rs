use super::{Policy, PolicyContext};
use crate::engine::EngineError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform legal draw; the floor every other player should beat.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_draw(&mut self, ctx: &PolicyContext) -> Result<usize, EngineError> {
        let remaining = ctx.observation.remaining;
        if remaining == 0 {
            return Err(EngineError::InvalidRequest("pool is empty".to_string()));
        }
        Ok(self.rng.gen_range(1..=remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jelly_core::game::match_state::Observation;
    use jelly_core::model::player::Player;

    #[test]
    fn draws_are_legal_and_seeded() {
        let obs = Observation {
            remaining: 6,
            score_diff: 0,
            bullet_revealed: false,
            bullets_remaining: None,
        };
        let ctx = PolicyContext::new(Player::One, &obs);
        let mut a = RandomPolicy::new(42);
        let mut b = RandomPolicy::new(42);
        for _ in 0..50 {
            let draw = a.choose_draw(&ctx).unwrap();
            assert!((1..=6).contains(&draw));
            assert_eq!(draw, b.choose_draw(&ctx).unwrap());
        }
    }
}
