mod engine;
mod heuristic;
mod random;

pub use engine::EnginePolicy;
pub use heuristic::{HeuristicPolicy, HeuristicStyle};
pub use random::RandomPolicy;

use crate::engine::{ActionRequest, EngineError};
use jelly_core::game::match_state::Observation;
use jelly_core::model::player::Player;

/// Context provided to policies for decision-making
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub player: Player,
    pub observation: &'a Observation,
}

impl<'a> PolicyContext<'a> {
    pub fn new(player: Player, observation: &'a Observation) -> Self {
        Self {
            player,
            observation,
        }
    }

    /// Greedy engine request describing this position.
    pub fn request(&self) -> ActionRequest {
        let obs = self.observation;
        let score_diff = obs.score_diff as f64;
        match obs.bullets_remaining {
            Some(bullets) if obs.bullet_revealed => {
                ActionRequest::post_reveal(obs.remaining, bullets, score_diff)
            }
            _ => ActionRequest::pre_reveal(obs.remaining, score_diff),
        }
    }
}

/// Unified interface for the players a match can seat.
pub trait Policy: Send {
    /// Short label used in logs and result rows.
    fn name(&self) -> &str;

    /// Number of tokens to draw, in `[1, remaining]`.
    fn choose_draw(&mut self, ctx: &PolicyContext) -> Result<usize, EngineError>;

    /// Draw count with the policy's own estimate of its value, if it has one.
    /// Default implementation reports no estimate.
    fn choose_with_value(&mut self, ctx: &PolicyContext) -> Result<(usize, Option<f64>), EngineError> {
        Ok((self.choose_draw(ctx)?, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineMode;

    #[test]
    fn request_hides_bullets_until_revealed() {
        let obs = Observation {
            remaining: 20,
            score_diff: -3,
            bullet_revealed: false,
            bullets_remaining: None,
        };
        let request = PolicyContext::new(Player::One, &obs).request();
        assert_eq!(request.mode(), EngineMode::Intuition);
        assert_eq!(request.score_diff, -3.0);
        assert_eq!(request.temperature, 0.0);
    }

    #[test]
    fn request_carries_revealed_bullets() {
        let obs = Observation {
            remaining: 12,
            score_diff: 4,
            bullet_revealed: true,
            bullets_remaining: Some(2),
        };
        let request = PolicyContext::new(Player::Two, &obs).request();
        assert_eq!(request.mode(), EngineMode::Solver);
        assert_eq!(request.bullets_remaining, 2);
    }
}
