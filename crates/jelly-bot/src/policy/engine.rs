use super::{Policy, PolicyContext};
use crate::engine::{DecisionEngine, EngineError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

/// Seats a shared [`DecisionEngine`] with its own sampling RNG.
pub struct EnginePolicy {
    engine: Arc<DecisionEngine>,
    temperature: f64,
    rng: StdRng,
    label: String,
}

impl EnginePolicy {
    pub fn new(engine: Arc<DecisionEngine>, seed: u64) -> Self {
        Self {
            engine,
            temperature: 0.0,
            rng: StdRng::seed_from_u64(seed),
            label: "engine".to_string(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

impl Policy for EnginePolicy {
    fn name(&self) -> &str {
        &self.label
    }

    fn choose_draw(&mut self, ctx: &PolicyContext) -> Result<usize, EngineError> {
        Ok(self.choose_with_value(ctx)?.0)
    }

    fn choose_with_value(&mut self, ctx: &PolicyContext) -> Result<(usize, Option<f64>), EngineError> {
        let request = ctx.request().with_temperature(self.temperature);
        let choice = self.engine.get_action_with_rng(&request, &mut self.rng)?;
        Ok((choice.action, Some(choice.value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::EngineWeights;
    use jelly_core::game::match_state::Observation;
    use jelly_core::model::player::Player;

    fn shared_engine() -> Arc<DecisionEngine> {
        Arc::new(DecisionEngine::new(EngineWeights::constant(0.2, -0.1).unwrap()))
    }

    #[test]
    fn engine_policy_reports_value() {
        let mut policy = EnginePolicy::new(shared_engine(), 1);
        let obs = Observation {
            remaining: 27,
            score_diff: 0,
            bullet_revealed: false,
            bullets_remaining: None,
        };
        let (draw, value) = policy
            .choose_with_value(&PolicyContext::new(Player::One, &obs))
            .unwrap();
        assert!((1..=27).contains(&draw));
        assert!(value.is_some_and(|v| v.abs() <= 1.0));
    }

    #[test]
    fn seeded_policies_agree() {
        let engine = shared_engine();
        let obs = Observation {
            remaining: 15,
            score_diff: 2,
            bullet_revealed: true,
            bullets_remaining: Some(3),
        };
        let ctx = PolicyContext::new(Player::Two, &obs);
        let mut a = EnginePolicy::new(Arc::clone(&engine), 9).with_temperature(1.0);
        let mut b = EnginePolicy::new(engine, 9).with_temperature(1.0);
        for _ in 0..8 {
            assert_eq!(a.choose_draw(&ctx).unwrap(), b.choose_draw(&ctx).unwrap());
        }
    }

    #[test]
    fn label_is_configurable() {
        let policy = EnginePolicy::new(shared_engine(), 0).with_label("engine-t0.5");
        assert_eq!(policy.name(), "engine-t0.5");
    }
}
