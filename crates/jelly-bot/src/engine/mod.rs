//! One-ply expectimax over draw counts.
//!
//! After a reveal the engine enumerates every hypergeometric outcome of each
//! draw count and scores the resulting positions with the post-reveal network.
//! Before a reveal it also averages over the posterior on the total bullet
//! count, scoring clean draws with the intuition network.

pub mod outcome;
pub mod request;
pub mod select;

pub use outcome::{Branch, NextState, post_reveal_branches, pre_reveal_branches, terminal_value};
pub use request::{ActionChoice, ActionRequest, ActionValue, EngineError, EngineMode};

use crate::eval::EngineWeights;
use crate::weights::WeightError;
use jelly_core::belief::telemetry::BeliefMetrics;
use jelly_core::belief::{BeliefCache, BeliefDistribution};
use rand::Rng;
use std::path::Path;
use tracing::{Level, debug, event, info, warn};

pub struct DecisionEngine {
    weights: EngineWeights,
    beliefs: BeliefCache,
    decision_details: bool,
}

impl DecisionEngine {
    pub fn new(weights: EngineWeights) -> Self {
        Self {
            weights,
            beliefs: BeliefCache::new(),
            decision_details: decision_details_enabled(),
        }
    }

    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        value_net: P,
        intuition_net: Q,
    ) -> Result<Self, WeightError> {
        Ok(Self::new(EngineWeights::from_files(value_net, intuition_net)?))
    }

    /// Emit every candidate's value with each decision event.
    pub fn with_decision_details(mut self, enabled: bool) -> Self {
        self.decision_details = enabled;
        self
    }

    pub fn weights(&self) -> &EngineWeights {
        &self.weights
    }

    pub fn belief_cache(&self) -> &BeliefCache {
        &self.beliefs
    }

    /// Posterior on the total bullet count given `remaining` tokens and no reveal.
    pub fn belief(&self, remaining: usize) -> Result<BeliefDistribution, EngineError> {
        self.beliefs
            .get_or_compute(remaining)
            .map_err(|err| EngineError::InvalidRequest(err.to_string()))
    }

    /// Expected value of every legal draw count, in ascending order of `k`.
    pub fn action_values(&self, request: &ActionRequest) -> Result<Vec<ActionValue>, EngineError> {
        request.validate()?;
        let belief = match request.mode() {
            EngineMode::Solver => None,
            EngineMode::Intuition => Some(self.belief(request.remaining)?),
        };
        if let Some(belief) = &belief
            && tracing::enabled!(target: "jelly_bot::belief", Level::DEBUG)
        {
            let metrics = BeliefMetrics::from_belief(belief);
            debug!(
                target: "jelly_bot::belief",
                remaining = metrics.remaining,
                entropy = metrics.entropy,
                expected_bullets = metrics.expected_bullets,
                most_likely = metrics.most_likely,
                degenerate = metrics.degenerate,
                "belief"
            );
        }

        (1..=request.remaining)
            .map(|action| {
                let branches = match &belief {
                    None => post_reveal_branches(
                        request.remaining,
                        request.bullets_remaining,
                        request.score_diff,
                        action,
                    )?,
                    Some(belief) => {
                        pre_reveal_branches(belief, request.remaining, request.score_diff, action)?
                    }
                };
                let value = self.expected_value(&branches)?;
                event!(Level::TRACE, action, value, branches = branches.len(), "candidate");
                Ok(ActionValue { action, value })
            })
            .collect()
    }

    pub fn get_action(&self, request: &ActionRequest) -> Result<ActionChoice, EngineError> {
        self.get_action_with_rng(request, &mut rand::thread_rng())
    }

    /// Like [`get_action`](Self::get_action) with the sampling RNG supplied,
    /// so stochastic selection replays from a seed.
    pub fn get_action_with_rng<R: Rng + ?Sized>(
        &self,
        request: &ActionRequest,
        rng: &mut R,
    ) -> Result<ActionChoice, EngineError> {
        let candidates = self.action_values(request)?;

        let choice = if request.temperature == 0.0 {
            select::select_greedy(&candidates)
        } else {
            let probabilities = select::softmax_probabilities(&candidates, request.temperature);
            let draw = rng.r#gen::<f64>();
            select::sample_by_probability(&candidates, &probabilities, draw).map(|sampled| {
                if sampled.fell_back {
                    warn!(draw, temperature = request.temperature, "softmax fell back to last action");
                }
                sampled.choice
            })
        };
        let choice: ActionChoice = choice
            .ok_or_else(|| EngineError::InvalidRequest("no legal draw".to_string()))?
            .into();

        self.log_decision(request, &choice, &candidates);
        Ok(choice)
    }

    fn expected_value(&self, branches: &[Branch]) -> Result<f64, EngineError> {
        branches.iter().try_fold(0.0, |total, branch| {
            let next_value = self.state_value(&branch.next)?;
            Ok(total + branch.weight * -next_value)
        })
    }

    /// Value of `state` for the player who moves in it.
    fn state_value(&self, state: &NextState) -> Result<f64, EngineError> {
        let value = match *state {
            NextState::Terminal { score_diff } => terminal_value(score_diff),
            NextState::PostReveal {
                remaining,
                bullets_remaining,
                score_diff,
            } => self
                .weights
                .post_reveal
                .evaluate(remaining, bullets_remaining, score_diff)?,
            NextState::PreReveal {
                remaining,
                score_diff,
            } => self.weights.pre_reveal.evaluate(remaining, score_diff)?,
        };
        Ok(value)
    }

    fn log_decision(&self, request: &ActionRequest, choice: &ActionChoice, candidates: &[ActionValue]) {
        if !tracing::enabled!(target: "jelly_bot::engine", Level::INFO) {
            return;
        }
        if self.decision_details {
            let values = candidates
                .iter()
                .map(|c| format!("{}:{:.4}", c.action, c.value))
                .collect::<Vec<_>>()
                .join(" ");
            info!(
                target: "jelly_bot::engine",
                mode = ?request.mode(),
                remaining = request.remaining,
                score_diff = request.score_diff,
                temperature = request.temperature,
                action = choice.action,
                value = choice.value,
                values = %values,
                "decision"
            );
        } else {
            info!(
                target: "jelly_bot::engine",
                mode = ?request.mode(),
                remaining = request.remaining,
                score_diff = request.score_diff,
                temperature = request.temperature,
                action = choice.action,
                value = choice.value,
                "decision"
            );
        }
    }
}

fn decision_details_enabled() -> bool {
    details_flag(std::env::var("JELLY_DECISION_DETAILS").ok().as_deref())
}

fn details_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|raw| matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON"))
}
