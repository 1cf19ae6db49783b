use jelly_core::math::DimensionError;
use jelly_core::model::rules::{POOL_SIZE, RulesError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("evaluator input mismatch: {0}")]
    Dimension(#[from] DimensionError),
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Which evaluator family drives the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    /// Bullet count known; exact one-ply expectation.
    Solver,
    /// Bullet count hidden; belief-weighted expectation.
    Intuition,
}

/// Public game state seen by the player to move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub remaining: usize,
    /// Own score minus opponent score.
    pub score_diff: f64,
    pub bullet_revealed: bool,
    /// Ignored until a bullet has been revealed.
    pub bullets_remaining: usize,
    /// `0` selects greedily; larger values sample from a softmax.
    pub temperature: f64,
}

impl ActionRequest {
    pub fn pre_reveal(remaining: usize, score_diff: f64) -> Self {
        Self {
            remaining,
            score_diff,
            bullet_revealed: false,
            bullets_remaining: 0,
            temperature: 0.0,
        }
    }

    pub fn post_reveal(remaining: usize, bullets_remaining: usize, score_diff: f64) -> Self {
        Self {
            remaining,
            score_diff,
            bullet_revealed: true,
            bullets_remaining,
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn mode(&self) -> EngineMode {
        if self.bullet_revealed {
            EngineMode::Solver
        } else {
            EngineMode::Intuition
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=POOL_SIZE).contains(&self.remaining) {
            return Err(EngineError::InvalidRequest(format!(
                "remaining must be in [1, {POOL_SIZE}], got {}",
                self.remaining
            )));
        }
        if self.bullet_revealed && self.bullets_remaining > self.remaining {
            return Err(EngineError::InvalidRequest(format!(
                "{} bullets cannot fit in {} remaining tokens",
                self.bullets_remaining, self.remaining
            )));
        }
        if !self.score_diff.is_finite() {
            return Err(EngineError::InvalidRequest(
                "score differential must be finite".to_string(),
            ));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(EngineError::InvalidRequest(format!(
                "temperature must be finite and non-negative, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Expected value of drawing `action` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionValue {
    pub action: usize,
    pub value: f64,
}

/// Selected draw count and its expected value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionChoice {
    pub action: usize,
    pub value: f64,
}

impl From<ActionValue> for ActionChoice {
    fn from(candidate: ActionValue) -> Self {
        Self {
            action: candidate.action,
            value: candidate.value,
        }
    }
}
