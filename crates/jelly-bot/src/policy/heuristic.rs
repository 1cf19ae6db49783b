use super::{Policy, PolicyContext};
use crate::engine::EngineError;
use jelly_core::belief::BeliefDistribution;
use serde::{Deserialize, Serialize};
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicStyle {
    /// Always draws a single token.
    Cautious,
    /// Draws about one gap between expected bullets.
    Ratio,
}

/// Rule-based baseline opponent.
pub struct HeuristicPolicy {
    style: HeuristicStyle,
}

impl HeuristicPolicy {
    pub fn new(style: HeuristicStyle) -> Self {
        Self { style }
    }

    pub fn cautious() -> Self {
        Self::new(HeuristicStyle::Cautious)
    }

    pub fn ratio() -> Self {
        Self::new(HeuristicStyle::Ratio)
    }

    pub fn style(&self) -> HeuristicStyle {
        self.style
    }
}

impl Policy for HeuristicPolicy {
    fn name(&self) -> &str {
        match self.style {
            HeuristicStyle::Cautious => "heuristic-cautious",
            HeuristicStyle::Ratio => "heuristic-ratio",
        }
    }

    fn choose_draw(&mut self, ctx: &PolicyContext) -> Result<usize, EngineError> {
        let remaining = ctx.observation.remaining;
        if remaining == 0 {
            return Err(EngineError::InvalidRequest("pool is empty".to_string()));
        }

        let (draw, reason) = match self.style {
            HeuristicStyle::Cautious => (1, "cautious_single"),
            HeuristicStyle::Ratio => {
                let expected = expected_bullets(ctx)?;
                let gap = (remaining as f64 / (expected + 1.0)).floor() as usize;
                (gap.clamp(1, remaining), "ratio_gap")
            }
        };
        log_draw_decision(ctx, self.style, draw, reason);
        Ok(draw)
    }
}

/// Exact count once revealed; posterior mean before.
fn expected_bullets(ctx: &PolicyContext) -> Result<f64, EngineError> {
    let obs = ctx.observation;
    match obs.bullets_remaining {
        Some(bullets) if obs.bullet_revealed => Ok(bullets as f64),
        _ => BeliefDistribution::posterior(obs.remaining)
            .map(|belief| belief.expected_bullets())
            .map_err(|err| EngineError::InvalidRequest(err.to_string())),
    }
}

fn log_draw_decision(ctx: &PolicyContext, style: HeuristicStyle, draw: usize, reason: &str) {
    if !tracing::enabled!(target: "jelly_bot::heuristic", Level::INFO) {
        return;
    }
    event!(
        target: "jelly_bot::heuristic",
        Level::INFO,
        player = %ctx.player,
        style = ?style,
        remaining = ctx.observation.remaining,
        revealed = ctx.observation.bullet_revealed,
        draw,
        reason
    );
}
