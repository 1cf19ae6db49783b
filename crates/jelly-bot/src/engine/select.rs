//! Action selection over per-draw expected values.

use super::request::ActionValue;

/// Highest value wins; ties go to the smallest draw count.
pub fn select_greedy(candidates: &[ActionValue]) -> Option<ActionValue> {
    let mut best: Option<ActionValue> = None;
    for candidate in candidates {
        match best {
            Some(current) if candidate.value <= current.value => {}
            _ => best = Some(*candidate),
        }
    }
    best
}

/// Boltzmann weights `exp((v - max) / T)`, normalized.
pub fn softmax_probabilities(candidates: &[ActionValue], temperature: f64) -> Vec<f64> {
    let max = candidates
        .iter()
        .map(|c| c.value)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = candidates
        .iter()
        .map(|c| ((c.value - max) / temperature).exp())
        .collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampled {
    pub choice: ActionValue,
    /// True when rounding left `draw` above the cumulative mass.
    pub fell_back: bool,
}

/// Inverse-CDF sample: the first candidate whose cumulative probability
/// reaches `draw` (expected in `[0, 1)`); the last candidate otherwise.
pub fn sample_by_probability(
    candidates: &[ActionValue],
    probabilities: &[f64],
    draw: f64,
) -> Option<Sampled> {
    let mut cumulative = 0.0;
    for (candidate, p) in candidates.iter().zip(probabilities) {
        cumulative += p;
        if draw <= cumulative {
            return Some(Sampled {
                choice: *candidate,
                fell_back: false,
            });
        }
    }
    candidates.last().map(|choice| Sampled {
        choice: *choice,
        fell_back: true,
    })
}
