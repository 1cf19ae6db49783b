use super::BeliefDistribution;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeliefMetrics {
    pub remaining: usize,
    pub entropy: f64,
    pub expected_bullets: f64,
    pub most_likely: usize,
    pub degenerate: bool,
}

impl BeliefMetrics {
    pub fn from_belief(belief: &BeliefDistribution) -> Self {
        let entropy = belief
            .iter()
            .filter(|(_, p)| *p > 0.0)
            .map(|(_, p)| -p * p.ln())
            .sum();

        let most_likely = belief
            .iter()
            .fold((0usize, f64::NEG_INFINITY), |best, (bullets, p)| {
                if p > best.1 { (bullets, p) } else { best }
            })
            .0;

        Self {
            remaining: belief.remaining(),
            entropy,
            expected_bullets: belief.expected_bullets(),
            most_likely,
            degenerate: belief.is_degenerate(),
        }
    }
}
