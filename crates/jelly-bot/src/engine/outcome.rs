//! Expansion of one draw into its weighted successor positions.
//!
//! Every successor is expressed from the perspective of the player who moves
//! next, so its score differential is the negation of the mover's.

use jelly_core::belief::BeliefDistribution;
use jelly_core::math::{hypergeometric_pmf, hypergeometric_support};
use jelly_core::model::rules::{RulesError, score};

/// Branches less likely than this are dropped from the solver expectation.
pub const BRANCH_EPSILON: f64 = 1e-9;

/// Position handed to the next mover after a draw resolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextState {
    /// No further decisions; valued by the sign of the differential.
    Terminal { score_diff: f64 },
    /// Bullet count known to both players.
    PostReveal {
        remaining: usize,
        bullets_remaining: usize,
        score_diff: f64,
    },
    /// No bullet seen yet.
    PreReveal { remaining: usize, score_diff: f64 },
}

impl NextState {
    pub fn score_diff(&self) -> f64 {
        match *self {
            NextState::Terminal { score_diff }
            | NextState::PostReveal { score_diff, .. }
            | NextState::PreReveal { score_diff, .. } => score_diff,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NextState::Terminal { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    pub weight: f64,
    pub bullets_drawn: usize,
    pub next: NextState,
}

/// `+1` for a win, `-1` for a loss and `0` for a tie, seen by the side holding `score_diff`.
pub fn terminal_value(score_diff: f64) -> f64 {
    if score_diff > 0.0 {
        1.0
    } else if score_diff < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Successors of drawing `draw_count` tokens when `bullets_remaining` is known.
///
/// The game ends when the last bullet leaves the pool (or the pool empties).
pub fn post_reveal_branches(
    remaining: usize,
    bullets_remaining: usize,
    score_diff: f64,
    draw_count: usize,
) -> Result<Vec<Branch>, RulesError> {
    let Some(support) = hypergeometric_support(remaining, bullets_remaining, draw_count) else {
        return Err(RulesError::DrawTooLarge {
            requested: draw_count,
            remaining,
        });
    };

    let mut branches = Vec::with_capacity(support.clone().count());
    for bullets_drawn in support {
        let weight = hypergeometric_pmf(bullets_drawn, remaining, bullets_remaining, draw_count);
        if weight < BRANCH_EPSILON {
            continue;
        }
        let points = score(draw_count, bullets_drawn)? as f64;
        let next_diff = -(score_diff + points);
        let next_remaining = remaining - draw_count;
        let next_bullets = bullets_remaining - bullets_drawn;

        let next = if next_bullets == 0 || next_remaining == 0 {
            NextState::Terminal {
                score_diff: next_diff,
            }
        } else {
            NextState::PostReveal {
                remaining: next_remaining,
                bullets_remaining: next_bullets,
                score_diff: next_diff,
            }
        };
        branches.push(Branch {
            weight,
            bullets_drawn,
            next,
        });
    }
    Ok(branches)
}

/// Successors of drawing `draw_count` tokens before any bullet is revealed.
///
/// Each significant bullet-count hypothesis contributes a clean branch that
/// stays hidden and one branch per bullet count drawn, which reveals.
/// Weights combine the belief with the hypergeometric law and sum to one.
pub fn pre_reveal_branches(
    belief: &BeliefDistribution,
    remaining: usize,
    score_diff: f64,
    draw_count: usize,
) -> Result<Vec<Branch>, RulesError> {
    if draw_count == 0 {
        return Err(RulesError::EmptyDraw);
    }
    if draw_count > remaining {
        return Err(RulesError::DrawTooLarge {
            requested: draw_count,
            remaining,
        });
    }

    let base = score(draw_count, 0)? as f64;
    let next_remaining = remaining - draw_count;
    let mut branches = Vec::new();

    for (bullets, prior) in belief.significant() {
        let clean = hypergeometric_pmf(0, remaining, bullets, draw_count);
        if clean > 0.0 {
            let next_diff = -(score_diff + base);
            let next = if next_remaining == 0 {
                NextState::Terminal {
                    score_diff: next_diff,
                }
            } else {
                NextState::PreReveal {
                    remaining: next_remaining,
                    score_diff: next_diff,
                }
            };
            branches.push(Branch {
                weight: prior * clean,
                bullets_drawn: 0,
                next,
            });
        }

        for bullets_drawn in 1..=draw_count.min(bullets) {
            let hit = hypergeometric_pmf(bullets_drawn, remaining, bullets, draw_count);
            if hit <= 0.0 {
                continue;
            }
            let next_diff = -(score_diff - bullets_drawn as f64 * base);
            let next_bullets = bullets - bullets_drawn;
            let next = if next_remaining == 0 || next_bullets == 0 {
                NextState::Terminal {
                    score_diff: next_diff,
                }
            } else {
                NextState::PostReveal {
                    remaining: next_remaining,
                    bullets_remaining: next_bullets,
                    score_diff: next_diff,
                }
            };
            branches.push(Branch {
                weight: prior * hit,
                bullets_drawn,
                next,
            });
        }
    }
    Ok(branches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_weight(branches: &[Branch]) -> f64 {
        branches.iter().map(|b| b.weight).sum()
    }

    #[test]
    fn terminal_value_is_sign() {
        assert_eq!(terminal_value(3.0), 1.0);
        assert_eq!(terminal_value(-0.5), -1.0);
        assert_eq!(terminal_value(0.0), 0.0);
    }

    #[test]
    fn drawing_everything_is_a_single_terminal_branch() {
        let branches = post_reveal_branches(5, 5, 0.0, 5).unwrap();
        assert_eq!(branches.len(), 1);
        let branch = branches[0];
        assert_eq!(branch.bullets_drawn, 5);
        assert!((branch.weight - 1.0).abs() < 1e-12);
        // 5 bullets * 2^4 = -80 for the mover, so the next mover sees +80.
        assert_eq!(branch.next, NextState::Terminal { score_diff: 80.0 });
    }

    #[test]
    fn clean_post_reveal_draw_hands_over_negated_diff() {
        let branches = post_reveal_branches(5, 2, 3.0, 1).unwrap();
        assert_eq!(branches.len(), 2);
        let clean = branches.iter().find(|b| b.bullets_drawn == 0).unwrap();
        assert!((clean.weight - 0.6).abs() < 1e-12);
        assert_eq!(
            clean.next,
            NextState::PostReveal {
                remaining: 4,
                bullets_remaining: 2,
                score_diff: -4.0
            }
        );
        let hit = branches.iter().find(|b| b.bullets_drawn == 1).unwrap();
        assert_eq!(
            hit.next,
            NextState::PostReveal {
                remaining: 4,
                bullets_remaining: 1,
                score_diff: -2.0
            }
        );
        assert!((total_weight(&branches) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn last_bullet_ends_the_game() {
        let branches = post_reveal_branches(4, 1, 0.0, 2).unwrap();
        let hit = branches.iter().find(|b| b.bullets_drawn == 1).unwrap();
        assert!(hit.next.is_terminal());
        assert_eq!(hit.next.score_diff(), 2.0);
    }

    #[test]
    fn oversized_draw_is_rejected() {
        assert!(post_reveal_branches(3, 1, 0.0, 4).is_err());
        let belief = BeliefDistribution::posterior(3).unwrap();
        assert!(pre_reveal_branches(&belief, 3, 0.0, 4).is_err());
        assert!(pre_reveal_branches(&belief, 3, 0.0, 0).is_err());
    }

    #[test]
    fn pre_reveal_weights_form_a_distribution() {
        for remaining in [27, 20, 9, 2] {
            let belief = BeliefDistribution::posterior(remaining).unwrap();
            for draw_count in 1..=remaining {
                let branches = pre_reveal_branches(&belief, remaining, 1.0, draw_count).unwrap();
                let total = total_weight(&branches);
                assert!(
                    (total - 1.0).abs() < 1e-7,
                    "remaining {remaining} draw {draw_count}: {total}"
                );
            }
        }
    }

    #[test]
    fn pre_reveal_clean_draw_stays_hidden() {
        let belief = BeliefDistribution::posterior(27).unwrap();
        let branches = pre_reveal_branches(&belief, 27, 0.0, 2).unwrap();
        let clean: Vec<_> = branches.iter().filter(|b| b.bullets_drawn == 0).collect();
        assert_eq!(clean.len(), 8);
        for branch in clean {
            assert_eq!(
                branch.next,
                NextState::PreReveal {
                    remaining: 25,
                    score_diff: -2.0
                }
            );
        }
    }

    #[test]
    fn pre_reveal_hit_reveals_remaining_bullets() {
        let belief = BeliefDistribution::posterior(27).unwrap();
        let branches = pre_reveal_branches(&belief, 27, 0.0, 1).unwrap();
        // Hypothesis r = 1 drawing its only bullet ends the game.
        assert!(
            branches
                .iter()
                .any(|b| b.bullets_drawn == 1 && b.next == NextState::Terminal { score_diff: 1.0 })
        );
        assert!(branches.iter().any(|b| b.next
            == NextState::PostReveal {
                remaining: 26,
                bullets_remaining: 7,
                score_diff: 1.0
            }));
    }

    #[test]
    fn emptying_the_pool_is_terminal_before_reveal() {
        let belief = BeliefDistribution::posterior(2).unwrap();
        let branches = pre_reveal_branches(&belief, 2, 0.0, 2).unwrap();
        assert!(branches.iter().all(|b| b.next.is_terminal()));
    }
}
