//! Fixed-width feature vectors for the two value networks.
//!
//! Indices outside a one-hot block's range leave that block all zeros.

use jelly_core::math::score_feature;
use jelly_core::model::rules::{MAX_BULLETS, POOL_SIZE};

/// Largest remaining-pool size with its own slot in the post-reveal encoding.
pub const POST_REVEAL_MAX_REMAINING: usize = POOL_SIZE - 1;
/// Largest bullet count with its own slot in the post-reveal encoding.
pub const POST_REVEAL_MAX_BULLETS: usize = MAX_BULLETS - 1;

/// `onehot(remaining, 1..=26) ++ onehot(bullets, 1..=7) ++ [score]`
pub const POST_REVEAL_INPUT: usize = POST_REVEAL_MAX_REMAINING + POST_REVEAL_MAX_BULLETS + 1;
/// `onehot(remaining, 1..=27) ++ [score]`
pub const PRE_REVEAL_INPUT: usize = POOL_SIZE + 1;

fn one_hot(block: &mut [f32], index: usize) {
    if (1..=block.len()).contains(&index) {
        block[index - 1] = 1.0;
    }
}

pub fn encode_post_reveal(
    remaining: usize,
    bullets_remaining: usize,
    score_diff: f64,
) -> [f32; POST_REVEAL_INPUT] {
    let mut features = [0.0f32; POST_REVEAL_INPUT];
    let (pool_block, rest) = features.split_at_mut(POST_REVEAL_MAX_REMAINING);
    let (bullet_block, score_slot) = rest.split_at_mut(POST_REVEAL_MAX_BULLETS);
    one_hot(pool_block, remaining);
    one_hot(bullet_block, bullets_remaining);
    score_slot[0] = score_feature(score_diff);
    features
}

pub fn encode_pre_reveal(remaining: usize, score_diff: f64) -> [f32; PRE_REVEAL_INPUT] {
    let mut features = [0.0f32; PRE_REVEAL_INPUT];
    one_hot(&mut features[..POOL_SIZE], remaining);
    features[POOL_SIZE] = score_feature(score_diff);
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_network_inputs() {
        assert_eq!(POST_REVEAL_INPUT, 34);
        assert_eq!(PRE_REVEAL_INPUT, 28);
    }

    #[test]
    fn post_reveal_sets_one_slot_per_block() {
        let features = encode_post_reveal(10, 3, 0.0);
        assert_eq!(features[9], 1.0);
        assert_eq!(features[26 + 2], 1.0);
        assert_eq!(features.iter().filter(|v| **v == 1.0).count(), 2);
        assert_eq!(features[33], 0.0);
    }

    #[test]
    fn post_reveal_out_of_range_leaves_blocks_empty() {
        let features = encode_post_reveal(27, 8, 5.0);
        assert!(features[..33].iter().all(|v| *v == 0.0));
        assert!(features[33] > 0.0);
    }

    #[test]
    fn pre_reveal_covers_full_pool() {
        let features = encode_pre_reveal(27, -3.0);
        assert_eq!(features[26], 1.0);
        assert!(features[27] < 0.0);
        let empty = encode_pre_reveal(0, 0.0);
        assert!(empty.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn score_slot_is_clamped() {
        assert_eq!(encode_pre_reveal(5, 1e30)[27], 1.0);
        assert_eq!(encode_post_reveal(5, 1, -1e30)[33], -1.0);
    }
}
