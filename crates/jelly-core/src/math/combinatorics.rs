use std::ops::RangeInclusive;

/// Binomial coefficient `C(n, k)` by the multiplicative method.
///
/// Uses `C(n, k) = C(n, n - k)` to keep the loop short; returns `0.0` when
/// `k > n`.
pub fn combinations(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    if k == 0 || k == n {
        return 1.0;
    }
    let k = if k > n / 2 { n - k } else { k };

    let mut result = 1.0f64;
    for i in 1..=k {
        result = result * (n - i + 1) as f64 / i as f64;
    }
    result
}

/// Feasible values of `k` for a hypergeometric draw, or `None` when the
/// parameters are inconsistent (`n > population` or `draws > population`).
pub fn hypergeometric_support(
    population: usize,
    successes: usize,
    draws: usize,
) -> Option<RangeInclusive<usize>> {
    if successes > population || draws > population {
        return None;
    }
    let failures = population - successes;
    let low = draws.saturating_sub(failures);
    let high = draws.min(successes);
    Some(low..=high)
}

/// `P(X = k)` for `draws` tokens taken without replacement from `population`
/// tokens of which `successes` are marked.
///
/// Zero outside the support `[max(0, N - (M - n)), min(N, n)]`.
pub fn hypergeometric_pmf(k: usize, population: usize, successes: usize, draws: usize) -> f64 {
    let Some(support) = hypergeometric_support(population, successes, draws) else {
        return 0.0;
    };
    if !support.contains(&k) {
        return 0.0;
    }

    let denominator = combinations(population, draws);
    if denominator == 0.0 {
        return 0.0;
    }
    combinations(successes, k) * combinations(population - successes, draws - k) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_binomials_are_exact() {
        assert_eq!(combinations(5, 0), 1.0);
        assert_eq!(combinations(5, 5), 1.0);
        assert_eq!(combinations(5, 2), 10.0);
        assert_eq!(combinations(5, 3), 10.0);
        assert_eq!(combinations(27, 8), 2_220_075.0);
        assert_eq!(combinations(3, 4), 0.0);
    }

    #[test]
    fn largest_pool_binomial_is_exact() {
        assert_eq!(combinations(27, 13), 20_058_300.0);
        assert_eq!(combinations(27, 14), 20_058_300.0);
    }

    #[test]
    fn pmf_matches_hand_computed_values() {
        // 2 bullets among 5 tokens, draw 2.
        let p0 = hypergeometric_pmf(0, 5, 2, 2);
        let p1 = hypergeometric_pmf(1, 5, 2, 2);
        let p2 = hypergeometric_pmf(2, 5, 2, 2);
        assert!((p0 - 0.3).abs() < 1e-12);
        assert!((p1 - 0.6).abs() < 1e-12);
        assert!((p2 - 0.1).abs() < 1e-12);
    }

    #[test]
    fn forced_outcomes_have_unit_mass() {
        // Every token is a bullet.
        assert_eq!(hypergeometric_pmf(3, 5, 5, 3), 1.0);
        // No bullets at all.
        assert_eq!(hypergeometric_pmf(0, 9, 0, 4), 1.0);
        // Drawing the whole pool.
        assert_eq!(hypergeometric_pmf(2, 6, 2, 6), 1.0);
    }

    #[test]
    fn inconsistent_parameters_have_no_mass() {
        assert_eq!(hypergeometric_support(3, 4, 1), None);
        assert_eq!(hypergeometric_pmf(1, 3, 4, 1), 0.0);
        assert_eq!(hypergeometric_pmf(0, 3, 1, 4), 0.0);
    }

    proptest! {
        #[test]
        fn pmf_sums_to_one_over_support(
            population in 1usize..=27,
            successes_seed in 0usize..=27,
            draws_seed in 0usize..=27,
        ) {
            let successes = successes_seed % (population + 1);
            let draws = draws_seed % (population + 1);
            let support = hypergeometric_support(population, successes, draws).unwrap();
            let total: f64 = support
                .map(|k| hypergeometric_pmf(k, population, successes, draws))
                .sum();
            prop_assert!((total - 1.0).abs() < 1e-9, "total = {}", total);
        }

        #[test]
        fn pmf_is_zero_outside_support(
            population in 1usize..=27,
            successes_seed in 0usize..=27,
            draws_seed in 0usize..=27,
            k in 0usize..=30,
        ) {
            let successes = successes_seed % (population + 1);
            let draws = draws_seed % (population + 1);
            let support = hypergeometric_support(population, successes, draws).unwrap();
            let p = hypergeometric_pmf(k, population, successes, draws);
            if support.contains(&k) {
                prop_assert!(p > 0.0);
            } else {
                prop_assert_eq!(p, 0.0);
            }
        }

        #[test]
        fn binomial_symmetry_holds(n in 0usize..=27, k_seed in 0usize..=27) {
            let k = k_seed % (n + 1);
            prop_assert_eq!(combinations(n, k), combinations(n, n - k));
        }
    }
}
