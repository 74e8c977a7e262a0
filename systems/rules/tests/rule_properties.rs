//! Property tests checking rule evaluation against direct arithmetic.

use munchers_core::{ActiveRule, CellValue, Rule};
use munchers_system_rules::{correct_pool, incorrect_pool, is_correct, resolve_plan};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn naive_prime(value: u32) -> bool {
    value >= 2 && (2..value).take_while(|d| d * d <= value).all(|d| value % d != 0)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn multiples_match_modulo(value in 0u32..10_000, target in 1u32..50) {
        let active = ActiveRule::new(Rule::Multiples, target);
        prop_assert_eq!(is_correct(CellValue::Numeric(value), active), value % target == 0);
    }

    #[test]
    fn factors_match_divisibility(value in 0u32..500, target in 1u32..500) {
        let active = ActiveRule::new(Rule::Factors, target);
        let expected = value > 0 && target % value == 0;
        prop_assert_eq!(is_correct(CellValue::Numeric(value), active), expected);
    }

    #[test]
    fn primes_match_naive_primality(value in 0u32..10_000) {
        let active = ActiveRule::new(Rule::Primes, 0);
        prop_assert_eq!(is_correct(CellValue::Numeric(value), active), naive_prime(value));
    }

    #[test]
    fn sums_match_addition(left in 0u32..100, right in 0u32..100, target in 0u32..200) {
        let active = ActiveRule::new(Rule::Addition, target);
        prop_assert_eq!(is_correct(CellValue::sum(left, right), active), left + right == target);
        prop_assert!(!is_correct(CellValue::difference(left, right), active));
    }

    #[test]
    fn differences_match_subtraction(left in 0u32..100, right in 0u32..100, target in 0u32..100) {
        let active = ActiveRule::new(Rule::Subtraction, target);
        let expected = i64::from(left) - i64::from(right) == i64::from(target);
        prop_assert_eq!(is_correct(CellValue::difference(left, right), active), expected);
        prop_assert!(!is_correct(CellValue::sum(left, right), active));
    }

    #[test]
    fn mixed_evaluates_by_operator(
        left in 0u32..100,
        right in 0u32..100,
        target in 0u32..200,
        plus in any::<bool>(),
    ) {
        let active = ActiveRule::new(Rule::Mixed, target);
        let (value, result) = if plus {
            (CellValue::sum(left, right), i64::from(left) + i64::from(right))
        } else {
            (CellValue::difference(left, right), i64::from(left) - i64::from(right))
        };
        prop_assert_eq!(is_correct(value, active), result == i64::from(target));
    }

    #[test]
    fn numeric_values_never_satisfy_expression_rules(value in 0u32..1_000, target in 0u32..100) {
        for rule in [Rule::Addition, Rule::Subtraction, Rule::Mixed] {
            prop_assert!(!is_correct(CellValue::Numeric(value), ActiveRule::new(rule, target)));
        }
    }

    #[test]
    fn incorrect_pools_exclude_correct_values(target in 0u32..40, rule_index in 0usize..6) {
        let rules = [
            Rule::Multiples,
            Rule::Factors,
            Rule::Primes,
            Rule::Addition,
            Rule::Subtraction,
            Rule::Mixed,
        ];
        let active = ActiveRule::new(rules[rule_index], target);
        for value in incorrect_pool(active) {
            prop_assert!(!is_correct(value, active));
        }
        for value in correct_pool(active) {
            prop_assert!(is_correct(value, active));
        }
    }

    #[test]
    fn resolved_plans_are_always_usable(target in 0u32..40, rule_index in 0usize..6, seed in any::<u64>()) {
        let rules = [
            Rule::Multiples,
            Rule::Factors,
            Rule::Primes,
            Rule::Addition,
            Rule::Subtraction,
            Rule::Mixed,
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let plan = resolve_plan(ActiveRule::new(rules[rule_index], target), &mut rng);
        prop_assert!(plan.correct().len() >= 3);
        prop_assert!(!plan.incorrect().is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn incorrect_pools_stay_bounded_for_any_target(target in any::<u32>(), rule_index in 0usize..6) {
        let rules = [
            Rule::Multiples,
            Rule::Factors,
            Rule::Primes,
            Rule::Addition,
            Rule::Subtraction,
            Rule::Mixed,
        ];
        let active = ActiveRule::new(rules[rule_index], target);
        let incorrect = incorrect_pool(active);
        prop_assert!(incorrect.len() <= 256);
        for value in incorrect {
            prop_assert!(!is_correct(value, active));
        }
    }
}
