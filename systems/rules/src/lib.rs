#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure rule evaluation and candidate pools used to build puzzle grids.
//!
//! [`is_correct`] is the single source of truth for whether a cell value
//! satisfies the active rule. Cached target flags elsewhere in the engine are
//! only hints and are re-derived through this function before any gameplay
//! decision.

use munchers_core::{ActiveRule, CellValue, Operator, Rule};
use rand::Rng;
use tracing::{debug, warn};

/// Minimum number of correct candidates a plan needs before it can seed a grid.
pub const MIN_CORRECT_POOL: usize = 3;

/// Number of alternative target numbers tried before falling back to primes.
pub const MAX_RETARGET_ATTEMPTS: u32 = 10;

const MAX_MULTIPLIER: u32 = 12;
const PRIME_CEILING: u32 = 100;
const FACTOR_FLOOR: u32 = 12;
const FACTOR_DECOY_CEILING: u32 = 144;
const MAX_SUBTRAHEND: u32 = 12;
const MAX_LEFT_OPERAND: u32 = 24;
const OPERAND_SLACK: u32 = 3;

const MULTIPLES_TARGETS: (u32, u32) = (2, 12);
const FACTOR_TARGETS: [u32; 9] = [12, 18, 20, 24, 30, 36, 40, 48, 60];
const SUM_TARGETS: (u32, u32) = (5, 20);
const DIFFERENCE_TARGETS: (u32, u32) = (1, 15);

const HAND_BUILT_CORRECT: [u32; 6] = [2, 3, 5, 7, 11, 13];
const HAND_BUILT_INCORRECT: [u32; 6] = [1, 4, 6, 8, 9, 10];

/// Decides whether a cell value satisfies the rule.
#[must_use]
pub fn is_correct(value: CellValue, active: ActiveRule) -> bool {
    let target = active.target_number;
    match (active.rule, value) {
        (Rule::Multiples, CellValue::Numeric(number)) => target > 0 && number % target == 0,
        (Rule::Factors, CellValue::Numeric(number)) => {
            target > 0 && number > 0 && target % number == 0
        }
        (Rule::Primes, CellValue::Numeric(number)) => is_prime(number),
        (
            Rule::Addition,
            CellValue::Expression {
                operator: Operator::Plus,
                ..
            },
        )
        | (
            Rule::Subtraction,
            CellValue::Expression {
                operator: Operator::Minus,
                ..
            },
        )
        | (Rule::Mixed, CellValue::Expression { .. }) => value.evaluate() == i64::from(target),
        _ => false,
    }
}

/// Trial-division primality test; values below two are not prime.
#[must_use]
pub fn is_prime(value: u32) -> bool {
    if value < 2 {
        return false;
    }
    if value < 4 {
        return true;
    }
    if value % 2 == 0 {
        return false;
    }
    let value = u64::from(value);
    let mut divisor = 3u64;
    while divisor * divisor <= value {
        if value % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

/// Ordered values that satisfy the rule.
#[must_use]
pub fn correct_pool(active: ActiveRule) -> Vec<CellValue> {
    let target = active.target_number;
    match active.rule {
        Rule::Multiples => {
            if target == 0 {
                return Vec::new();
            }
            (1..=MAX_MULTIPLIER)
                .filter_map(|factor| target.checked_mul(factor))
                .map(CellValue::Numeric)
                .collect()
        }
        Rule::Factors => divisors(target).into_iter().map(CellValue::Numeric).collect(),
        Rule::Primes => (2..=PRIME_CEILING)
            .filter(|candidate| is_prime(*candidate))
            .map(CellValue::Numeric)
            .collect(),
        Rule::Addition => sums_equal_to(target),
        Rule::Subtraction => differences_equal_to(target),
        Rule::Mixed => interleave(sums_equal_to(target), differences_equal_to(target)),
    }
}

/// Values that look plausible for the rule but never satisfy it.
///
/// Candidates sit within a few steps of the correct values, so the pool size
/// does not grow with the target number.
#[must_use]
pub fn incorrect_pool(active: ActiveRule) -> Vec<CellValue> {
    let target = active.target_number;
    let candidates = match active.rule {
        Rule::Multiples => multiple_decoys(target),
        Rule::Factors => {
            let ceiling = target
                .saturating_mul(2)
                .clamp(FACTOR_FLOOR, FACTOR_DECOY_CEILING);
            (1..=ceiling).map(CellValue::Numeric).collect()
        }
        Rule::Primes => (1..=PRIME_CEILING).map(CellValue::Numeric).collect(),
        Rule::Addition => sum_decoys(target),
        Rule::Subtraction => difference_decoys(target),
        Rule::Mixed => interleave(sum_decoys(target), difference_decoys(target)),
    };
    candidates
        .into_iter()
        .filter(|value| !is_correct(*value, active))
        .collect()
}

fn divisors(target: u32) -> Vec<u32> {
    let mut low = Vec::new();
    let mut high = Vec::new();
    let mut candidate = 1u32;
    while candidate <= target / candidate {
        if target % candidate == 0 {
            low.push(candidate);
            let pair = target / candidate;
            if pair != candidate {
                high.push(pair);
            }
        }
        candidate += 1;
    }
    low.extend(high.into_iter().rev());
    low
}

fn sums_equal_to(target: u32) -> Vec<CellValue> {
    (1..target.min(MAX_LEFT_OPERAND + 1))
        .map(|left| CellValue::sum(left, target - left))
        .collect()
}

fn differences_equal_to(target: u32) -> Vec<CellValue> {
    (1..=MAX_SUBTRAHEND)
        .filter_map(|right| target.checked_add(right).map(|left| (left, right)))
        .map(|(left, right)| CellValue::difference(left, right))
        .collect()
}

/// Results one to [`OPERAND_SLACK`] away from the target, nearest first.
fn near_misses(target: u32) -> impl Iterator<Item = u32> {
    (1..=OPERAND_SLACK)
        .flat_map(move |offset| [target.checked_sub(offset), target.checked_add(offset)])
        .flatten()
}

fn multiple_decoys(target: u32) -> Vec<CellValue> {
    let mut values: Vec<u32> = (0..=MAX_MULTIPLIER)
        .filter_map(|factor| target.checked_mul(factor))
        .flat_map(near_misses)
        .filter(|value| *value > 0)
        .collect();
    values.sort_unstable();
    values.dedup();
    values.into_iter().map(CellValue::Numeric).collect()
}

fn sum_decoys(target: u32) -> Vec<CellValue> {
    near_misses(target)
        .flat_map(|sum| {
            (1..sum.min(MAX_LEFT_OPERAND + 1)).map(move |left| CellValue::sum(left, sum - left))
        })
        .collect()
}

fn difference_decoys(target: u32) -> Vec<CellValue> {
    near_misses(target)
        .flat_map(|difference| {
            (1..=MAX_SUBTRAHEND).filter_map(move |right| {
                difference
                    .checked_add(right)
                    .map(|left| CellValue::difference(left, right))
            })
        })
        .collect()
}

fn interleave(first: Vec<CellValue>, second: Vec<CellValue>) -> Vec<CellValue> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    let mut first = first.into_iter();
    let mut second = second.into_iter();
    loop {
        match (first.next(), second.next()) {
            (None, None) => break,
            (left, right) => merged.extend(left.into_iter().chain(right)),
        }
    }
    merged
}

/// How the plan's rule and target were obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanFallback {
    /// The requested rule and target produced enough candidates.
    None,
    /// A different target number for the same rule was selected.
    AlternativeTarget {
        /// Number of alternative targets tried, including the accepted one.
        attempts: u32,
    },
    /// Retries were exhausted and the primes rule was used instead.
    Primes,
    /// Every generated pool was degenerate; fixed prime pools were used.
    HandBuilt,
}

/// Rule, target, and candidate pools ready to seed a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulePlan {
    active: ActiveRule,
    correct: Vec<CellValue>,
    incorrect: Vec<CellValue>,
    fallback: PlanFallback,
}

impl RulePlan {
    /// Rule and target number the pools were generated for.
    #[must_use]
    pub const fn active(&self) -> ActiveRule {
        self.active
    }

    /// Candidates satisfying the rule.
    #[must_use]
    pub fn correct(&self) -> &[CellValue] {
        &self.correct
    }

    /// Candidates never satisfying the rule.
    #[must_use]
    pub fn incorrect(&self) -> &[CellValue] {
        &self.incorrect
    }

    /// Fallback step that produced the plan.
    #[must_use]
    pub const fn fallback(&self) -> PlanFallback {
        self.fallback
    }
}

/// Resolves a usable plan for the requested rule, retrying degenerate targets.
///
/// A plan is usable when at least [`MIN_CORRECT_POOL`] correct and one
/// incorrect candidate exist. Otherwise up to [`MAX_RETARGET_ATTEMPTS`]
/// alternative targets are drawn, then the primes rule is tried, and finally
/// fixed hand-built prime pools are returned. This never fails.
pub fn resolve_plan<R>(requested: ActiveRule, rng: &mut R) -> RulePlan
where
    R: Rng + ?Sized,
{
    resolve_with(requested, rng, |active| {
        (correct_pool(active), incorrect_pool(active))
    })
}

fn resolve_with<R, F>(requested: ActiveRule, rng: &mut R, mut pools: F) -> RulePlan
where
    R: Rng + ?Sized,
    F: FnMut(ActiveRule) -> (Vec<CellValue>, Vec<CellValue>),
{
    if let Some(plan) = viable_plan(requested, PlanFallback::None, &mut pools) {
        return plan;
    }

    for attempt in 1..=MAX_RETARGET_ATTEMPTS {
        let Some(target_number) = alternative_target(requested.rule, rng) else {
            break;
        };
        let candidate = ActiveRule::new(requested.rule, target_number);
        debug!(
            rule = ?requested.rule,
            rejected = requested.target_number,
            candidate = target_number,
            attempt,
            "retrying degenerate rule target"
        );
        let fallback = PlanFallback::AlternativeTarget { attempts: attempt };
        if let Some(plan) = viable_plan(candidate, fallback, &mut pools) {
            return plan;
        }
    }

    warn!(
        rule = ?requested.rule,
        target = requested.target_number,
        "no viable target found; falling back to primes"
    );
    let primes = ActiveRule::new(Rule::Primes, 0);
    if let Some(plan) = viable_plan(primes, PlanFallback::Primes, &mut pools) {
        return plan;
    }

    warn!("primes pools degenerate; using hand-built prime grid values");
    RulePlan {
        active: primes,
        correct: HAND_BUILT_CORRECT.map(CellValue::Numeric).to_vec(),
        incorrect: HAND_BUILT_INCORRECT.map(CellValue::Numeric).to_vec(),
        fallback: PlanFallback::HandBuilt,
    }
}

fn viable_plan<F>(active: ActiveRule, fallback: PlanFallback, pools: &mut F) -> Option<RulePlan>
where
    F: FnMut(ActiveRule) -> (Vec<CellValue>, Vec<CellValue>),
{
    let (correct, incorrect) = pools(active);
    if correct.len() < MIN_CORRECT_POOL || incorrect.is_empty() {
        return None;
    }
    Some(RulePlan {
        active,
        correct,
        incorrect,
        fallback,
    })
}

fn alternative_target<R>(rule: Rule, rng: &mut R) -> Option<u32>
where
    R: Rng + ?Sized,
{
    match rule {
        Rule::Multiples => Some(rng.gen_range(MULTIPLES_TARGETS.0..=MULTIPLES_TARGETS.1)),
        Rule::Factors => Some(FACTOR_TARGETS[rng.gen_range(0..FACTOR_TARGETS.len())]),
        Rule::Addition | Rule::Mixed => Some(rng.gen_range(SUM_TARGETS.0..=SUM_TARGETS.1)),
        Rule::Subtraction => Some(rng.gen_range(DIFFERENCE_TARGETS.0..=DIFFERENCE_TARGETS.1)),
        Rule::Primes => None,
    }
}
