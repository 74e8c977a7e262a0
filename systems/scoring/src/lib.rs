#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scoring formulas, objective predicates, star ratings and achievements.
//!
//! All arithmetic is integer based. Multipliers are expressed in hundredths so
//! that every floor in the scoring formulas is exact.

use munchers_core::{
    AccuracyMultiplier, Achievement, DifficultyTier, Objective, ObjectiveCondition,
    ObjectiveContext, ObjectiveId, ObjectiveKind, SaveData, ScoringBreakdown, SessionSummary,
};

/// Difficulty multipliers per tier, in hundredths.
pub const TIER_MULTIPLIERS: [u32; 5] = [100, 120, 150, 200, 300];

/// Points granted per link of the current streak.
pub const STREAK_POINTS: u32 = 10;

/// Best streak that unlocks [`Achievement::StreakMaster`].
pub const STREAK_MASTER_THRESHOLD: u32 = 10;

/// Cumulative score that unlocks [`Achievement::HighScorer`].
pub const HIGH_SCORER_THRESHOLD: u64 = 1_000;

const HUNDRED: u64 = 100;
const MIN_ACCURACY_MULTIPLIER: u32 = 50;
const MAX_ACCURACY_MULTIPLIER: u32 = 200;

/// Difficulty multiplier of the tier, in hundredths.
#[must_use]
pub const fn tier_multiplier(tier: DifficultyTier) -> u32 {
    TIER_MULTIPLIERS[tier.index()]
}

/// Accuracy percentage for the provided counters; 100 before any eat.
#[must_use]
pub fn accuracy(correct: u32, mistakes: u32) -> u32 {
    let attempts = u64::from(correct) + u64::from(mistakes);
    if attempts == 0 {
        return 100;
    }
    u32::try_from(u64::from(correct) * HUNDRED / attempts).unwrap_or(100)
}

/// Accuracy multiplier for the provided counters: `accuracy / 50` clamped to
/// `[0.5, 2.0]`.
///
/// The ratio is taken from the raw counters rather than the whole-number
/// percentage, so two correct eats and one mistake yield 1.33.
#[must_use]
pub fn accuracy_multiplier(correct: u32, mistakes: u32) -> AccuracyMultiplier {
    let attempts = u64::from(correct) + u64::from(mistakes);
    if attempts == 0 {
        return AccuracyMultiplier::from_hundredths(MAX_ACCURACY_MULTIPLIER);
    }
    let scaled = u64::from(correct) * 2 * HUNDRED / attempts;
    let hundredths = saturate(scaled).clamp(MIN_ACCURACY_MULTIPLIER, MAX_ACCURACY_MULTIPLIER);
    AccuracyMultiplier::from_hundredths(hundredths)
}

/// Inputs of a single scoring action.
#[derive(Clone, Copy, Debug)]
pub struct ScoreInput<'a> {
    /// Points for the action before bonuses.
    pub base: u32,
    /// Objectives of the level.
    pub objectives: &'a [Objective],
    /// Objectives whose points are folded into the breakdown.
    pub completed: &'a [ObjectiveId],
    /// Seconds left on the countdown, if the session is timed.
    pub time_left: Option<u32>,
    /// Countdown length, if the session is timed.
    pub time_limit: Option<u32>,
    /// Correct eats so far, including the one being scored.
    pub correct_eats: u32,
    /// Mistakes so far.
    pub mistakes: u32,
    /// Current streak of correct eats.
    pub streak: u32,
    /// Difficulty tier of the session.
    pub tier: DifficultyTier,
}

/// Itemises the points earned by a scoring action.
#[must_use]
pub fn score(input: &ScoreInput<'_>) -> ScoringBreakdown {
    let base = u64::from(input.base);

    let time_bonus = match (input.time_left, input.time_limit) {
        (Some(left), Some(limit)) if limit > 0 => {
            let left = u64::from(left.min(limit));
            left * base * 50 / (u64::from(limit) * HUNDRED)
        }
        _ => 0,
    };

    let extra = u64::from(tier_multiplier(input.tier).saturating_sub(100));
    let difficulty_bonus = base * extra / HUNDRED;

    let objective_bonus: u64 = input
        .objectives
        .iter()
        .filter(|objective| input.completed.contains(&objective.id))
        .map(|objective| u64::from(objective.points))
        .sum();

    ScoringBreakdown {
        base_points: input.base,
        time_bonus: saturate(time_bonus),
        difficulty_bonus: saturate(difficulty_bonus),
        streak_bonus: input.streak.saturating_mul(STREAK_POINTS),
        objective_bonus: saturate(objective_bonus),
        accuracy_multiplier: accuracy_multiplier(input.correct_eats, input.mistakes),
    }
}

/// Final points of a breakdown: the subtotal scaled by the accuracy multiplier, floored.
#[must_use]
pub fn total(breakdown: &ScoringBreakdown) -> u64 {
    let hundredths = u64::from(breakdown.accuracy_multiplier.hundredths());
    breakdown.subtotal().saturating_mul(hundredths) / HUNDRED
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Evaluates an objective predicate against live figures.
///
/// Thresholded predicates without a target are treated as a target of zero.
#[must_use]
pub fn evaluate(objective: &Objective, context: &ObjectiveContext) -> bool {
    let target = objective.target.unwrap_or(0);
    match objective.condition {
        ObjectiveCondition::Complete => context.remaining_targets == 0,
        ObjectiveCondition::Score => context.score >= u64::from(target),
        ObjectiveCondition::Time => context.time_left.is_some_and(|left| left >= target),
        ObjectiveCondition::Accuracy => context.accuracy >= target,
        ObjectiveCondition::NoMistakes => context.mistakes == 0,
    }
}

/// Whether the condition may complete before the board is cleared.
///
/// Time, accuracy and mistake-free objectives describe how a level was
/// finished, so they only complete once no targets remain.
#[must_use]
pub const fn completes_mid_level(condition: ObjectiveCondition) -> bool {
    matches!(
        condition,
        ObjectiveCondition::Complete | ObjectiveCondition::Score
    )
}

/// Objectives that transition to completed under the provided figures.
///
/// Already completed objectives are skipped, so each objective is reported at
/// most once per session.
#[must_use]
pub fn newly_completed<'a>(
    objectives: &'a [Objective],
    completed: &[ObjectiveId],
    context: &ObjectiveContext,
) -> Vec<&'a Objective> {
    let board_cleared = context.remaining_targets == 0;
    objectives
        .iter()
        .filter(|objective| !completed.contains(&objective.id))
        .filter(|objective| board_cleared || completes_mid_level(objective.condition))
        .filter(|objective| evaluate(objective, context))
        .collect()
}

/// Star rating of a finished session.
///
/// A win earns one star, a completed bonus objective two, and clearing every
/// bonus objective with at least one and a half times the primary points
/// three.
#[must_use]
pub fn stars(won: bool, objectives: &[Objective], completed: &[ObjectiveId], score: u64) -> u8 {
    if !won {
        return 0;
    }

    let mut bonus = objectives
        .iter()
        .filter(|objective| objective.kind == ObjectiveKind::Bonus)
        .peekable();
    if bonus.peek().is_none() {
        return 1;
    }

    let mut any_bonus = false;
    let mut all_bonus = true;
    for objective in bonus {
        if completed.contains(&objective.id) {
            any_bonus = true;
        } else {
            all_bonus = false;
        }
    }

    let primary_points: u64 = objectives
        .iter()
        .filter(|objective| objective.kind == ObjectiveKind::Primary)
        .map(|objective| u64::from(objective.points))
        .sum();

    if all_bonus && score >= primary_points * 3 / 2 {
        3
    } else if any_bonus {
        2
    } else {
        1
    }
}

/// Achievements earned by a session that are not yet unlocked in the save.
///
/// `save` must already include the session's contribution to the cumulative
/// score.
#[must_use]
pub fn achievements(summary: &SessionSummary, save: &SaveData) -> Vec<Achievement> {
    let speedster = match (summary.time_remaining, summary.time_limit) {
        (Some(left), Some(limit)) => u64::from(left) * 2 >= u64::from(limit),
        _ => false,
    };

    let earned = [
        (Achievement::FirstVictory, summary.won),
        (Achievement::PerfectLevel, summary.won && summary.mistakes == 0),
        (Achievement::ThreeStars, summary.stars_earned >= 3),
        (Achievement::Speedster, summary.won && speedster),
        (
            Achievement::StreakMaster,
            summary.best_streak >= STREAK_MASTER_THRESHOLD,
        ),
        (
            Achievement::HighScorer,
            save.total_score >= HIGH_SCORER_THRESHOLD,
        ),
    ];

    earned
        .into_iter()
        .filter(|(achievement, unlocked)| *unlocked && !save.has_achievement(*achievement))
        .map(|(achievement, _)| achievement)
        .collect()
}
