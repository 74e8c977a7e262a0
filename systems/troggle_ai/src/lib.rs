#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Behavior policies that decide where each troggle steps next.
//!
//! Every troggle carries an immutable [`EnemyBehaviorProfile`] derived from its
//! kind and the difficulty tier, plus a small amount of runtime state: a
//! cached path for pathfinding troggles and a move cooldown that turns the
//! profile speed into a step cadence. [`next_position`] is the single decision
//! entry point; the caller owns collision handling and applies the returned
//! position once every troggle has decided.

mod pathfinding;

use std::collections::VecDeque;

use munchers_core::{
    DifficultyTier, EnemyBehaviorProfile, EnemyKind, GridSize, Position, TroggleId,
    TroggleSnapshot,
};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

pub use pathfinding::shortest_path;

/// Ticks a troggle with unit speed waits between steps.
pub const BASE_TICKS_PER_MOVE: f32 = 3.0;

/// Number of nearby targets a blocker considers when choosing an intercept.
pub const BLOCKER_CANDIDATES: usize = 3;

const TIER_TRACKING_STEP: f32 = 0.05;
const TIER_SPEED_STEP: f32 = 0.1;

/// Tier-one profile for the provided kind.
#[must_use]
pub const fn base_profile(kind: EnemyKind) -> EnemyBehaviorProfile {
    let (speed, intelligence, aggressiveness, coordinated) = match kind {
        EnemyKind::Standard => (1.0, 0.5, 0.5, false),
        EnemyKind::Speed => (2.0, 0.3, 0.6, false),
        EnemyKind::Smart => (1.0, 0.9, 0.5, false),
        EnemyKind::Blocker => (1.0, 0.7, 0.4, false),
        EnemyKind::Hunter => (1.2, 0.7, 0.8, true),
    };
    EnemyBehaviorProfile {
        kind,
        speed,
        intelligence,
        aggressiveness,
        coordinated,
    }
}

/// Profile for the provided kind scaled to the difficulty tier.
///
/// Tracking probabilities rise by 0.05 per tier above the first and are capped
/// at one; speed rises by ten percent per tier.
#[must_use]
pub fn profile_for(kind: EnemyKind, tier: DifficultyTier) -> EnemyBehaviorProfile {
    let base = base_profile(kind);
    let steps = f32::from(tier.get().saturating_sub(1));
    EnemyBehaviorProfile {
        speed: base.speed * (1.0 + TIER_SPEED_STEP * steps),
        intelligence: (base.intelligence + TIER_TRACKING_STEP * steps).min(1.0),
        aggressiveness: (base.aggressiveness + TIER_TRACKING_STEP * steps).min(1.0),
        ..base
    }
}

/// Profile used by classic sessions: a standard troggle that never tracks.
///
/// Its speed yields one step on every call, so a classic troggle never waits
/// on a cooldown.
#[must_use]
pub const fn classic_profile() -> EnemyBehaviorProfile {
    EnemyBehaviorProfile {
        speed: BASE_TICKS_PER_MOVE,
        intelligence: 0.0,
        aggressiveness: 0.0,
        ..base_profile(EnemyKind::Standard)
    }
}

/// Number of ticks between two steps for the provided profile.
#[must_use]
pub fn ticks_per_move(profile: &EnemyBehaviorProfile) -> u32 {
    if profile.speed <= 0.0 {
        return u32::MAX;
    }
    let ticks = (BASE_TICKS_PER_MOVE / profile.speed).round();
    if ticks < 1.0 {
        1
    } else {
        ticks as u32
    }
}

/// Runtime state of a single troggle.
#[derive(Clone, Debug, PartialEq)]
pub struct Troggle {
    id: TroggleId,
    position: Position,
    profile: EnemyBehaviorProfile,
    planned_path: VecDeque<Position>,
    move_cooldown: u32,
}

impl Troggle {
    /// Creates a troggle ready to move on its first tick.
    #[must_use]
    pub fn new(id: TroggleId, position: Position, profile: EnemyBehaviorProfile) -> Self {
        Self {
            id,
            position,
            profile,
            planned_path: VecDeque::new(),
            move_cooldown: 0,
        }
    }

    /// Identifier of the troggle.
    #[must_use]
    pub const fn id(&self) -> TroggleId {
        self.id
    }

    /// Cell currently occupied by the troggle.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Behavior family of the troggle.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.profile.kind
    }

    /// Behavior tuning of the troggle.
    #[must_use]
    pub const fn profile(&self) -> &EnemyBehaviorProfile {
        &self.profile
    }

    /// Steps queued by the pathfinding policy.
    #[must_use]
    pub fn planned_path(&self) -> &VecDeque<Position> {
        &self.planned_path
    }

    /// Ticks left before the troggle may move again.
    #[must_use]
    pub const fn move_cooldown(&self) -> u32 {
        self.move_cooldown
    }

    /// Immutable view shared with sibling troggles.
    #[must_use]
    pub const fn snapshot(&self) -> TroggleSnapshot {
        TroggleSnapshot {
            id: self.id,
            kind: self.profile.kind,
            position: self.position,
        }
    }

    /// Moves the troggle to the provided cell.
    pub fn relocate(&mut self, position: Position) {
        self.position = position;
    }
}

/// Read-only inputs shared by every behavior policy.
#[derive(Clone, Copy, Debug)]
pub struct AiContext<'a> {
    /// Cell occupied by the Muncher.
    pub muncher: Position,
    /// Dimensions of the grid.
    pub size: GridSize,
    /// Live target cells, validated against the active rule.
    pub targets: &'a [Position],
    /// Snapshots of every troggle in the session, including the deciding one.
    pub siblings: &'a [TroggleSnapshot],
}

/// Decides the next cell of the troggle.
///
/// A positive cooldown blocks movement for the tick and is decremented. After
/// a step the cooldown restarts from the profile speed. The returned cell is
/// always orthogonally adjacent to, or equal to, the current one.
pub fn next_position<R>(troggle: &mut Troggle, context: &AiContext<'_>, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    if troggle.move_cooldown > 0 {
        troggle.move_cooldown -= 1;
        return troggle.position;
    }

    let current = troggle.position;
    let next = match troggle.profile.kind {
        EnemyKind::Standard => gated_pursuit(current, troggle.profile.intelligence, context, rng),
        EnemyKind::Speed => gated_pursuit(current, troggle.profile.aggressiveness, context, rng),
        EnemyKind::Smart => follow_path(troggle, context, rng),
        EnemyKind::Blocker => intercept(current, context, rng),
        EnemyKind::Hunter => surround(troggle, context, rng),
    };

    if next != current {
        troggle.move_cooldown = ticks_per_move(&troggle.profile).saturating_sub(1);
    }
    next
}

/// Single-axis step from `from` that reduces the distance to `goal`.
///
/// When both axes differ the axis is chosen at random. Returns `from` when the
/// goal is already reached.
pub fn step_toward<R>(from: Position, goal: Position, size: GridSize, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    let delta_row = axis_sign(from.row(), goal.row());
    let delta_column = axis_sign(from.column(), goal.column());
    let (delta_row, delta_column) = match (delta_row, delta_column) {
        (0, 0) => return from,
        (row, 0) => (row, 0),
        (0, column) => (0, column),
        (row, column) => {
            if rng.gen_bool(0.5) {
                (row, 0)
            } else {
                (0, column)
            }
        }
    };
    from.clamped_offset(delta_row, delta_column, size)
}

/// Uniformly random orthogonal step that stays on the grid.
pub fn random_step<R>(from: Position, size: GridSize, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    let options: Vec<Position> = size.neighbors(from).collect();
    options.choose(rng).copied().unwrap_or(from)
}

fn axis_sign(from: u32, to: u32) -> i32 {
    match to.cmp(&from) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

fn gated_pursuit<R>(
    current: Position,
    probability: f32,
    context: &AiContext<'_>,
    rng: &mut R,
) -> Position
where
    R: Rng + ?Sized,
{
    let probability = f64::from(probability.clamp(0.0, 1.0));
    if rng.gen_bool(probability) {
        step_toward(current, context.muncher, context.size, rng)
    } else {
        random_step(current, context.size, rng)
    }
}

fn follow_path<R>(troggle: &mut Troggle, context: &AiContext<'_>, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    let current = troggle.position;
    let cached_step_valid = troggle.planned_path.front().is_some_and(|step| {
        context.size.contains(*step) && step.manhattan_distance(current) == 1
    });

    if !cached_step_valid {
        match shortest_path(context.size, current, context.muncher, |_| false) {
            Some(path) => {
                debug!(
                    troggle = troggle.id.get(),
                    from = %current,
                    goal = %context.muncher,
                    steps = path.len(),
                    "replanned troggle path"
                );
                troggle.planned_path = path;
            }
            None => {
                troggle.planned_path.clear();
                return step_toward(current, context.muncher, context.size, rng);
            }
        }
    }

    troggle.planned_path.pop_front().unwrap_or(current)
}

fn intercept<R>(current: Position, context: &AiContext<'_>, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    let muncher = context.muncher;
    let mut candidates: Vec<Position> = context.targets.to_vec();
    candidates.sort_by_key(|target| (target.manhattan_distance(muncher), *target));
    candidates.truncate(BLOCKER_CANDIDATES);

    let nearest_distance = candidates
        .first()
        .map(|target| target.manhattan_distance(muncher));
    let Some(target) = candidates
        .into_iter()
        .filter(|target| Some(target.manhattan_distance(muncher)) == nearest_distance)
        .min_by_key(|target| (target.manhattan_distance(current), *target))
    else {
        return step_toward(current, muncher, context.size, rng);
    };

    let midpoint = Position::new(
        (muncher.row() + target.row()) / 2,
        (muncher.column() + target.column()) / 2,
    );
    if midpoint == current {
        return step_toward(current, muncher, context.size, rng);
    }
    step_toward(current, midpoint, context.size, rng)
}

fn surround<R>(troggle: &Troggle, context: &AiContext<'_>, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    let current = troggle.position;
    let muncher = context.muncher;
    let slots: Vec<Position> = context.size.neighbors(muncher).collect();

    if slots.contains(&current) || !troggle.profile.coordinated {
        return step_toward(current, muncher, context.size, rng);
    }

    let mut hunters: Vec<&TroggleSnapshot> = context
        .siblings
        .iter()
        .filter(|sibling| sibling.kind == EnemyKind::Hunter && sibling.id != troggle.id)
        .collect();
    hunters.sort_by_key(|sibling| sibling.id);

    let mut claimed: Vec<Position> = hunters
        .iter()
        .map(|sibling| sibling.position)
        .filter(|position| slots.contains(position))
        .collect();
    for sibling in hunters
        .iter()
        .filter(|sibling| sibling.id < troggle.id && !slots.contains(&sibling.position))
    {
        if let Some(slot) = nearest_free_slot(sibling.position, &slots, &claimed) {
            claimed.push(slot);
        }
    }

    match nearest_free_slot(current, &slots, &claimed) {
        Some(slot) => step_toward(current, slot, context.size, rng),
        None => step_toward(current, muncher, context.size, rng),
    }
}

fn nearest_free_slot(from: Position, slots: &[Position], claimed: &[Position]) -> Option<Position> {
    slots
        .iter()
        .copied()
        .filter(|slot| !claimed.contains(slot))
        .min_by_key(|slot| (slot.manhattan_distance(from), *slot))
}
