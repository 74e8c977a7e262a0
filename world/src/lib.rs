#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state and the transitions that mutate it.
//!
//! Every transition takes the previous [`GameState`] by value and returns the
//! next one. Adapters either call the dedicated transitions
//! ([`move_muncher`], [`eat`], [`move_troggles`], [`tick`]) or route
//! [`Command`] values through [`apply`], which also reports [`Event`] values
//! describing what changed.

mod session;

use std::time::Duration;

use munchers_core::{
    ActiveRule, Command, DifficultyTier, EnemyBehaviorProfile, Event, Grid, GridSize,
    GridSizeError, LevelConfig, LevelId, LossCause, Objective, ObjectiveId, PlayMode, Position,
    TroggleId, TroggleSnapshot, BASE_POINTS, MAX_MISTAKES,
};
use munchers_system_grid_generation::{self as grid_generation, reconcile_targets};
use munchers_system_rules::{is_correct, resolve_plan};
use munchers_system_scoring::{self as scoring, ScoreInput};
use munchers_system_troggle_ai::{self as troggle_ai, AiContext};
use rand::Rng;
use tracing::debug;

pub use munchers_system_troggle_ai::Troggle;
pub use session::{derive_seed, Session, SessionKind, TickToken};

/// Wall-clock period represented by a single tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Ticks without a correct eat before a hint reveals a target.
pub const HINT_DELAY_TICKS: u32 = 10;

/// Everything needed to assemble a session from explicit parts.
#[derive(Clone, Debug)]
pub struct Layout {
    /// Flavour of session being played.
    pub mode: PlayMode,
    /// Level being played, if any.
    pub level_id: Option<LevelId>,
    /// Grid the session is played on.
    pub grid: Grid,
    /// Rule and target number evaluated by the session.
    pub rule: ActiveRule,
    /// Starting cell of the Muncher.
    pub muncher: Position,
    /// Troggles in spawn order.
    pub troggles: Vec<Troggle>,
    /// Difficulty tier used for scoring.
    pub tier: DifficultyTier,
    /// Countdown length in seconds, if timed.
    pub time_limit: Option<u32>,
    /// Objectives evaluated during the session.
    pub objectives: Vec<Objective>,
}

/// Authoritative state of a single session.
#[derive(Clone, Debug)]
pub struct GameState {
    mode: PlayMode,
    level_id: Option<LevelId>,
    grid: Grid,
    rule: ActiveRule,
    muncher: Position,
    troggles: Vec<Troggle>,
    tier: DifficultyTier,
    objectives: Vec<Objective>,
    completed_objectives: Vec<ObjectiveId>,
    score: u64,
    streak: u32,
    best_streak: u32,
    correct_eats: u32,
    mistakes: u32,
    time_limit: Option<u32>,
    time_left: Option<u32>,
    elapsed_ticks: u64,
    ticks_since_correct: u32,
    game_over: bool,
    game_won: bool,
    loss_cause: Option<LossCause>,
}

impl GameState {
    /// Creates a classic session: opposite-corner starts and wandering troggles.
    pub fn classic<R>(size: GridSize, rule: ActiveRule, troggle_count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let plan = resolve_plan(rule, rng);
        let grid = grid_generation::generate(size, &plan, rng);
        let placement = grid_generation::place_classic(size, troggle_count, rng);
        let troggles = spawn_troggles(placement.troggles(), |_| troggle_ai::classic_profile());
        Self::from_layout(Layout {
            mode: PlayMode::Classic,
            level_id: None,
            grid,
            rule: plan.active(),
            muncher: placement.muncher(),
            troggles,
            tier: DifficultyTier::BASE,
            time_limit: None,
            objectives: Vec::new(),
        })
    }

    /// Creates a level session from its catalog configuration.
    pub fn level<R>(config: &LevelConfig, rng: &mut R) -> Result<Self, GridSizeError>
    where
        R: Rng + ?Sized,
    {
        let size = config.grid_size()?;
        let tier = config.tier();
        let plan = resolve_plan(config.active_rule(), rng);
        let grid = grid_generation::generate(size, &plan, rng);
        let troggle_count = usize::try_from(config.enemy_count).unwrap_or(usize::MAX);
        let placement = grid_generation::place_level(size, troggle_count, rng);
        let troggles = spawn_troggles(placement.troggles(), |index| {
            troggle_ai::profile_for(config.enemy_kind_at(index), tier)
        });
        Ok(Self::from_layout(Layout {
            mode: PlayMode::Level,
            level_id: Some(config.id),
            grid,
            rule: plan.active(),
            muncher: placement.muncher(),
            troggles,
            tier,
            time_limit: config.time_limit_secs,
            objectives: config.objectives.clone(),
        }))
    }

    /// Assembles a fresh session from explicit parts.
    ///
    /// Positions are clamped into the grid, occupancy flags are rebuilt and
    /// every target flag is re-derived from the rule.
    #[must_use]
    pub fn from_layout(layout: Layout) -> Self {
        let size = layout.grid.size();
        let mut troggles = layout.troggles;
        for troggle in &mut troggles {
            troggle.relocate(troggle.position().clamped_offset(0, 0, size));
        }
        let mut state = Self {
            mode: layout.mode,
            level_id: layout.level_id,
            grid: layout.grid,
            rule: layout.rule,
            muncher: layout.muncher.clamped_offset(0, 0, size),
            troggles,
            tier: layout.tier,
            objectives: layout.objectives,
            completed_objectives: Vec::new(),
            score: 0,
            streak: 0,
            best_streak: 0,
            correct_eats: 0,
            mistakes: 0,
            time_limit: layout.time_limit,
            time_left: layout.time_limit,
            elapsed_ticks: 0,
            ticks_since_correct: 0,
            game_over: false,
            game_won: false,
            loss_cause: None,
        };
        let _ = reconcile_targets(&mut state.grid, state.rule);
        state.sync_occupancy();
        state
    }

    /// Flavour of the session.
    #[must_use]
    pub const fn mode(&self) -> PlayMode {
        self.mode
    }

    /// Level being played, if any.
    #[must_use]
    pub const fn level_id(&self) -> Option<LevelId> {
        self.level_id
    }

    /// Grid including occupancy and reveal flags.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Rule and target number evaluated by the session.
    #[must_use]
    pub const fn rule(&self) -> ActiveRule {
        self.rule
    }

    /// Cell occupied by the Muncher.
    #[must_use]
    pub const fn muncher(&self) -> Position {
        self.muncher
    }

    /// Troggles in spawn order.
    #[must_use]
    pub fn troggles(&self) -> &[Troggle] {
        &self.troggles
    }

    /// Difficulty tier used for scoring.
    #[must_use]
    pub const fn tier(&self) -> DifficultyTier {
        self.tier
    }

    /// Objectives evaluated during the session.
    #[must_use]
    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    /// Objectives completed so far, in completion order.
    #[must_use]
    pub fn completed_objectives(&self) -> &[ObjectiveId] {
        &self.completed_objectives
    }

    /// Cumulative score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Consecutive correct eats since the last mistake.
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Longest streak reached during the session.
    #[must_use]
    pub const fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Number of correct eats.
    #[must_use]
    pub const fn correct_eats(&self) -> u32 {
        self.correct_eats
    }

    /// Number of incorrect eats, never above [`MAX_MISTAKES`].
    #[must_use]
    pub const fn mistakes(&self) -> u32 {
        self.mistakes
    }

    /// Accuracy percentage of the eats so far.
    #[must_use]
    pub fn accuracy(&self) -> u32 {
        scoring::accuracy(self.correct_eats, self.mistakes)
    }

    /// Countdown length in seconds, if timed.
    #[must_use]
    pub const fn time_limit(&self) -> Option<u32> {
        self.time_limit
    }

    /// Seconds left on the countdown, if timed.
    #[must_use]
    pub const fn time_left(&self) -> Option<u32> {
        self.time_left
    }

    /// Ticks processed since the session started.
    #[must_use]
    pub const fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Ticks since the last correct eat or hint.
    #[must_use]
    pub const fn ticks_since_correct(&self) -> u32 {
        self.ticks_since_correct
    }

    /// Whether the session ended in a loss.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Whether every target was eaten.
    #[must_use]
    pub const fn is_game_won(&self) -> bool {
        self.game_won
    }

    /// Whether the session accepts no further input.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.game_over || self.game_won
    }

    /// Reason the session was lost, if it was.
    #[must_use]
    pub const fn loss_cause(&self) -> Option<LossCause> {
        self.loss_cause
    }

    fn troggle_at(&self, position: Position) -> Option<TroggleId> {
        self.troggles
            .iter()
            .find(|troggle| troggle.position() == position)
            .map(Troggle::id)
    }

    fn sync_occupancy(&mut self) {
        for (_, cell) in self.grid.iter_mut() {
            cell.occupied_by_player = false;
            cell.occupied_by_enemy = false;
            cell.enemy_kind = None;
        }
        if let Some(cell) = self.grid.cell_mut(self.muncher) {
            cell.occupied_by_player = true;
        }
        for troggle in &self.troggles {
            if let Some(cell) = self.grid.cell_mut(troggle.position()) {
                cell.occupied_by_enemy = true;
                cell.enemy_kind = Some(troggle.kind());
            }
        }
    }

    fn lose(&mut self, cause: LossCause, out_events: &mut Vec<Event>) {
        if self.is_terminal() {
            return;
        }
        self.game_over = true;
        self.game_won = false;
        self.loss_cause = Some(cause);
        debug!(?cause, score = self.score, "session lost");
        out_events.push(Event::GameLost { cause });
    }
}

fn spawn_troggles<F>(positions: &[Position], mut profile: F) -> Vec<Troggle>
where
    F: FnMut(usize) -> EnemyBehaviorProfile,
{
    positions
        .iter()
        .enumerate()
        .map(|(index, position)| {
            let id = TroggleId::new(u32::try_from(index).unwrap_or(u32::MAX));
            Troggle::new(id, *position, profile(index))
        })
        .collect()
}

/// Result of a Muncher move.
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    /// Whether the Muncher walked onto a troggle.
    pub collided: bool,
    /// State after the move.
    pub state: GameState,
}

/// Result of an eat attempt.
#[derive(Clone, Debug)]
pub struct EatOutcome {
    /// Whether the cell was eaten.
    pub consumed: bool,
    /// Whether the eaten value satisfied the rule.
    pub correct: bool,
    /// Whether a troggle shared the Muncher's cell.
    pub collided: bool,
    /// Points credited for the eat, excluding objective completions.
    pub points: u64,
    /// State after the eat.
    pub state: GameState,
}

#[derive(Clone, Copy, Debug, Default)]
struct EatReport {
    consumed: bool,
    correct: bool,
    collided: bool,
    points: u64,
}

/// Moves the Muncher by the provided delta, clamped to the grid.
///
/// A delta that leaves the position unchanged is a no-op. Walking onto a
/// troggle completes the move and ends the session.
#[must_use]
pub fn move_muncher(mut state: GameState, delta_row: i32, delta_column: i32) -> MoveOutcome {
    let mut events = Vec::new();
    let collided = step_muncher(&mut state, delta_row, delta_column, &mut events);
    MoveOutcome { collided, state }
}

/// Eats the cell under the Muncher.
#[must_use]
pub fn eat(mut state: GameState) -> EatOutcome {
    let mut events = Vec::new();
    let report = eat_in_place(&mut state, &mut events);
    EatOutcome {
        consumed: report.consumed,
        correct: report.correct,
        collided: report.collided,
        points: report.points,
        state,
    }
}

/// Moves every troggle once, then checks for a collision with the Muncher.
#[must_use]
pub fn move_troggles<R>(mut state: GameState, rng: &mut R) -> GameState
where
    R: Rng + ?Sized,
{
    let mut events = Vec::new();
    advance_troggles(&mut state, rng, &mut events);
    state
}

/// Places every troggle on the provided cell, then checks for a collision.
///
/// `next` is matched to troggles in spawn order; cells are clamped into the
/// grid and missing entries leave a troggle in place.
#[must_use]
pub fn resolve_troggle_moves(mut state: GameState, next: &[Position]) -> GameState {
    let mut events = Vec::new();
    relocate_troggles(&mut state, next, &mut events);
    state
}

/// Advances the clock by one period.
#[must_use]
pub fn tick<R>(mut state: GameState, rng: &mut R) -> GameState
where
    R: Rng + ?Sized,
{
    let mut events = Vec::new();
    advance_clock(&mut state, rng, &mut events);
    state
}

/// Applies the provided command, reporting what changed.
#[must_use]
pub fn apply<R>(
    mut state: GameState,
    command: Command,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) -> GameState
where
    R: Rng + ?Sized,
{
    apply_in_place(&mut state, command, rng, out_events);
    state
}

fn apply_in_place<R>(
    state: &mut GameState,
    command: Command,
    rng: &mut R,
    out_events: &mut Vec<Event>,
) where
    R: Rng + ?Sized,
{
    match command {
        Command::Move { direction } => {
            let (delta_row, delta_column) = direction.delta();
            let _ = step_muncher(state, delta_row, delta_column, out_events);
        }
        Command::Eat => {
            let _ = eat_in_place(state, out_events);
        }
        Command::Tick => advance_clock(state, rng, out_events),
    }
}

fn step_muncher(
    state: &mut GameState,
    delta_row: i32,
    delta_column: i32,
    out_events: &mut Vec<Event>,
) -> bool {
    if state.is_terminal() {
        return false;
    }

    let from = state.muncher;
    let to = from.clamped_offset(delta_row, delta_column, state.grid.size());
    if to == from {
        return false;
    }

    if let Some(cell) = state.grid.cell_mut(from) {
        cell.occupied_by_player = false;
    }
    if let Some(cell) = state.grid.cell_mut(to) {
        cell.occupied_by_player = true;
    }
    state.muncher = to;
    out_events.push(Event::MuncherMoved { from, to });

    if let Some(troggle) = state.troggle_at(to) {
        debug!(troggle = troggle.get(), cell = %to, "muncher walked into a troggle");
        state.lose(LossCause::CaughtByTroggle, out_events);
        return true;
    }
    false
}

fn eat_in_place(state: &mut GameState, out_events: &mut Vec<Event>) -> EatReport {
    if state.is_terminal() {
        return EatReport::default();
    }

    let position = state.muncher;
    if state.troggle_at(position).is_some() {
        state.lose(LossCause::CaughtByTroggle, out_events);
        return EatReport {
            collided: true,
            ..EatReport::default()
        };
    }

    let rule = state.rule;
    let Some(cell) = state.grid.cell_mut(position) else {
        return EatReport::default();
    };
    if cell.consumed_correctly {
        return EatReport::default();
    }

    if !is_correct(cell.value, rule) {
        if cell.is_target {
            debug!(cell = %position, value = %cell.value, "healed stale target flag");
        }
        cell.is_target = false;
        state.streak = 0;
        state.mistakes = (state.mistakes + 1).min(MAX_MISTAKES);
        out_events.push(Event::CellEaten {
            cell: position,
            correct: false,
            points: 0,
        });
        out_events.push(Event::MistakeRecorded {
            mistakes: state.mistakes,
        });
        if state.mistakes >= MAX_MISTAKES {
            state.lose(LossCause::TooManyMistakes, out_events);
        }
        return EatReport {
            consumed: true,
            ..EatReport::default()
        };
    }

    cell.is_target = false;
    cell.consumed_correctly = true;
    cell.revealed = false;
    state.streak += 1;
    state.best_streak = state.best_streak.max(state.streak);
    state.correct_eats += 1;
    state.ticks_since_correct = 0;

    let breakdown = scoring::score(&ScoreInput {
        base: BASE_POINTS,
        objectives: &state.objectives,
        completed: &[],
        time_left: state.time_left,
        time_limit: state.time_limit,
        correct_eats: state.correct_eats,
        mistakes: state.mistakes,
        streak: state.streak,
        tier: state.tier,
    });
    let points = scoring::total(&breakdown);
    state.score += points;
    out_events.push(Event::CellEaten {
        cell: position,
        correct: true,
        points,
    });

    let won = query::remaining_targets(state) == 0;
    if won {
        state.game_won = true;
    }
    sweep_objectives(state, out_events);
    if won {
        debug!(score = state.score, "board cleared");
        out_events.push(Event::GameWon);
    }

    EatReport {
        consumed: true,
        correct: true,
        collided: false,
        points,
    }
}

fn sweep_objectives(state: &mut GameState, out_events: &mut Vec<Event>) {
    loop {
        let context = query::objective_context(state);
        let newly: Vec<(ObjectiveId, u32)> =
            scoring::newly_completed(&state.objectives, &state.completed_objectives, &context)
                .into_iter()
                .map(|objective| (objective.id.clone(), objective.points))
                .collect();
        if newly.is_empty() {
            return;
        }
        for (objective, points) in newly {
            state.score += u64::from(points);
            state.completed_objectives.push(objective.clone());
            debug!(%objective, points, "objective completed");
            out_events.push(Event::ObjectiveCompleted { objective, points });
        }
    }
}

fn advance_troggles<R>(state: &mut GameState, rng: &mut R, out_events: &mut Vec<Event>)
where
    R: Rng + ?Sized,
{
    if state.is_terminal() || state.troggles.is_empty() {
        return;
    }

    let targets = query::live_targets(state);
    let siblings: Vec<TroggleSnapshot> = state.troggles.iter().map(Troggle::snapshot).collect();
    let context = AiContext {
        muncher: state.muncher,
        size: state.grid.size(),
        targets: &targets,
        siblings: &siblings,
    };
    let next: Vec<Position> = state
        .troggles
        .iter_mut()
        .map(|troggle| troggle_ai::next_position(troggle, &context, rng))
        .collect();
    relocate_troggles(state, &next, out_events);
}

fn relocate_troggles(state: &mut GameState, next: &[Position], out_events: &mut Vec<Event>) {
    if state.is_terminal() {
        return;
    }

    let size = state.grid.size();
    for (troggle, target) in state.troggles.iter_mut().zip(next) {
        let from = troggle.position();
        let to = target.clamped_offset(0, 0, size);
        if to != from {
            troggle.relocate(to);
            out_events.push(Event::TroggleMoved {
                troggle: troggle.id(),
                from,
                to,
            });
        }
    }
    state.sync_occupancy();

    if let Some(troggle) = state.troggle_at(state.muncher) {
        debug!(troggle = troggle.get(), cell = %state.muncher, "troggle caught the muncher");
        state.lose(LossCause::CaughtByTroggle, out_events);
    }
}

fn advance_clock<R>(state: &mut GameState, rng: &mut R, out_events: &mut Vec<Event>)
where
    R: Rng + ?Sized,
{
    if state.is_terminal() {
        return;
    }

    state.elapsed_ticks += 1;
    let healed = reconcile_targets(&mut state.grid, state.rule);
    if healed > 0 {
        debug!(healed, "healed stale target flags");
    }

    if let Some(left) = state.time_left {
        let left = left.saturating_sub(1);
        state.time_left = Some(left);
        out_events.push(Event::TimeAdvanced {
            time_left: Some(left),
        });
        if left == 0 {
            state.lose(LossCause::TimeExpired, out_events);
            return;
        }
    } else {
        out_events.push(Event::TimeAdvanced { time_left: None });
    }

    advance_troggles(state, rng, out_events);
    if state.is_terminal() {
        return;
    }

    state.ticks_since_correct += 1;
    if state.ticks_since_correct >= HINT_DELAY_TICKS {
        state.ticks_since_correct = 0;
        reveal_hint(state, out_events);
    }
}

fn reveal_hint(state: &mut GameState, out_events: &mut Vec<Event>) {
    let muncher = state.muncher;
    let hinted = query::live_targets(state)
        .into_iter()
        .filter(|position| {
            state
                .grid
                .cell(*position)
                .is_some_and(|cell| !cell.revealed)
        })
        .min_by_key(|position| (position.manhattan_distance(muncher), *position));

    let Some(position) = hinted else {
        return;
    };
    if let Some(cell) = state.grid.cell_mut(position) {
        cell.revealed = true;
        debug!(cell = %position, "revealed hint");
        out_events.push(Event::CellRevealed { cell: position });
    }
}

/// Query functions that provide read-only views derived from the game state.
pub mod query {
    use munchers_core::{ObjectiveContext, Position, SessionSummary, WELCOME_BANNER};
    use munchers_system_rules::is_correct;
    use munchers_system_scoring as scoring;

    use super::{GameState, TICK_PERIOD};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner() -> &'static str {
        WELCOME_BANNER
    }

    /// Target cells re-derived from the rule, in row-major order.
    ///
    /// Cached flags are ignored; consumed cells are never targets.
    #[must_use]
    pub fn live_targets(state: &GameState) -> Vec<Position> {
        state
            .grid
            .iter()
            .filter(|(_, cell)| !cell.consumed_correctly && is_correct(cell.value, state.rule))
            .map(|(position, _)| position)
            .collect()
    }

    /// Number of target cells left on the grid.
    #[must_use]
    pub fn remaining_targets(state: &GameState) -> usize {
        state
            .grid
            .iter()
            .filter(|(_, cell)| !cell.consumed_correctly && is_correct(cell.value, state.rule))
            .count()
    }

    /// Figures objectives are evaluated against.
    #[must_use]
    pub fn objective_context(state: &GameState) -> ObjectiveContext {
        ObjectiveContext {
            remaining_targets: remaining_targets(state),
            score: state.score,
            time_left: state.time_left,
            accuracy: state.accuracy(),
            mistakes: state.mistakes,
        }
    }

    /// Star rating the session would earn in its current state.
    #[must_use]
    pub fn stars(state: &GameState) -> u8 {
        scoring::stars(
            state.game_won,
            &state.objectives,
            &state.completed_objectives,
            state.score,
        )
    }

    /// Summary handed to the persistence layer once a level session ends.
    ///
    /// Returns `None` for classic sessions and sessions still in progress.
    #[must_use]
    pub fn summary(state: &GameState) -> Option<SessionSummary> {
        let level_id = state.level_id?;
        if !state.is_terminal() {
            return None;
        }
        let period = u64::try_from(TICK_PERIOD.as_millis()).unwrap_or(u64::MAX);
        Some(SessionSummary {
            level_id,
            won: state.game_won,
            final_score: state.score,
            accuracy: state.accuracy(),
            stars_earned: stars(state),
            completed_objective_ids: state.completed_objectives.clone(),
            mistakes: state.mistakes,
            best_streak: state.best_streak,
            time_remaining: state.time_left,
            time_limit: state.time_limit,
            duration_ms: state.elapsed_ticks.saturating_mul(period),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use munchers_core::{Cell, CellValue, EnemyKind, Rule};
    use munchers_system_troggle_ai::base_profile;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn numbered_grid(rows: u32, columns: u32) -> Grid {
        let size = GridSize::new(rows, columns).expect("valid size");
        Grid::from_fn(size, |position| {
            Cell::new(
                CellValue::Numeric(position.row() * columns + position.column() + 1),
                false,
            )
        })
    }

    fn layout(troggles: Vec<Troggle>) -> Layout {
        Layout {
            mode: PlayMode::Level,
            level_id: Some(LevelId::new(1)),
            grid: numbered_grid(3, 4),
            rule: ActiveRule::new(Rule::Multiples, 3),
            muncher: Position::new(2, 3),
            troggles,
            tier: DifficultyTier::BASE,
            time_limit: Some(5),
            objectives: Vec::new(),
        }
    }

    #[test]
    fn from_layout_derives_flags() {
        let troggle = Troggle::new(
            TroggleId::new(0),
            Position::new(0, 0),
            base_profile(EnemyKind::Standard),
        );
        let state = GameState::from_layout(layout(vec![troggle]));
        let grid = state.grid();
        assert!(grid.cell(Position::new(0, 2)).expect("cell").is_target);
        assert!(!grid.cell(Position::new(0, 1)).expect("cell").is_target);
        assert!(grid.cell(Position::new(2, 3)).expect("cell").occupied_by_player);
        let origin = grid.cell(Position::new(0, 0)).expect("cell");
        assert!(origin.occupied_by_enemy);
        assert_eq!(origin.enemy_kind, Some(EnemyKind::Standard));
        assert_eq!(query::remaining_targets(&state), 4);
    }

    #[test]
    fn apply_reports_moves_and_eats() {
        let state = GameState::from_layout(layout(Vec::new()));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut events = Vec::new();
        let state = apply(
            state,
            Command::Move {
                direction: munchers_core::Direction::West,
            },
            &mut rng,
            &mut events,
        );
        let state = apply(state, Command::Eat, &mut rng, &mut events);
        assert_eq!(state.muncher(), Position::new(2, 2));
        assert_eq!(
            events,
            vec![
                Event::MuncherMoved {
                    from: Position::new(2, 3),
                    to: Position::new(2, 2),
                },
                Event::CellEaten {
                    cell: Position::new(2, 2),
                    correct: false,
                    points: 0,
                },
                Event::MistakeRecorded { mistakes: 1 },
            ]
        );
    }

    #[test]
    fn countdown_expiry_is_a_loss() {
        let mut state = GameState::from_layout(layout(Vec::new()));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..5 {
            state = tick(state, &mut rng);
        }
        assert_eq!(state.time_left(), Some(0));
        assert!(state.is_game_over());
        assert_eq!(state.loss_cause(), Some(LossCause::TimeExpired));
        let summary = query::summary(&state).expect("level summary");
        assert!(!summary.won);
        assert_eq!(summary.duration_ms, 5_000);
        assert_eq!(summary.stars_earned, 0);
    }
}
