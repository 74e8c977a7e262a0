#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Munchers engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative game state, and pure systems. Adapters submit [`Command`]
//! values describing player intent, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! changed. Systems consume immutable views such as [`Grid`] and
//! [`ObjectiveContext`] and never mutate the game state directly.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Number Munchers.";

/// Smallest permitted edge length of a playable grid.
pub const MIN_GRID_EDGE: u32 = 3;

/// Number of incorrect eats that ends a session.
pub const MAX_MISTAKES: u32 = 3;

/// Points awarded for a single correct eat before bonuses.
pub const BASE_POINTS: u32 = 10;

/// Describes which flavour of session is being played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Untimed endless-style board with corner placement and wandering troggles.
    Classic,
    /// Catalog level with a time limit, objectives, and behavior-driven troggles.
    Level,
}

/// Commands that express every permissible game-state mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the Muncher step one cell in the given direction.
    Move {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that the Muncher eat the cell it currently occupies.
    Eat,
    /// Advances the simulation clock by one fixed period.
    Tick,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the Muncher moved between two cells.
    MuncherMoved {
        /// Cell the Muncher occupied before moving.
        from: Position,
        /// Cell the Muncher occupies after the move.
        to: Position,
    },
    /// Reports the outcome of an eat attempt on a non-empty cell.
    CellEaten {
        /// Cell that was eaten.
        cell: Position,
        /// Whether the eaten value satisfied the active rule.
        correct: bool,
        /// Points credited for the eat, zero when incorrect.
        points: u64,
    },
    /// Reports that an incorrect eat increased the mistake counter.
    MistakeRecorded {
        /// Mistake count after the increment.
        mistakes: u32,
    },
    /// Confirms that a troggle moved between two cells.
    TroggleMoved {
        /// Identifier of the troggle that moved.
        troggle: TroggleId,
        /// Cell the troggle occupied before moving.
        from: Position,
        /// Cell the troggle occupies after moving.
        to: Position,
    },
    /// Announces that a hint revealed a target cell.
    CellRevealed {
        /// Cell that became revealed.
        cell: Position,
    },
    /// Announces that an objective transitioned to completed.
    ObjectiveCompleted {
        /// Identifier of the completed objective.
        objective: ObjectiveId,
        /// Points credited for the completion.
        points: u32,
    },
    /// Indicates that the simulation clock advanced one period.
    TimeAdvanced {
        /// Seconds remaining on the countdown, if the session is timed.
        time_left: Option<u32>,
    },
    /// Announces that the session ended in a loss.
    GameLost {
        /// Reason the session was lost.
        cause: LossCause,
    },
    /// Announces that every target cell was eaten.
    GameWon,
}

/// Reasons a session can end in a loss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossCause {
    /// A troggle and the Muncher ended up on the same cell.
    CaughtByTroggle,
    /// The mistake counter reached [`MAX_MISTAKES`].
    TooManyMistakes,
    /// The countdown reached zero.
    TimeExpired,
}

/// Cardinal movement directions available to every token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Row and column delta applied by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::East => (0, 1),
            Self::South => (1, 0),
            Self::West => (0, -1),
        }
    }
}

/// Unique identifier assigned to a troggle within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TroggleId(u32);

impl TroggleId {
    /// Creates a new troggle identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a catalog level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the level identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Identifier of the level preceding this one, if any.
    #[must_use]
    pub fn previous(self) -> Option<LevelId> {
        self.0.checked_sub(1).filter(|value| *value > 0).map(Self)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of a single grid cell expressed as row and column coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: u32,
    column: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Applies a row and column delta, clamping the result to the grid bounds.
    ///
    /// Positions never wrap: a delta that would leave the grid stops at the
    /// nearest edge cell.
    #[must_use]
    pub fn clamped_offset(self, delta_row: i32, delta_column: i32, size: GridSize) -> Position {
        let row = clamp_axis(self.row, delta_row, size.rows());
        let column = clamp_axis(self.column, delta_column, size.columns());
        Position::new(row, column)
    }

    /// Position one step away in the provided direction, if it lies inside the grid.
    #[must_use]
    pub fn step(self, direction: Direction, size: GridSize) -> Option<Position> {
        let (delta_row, delta_column) = direction.delta();
        let next = self.clamped_offset(delta_row, delta_column, size);
        (next != self).then_some(next)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

fn clamp_axis(value: u32, delta: i32, extent: u32) -> u32 {
    let upper = i64::from(extent.saturating_sub(1));
    let moved = (i64::from(value) + i64::from(delta)).clamp(0, upper);
    u32::try_from(moved).unwrap_or(0)
}

/// Errors produced when a grid size violates the minimum dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridSizeError {
    /// At least one edge is shorter than [`MIN_GRID_EDGE`].
    #[error("grid of {rows}x{columns} is smaller than the 3x3 minimum")]
    TooSmall {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        columns: u32,
    },
}

/// Validated dimensions of a playable grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GridSize {
    rows: u32,
    columns: u32,
}

impl GridSize {
    /// Creates a grid size, rejecting boards smaller than 3×3.
    pub fn new(rows: u32, columns: u32) -> Result<Self, GridSizeError> {
        if rows < MIN_GRID_EDGE || columns < MIN_GRID_EDGE {
            return Err(GridSizeError::TooSmall { rows, columns });
        }
        Ok(Self { rows, columns })
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        usize::try_from(u64::from(self.rows) * u64::from(self.columns)).unwrap_or(usize::MAX)
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.column < self.columns
    }

    /// Row-major index of the position, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }
        let row = usize::try_from(position.row).ok()?;
        let column = usize::try_from(position.column).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Position addressed by a row-major index.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<Position> {
        let width = usize::try_from(self.columns).ok()?;
        let row = u32::try_from(index / width).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let position = Position::new(row, column);
        self.contains(position).then_some(position)
    }

    /// Orthogonal neighbors of the position that lie inside the grid.
    pub fn neighbors(&self, position: Position) -> impl Iterator<Item = Position> {
        let size = *self;
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| position.step(direction, size))
    }

    /// Iterator over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| Position::new(row, column)))
    }

    /// The four corners ordered top-left, top-right, bottom-left, bottom-right.
    #[must_use]
    pub const fn corners(&self) -> [Position; 4] {
        let last_row = self.rows - 1;
        let last_column = self.columns - 1;
        [
            Position::new(0, 0),
            Position::new(0, last_column),
            Position::new(last_row, 0),
            Position::new(last_row, last_column),
        ]
    }
}

/// Arithmetic operator carried by an expression cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Two-operand addition.
    Plus,
    /// Two-operand subtraction.
    Minus,
}

impl Operator {
    /// Symbol used when rendering the expression.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

/// Value displayed in a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellValue {
    /// Plain non-negative integer.
    Numeric(u32),
    /// Two-operand arithmetic expression such as `3+4` or `9-2`.
    Expression {
        /// Operator joining the operands.
        operator: Operator,
        /// Left-hand operand.
        left: u32,
        /// Right-hand operand.
        right: u32,
    },
}

impl CellValue {
    /// Creates an addition expression.
    #[must_use]
    pub const fn sum(left: u32, right: u32) -> Self {
        Self::Expression {
            operator: Operator::Plus,
            left,
            right,
        }
    }

    /// Creates a subtraction expression.
    #[must_use]
    pub const fn difference(left: u32, right: u32) -> Self {
        Self::Expression {
            operator: Operator::Minus,
            left,
            right,
        }
    }

    /// Arithmetic result of the value using signed arithmetic.
    #[must_use]
    pub fn evaluate(&self) -> i64 {
        match *self {
            Self::Numeric(value) => i64::from(value),
            Self::Expression {
                operator: Operator::Plus,
                left,
                right,
            } => i64::from(left) + i64::from(right),
            Self::Expression {
                operator: Operator::Minus,
                left,
                right,
            } => i64::from(left) - i64::from(right),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(value) => write!(f, "{value}"),
            Self::Expression {
                operator,
                left,
                right,
            } => write!(f, "{left}{}{right}", operator.symbol()),
        }
    }
}

/// A single grid cell and the tokens standing on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Value shown in the cell.
    pub value: CellValue,
    /// Cached rule evaluation; always re-derived before gameplay decisions.
    pub is_target: bool,
    /// Whether the Muncher stands on the cell.
    pub occupied_by_player: bool,
    /// Whether at least one troggle stands on the cell.
    pub occupied_by_enemy: bool,
    /// Kind of the troggle standing on the cell, if any.
    pub enemy_kind: Option<EnemyKind>,
    /// Whether a hint revealed the cell as a target.
    pub revealed: bool,
    /// Whether the cell was eaten correctly and is now empty.
    pub consumed_correctly: bool,
}

impl Cell {
    /// Creates an unoccupied cell holding the provided value.
    #[must_use]
    pub const fn new(value: CellValue, is_target: bool) -> Self {
        Self {
            value,
            is_target,
            occupied_by_player: false,
            occupied_by_enemy: false,
            enemy_kind: None,
            revealed: false,
            consumed_correctly: false,
        }
    }
}

/// Dense row-major grid of cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Grid {
    size: GridSize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid from row-major cells.
    ///
    /// Returns `None` when the cell count does not match the dimensions.
    #[must_use]
    pub fn from_cells(size: GridSize, cells: Vec<Cell>) -> Option<Self> {
        (cells.len() == size.cell_count()).then_some(Self { size, cells })
    }

    /// Creates a grid by evaluating `cell` for every position in row-major order.
    pub fn from_fn<F>(size: GridSize, cell: F) -> Self
    where
        F: FnMut(Position) -> Cell,
    {
        let cells = size.positions().map(cell).collect();
        Self { size, cells }
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Returns the cell at the provided position.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.size.index(position).and_then(|index| self.cells.get(index))
    }

    /// Returns mutable access to the cell at the provided position.
    pub fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        self.size
            .index(position)
            .and_then(|index| self.cells.get_mut(index))
    }

    /// Row-major slice of every cell.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterator over every position and the cell it addresses.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.size.positions().zip(self.cells.iter())
    }

    /// Iterator over every position and mutable cell.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Position, &mut Cell)> {
        self.size.positions().zip(self.cells.iter_mut())
    }
}

/// Mathematical rule a cell value must satisfy to be a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Values divisible by the target number.
    Multiples,
    /// Values dividing the target number.
    Factors,
    /// Prime values; the target number is unused.
    Primes,
    /// `a+b` expressions summing to the target number.
    Addition,
    /// `a-b` expressions whose difference is the target number.
    Subtraction,
    /// Either expression form equal to the target number.
    Mixed,
}

impl Rule {
    /// Reports whether the rule consults the target number.
    #[must_use]
    pub const fn uses_target_number(self) -> bool {
        !matches!(self, Self::Primes)
    }
}

/// Rule paired with the target number it is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveRule {
    /// Rule applied to every cell.
    pub rule: Rule,
    /// Number the rule is evaluated against; zero for primes.
    pub target_number: u32,
}

impl ActiveRule {
    /// Creates a rule pairing, normalising the target number for primes.
    #[must_use]
    pub const fn new(rule: Rule, target_number: u32) -> Self {
        let target_number = if rule.uses_target_number() {
            target_number
        } else {
            0
        };
        Self {
            rule,
            target_number,
        }
    }
}

impl fmt::Display for ActiveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::Multiples => write!(f, "Multiples of {}", self.target_number),
            Rule::Factors => write!(f, "Factors of {}", self.target_number),
            Rule::Primes => write!(f, "Prime numbers"),
            Rule::Addition => write!(f, "Sums equal to {}", self.target_number),
            Rule::Subtraction => write!(f, "Differences equal to {}", self.target_number),
            Rule::Mixed => write!(f, "Expressions equal to {}", self.target_number),
        }
    }
}

/// Behavior families available to troggles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Probabilistic pursuer gated on intelligence.
    Standard,
    /// Fast pursuer gated on aggressiveness.
    Speed,
    /// Breadth-first pathfinder.
    Smart,
    /// Intercepts the Muncher on the way to its nearest target.
    Blocker,
    /// Coordinates with other hunters to surround the Muncher.
    Hunter,
}

/// Difficulty bucket derived from the level identifier.
///
/// Deserialization rejects values outside `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DifficultyTier(u8);

/// Error produced when a raw value is not a supported difficulty tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("difficulty tier {0} is outside 1..=5")]
pub struct DifficultyTierError(pub u8);

impl TryFrom<u8> for DifficultyTier {
    type Error = DifficultyTierError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::BASE.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DifficultyTierError(value))
        }
    }
}

impl From<DifficultyTier> for u8 {
    fn from(tier: DifficultyTier) -> Self {
        tier.0
    }
}

impl DifficultyTier {
    /// Tier used for classic sessions and the first levels.
    pub const BASE: Self = Self(1);
    /// Highest tier.
    pub const MAX: Self = Self(5);

    /// Derives the tier from a level id using the 3/8/15/25 breakpoints.
    #[must_use]
    pub const fn from_level(level: LevelId) -> Self {
        let id = level.get();
        let tier = if id <= 3 {
            1
        } else if id <= 8 {
            2
        } else if id <= 15 {
            3
        } else if id <= 25 {
            4
        } else {
            5
        };
        Self(tier)
    }

    /// Creates a tier, clamping to the supported `1..=5` range.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value < 1 {
            Self::BASE
        } else if value > 5 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Numeric tier in `1..=5`.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Zero-based tier index suitable for table lookups.
    #[must_use]
    pub const fn index(&self) -> usize {
        (self.0 - 1) as usize
    }
}

/// Immutable per-troggle tuning derived from kind and tier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyBehaviorProfile {
    /// Behavior family the profile belongs to.
    pub kind: EnemyKind,
    /// Relative step rate; higher values move more often.
    pub speed: f32,
    /// Probability of tracking the Muncher for intelligence-gated policies.
    pub intelligence: f32,
    /// Probability of tracking the Muncher for aggressiveness-gated policies.
    pub aggressiveness: f32,
    /// Whether the troggle coordinates with siblings of the same kind.
    pub coordinated: bool,
}

/// Immutable view of a troggle used by sibling-aware behaviors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TroggleSnapshot {
    /// Identifier of the troggle.
    pub id: TroggleId,
    /// Behavior family of the troggle.
    pub kind: EnemyKind,
    /// Cell currently occupied by the troggle.
    pub position: Position,
}

/// Identifier of an objective within a level.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectiveId(String);

impl ObjectiveId {
    /// Creates an objective identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// String form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether an objective is required or optional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Objective that defines level completion.
    Primary,
    /// Optional objective that raises the star rating.
    Bonus,
}

/// Predicate an objective evaluates against the live game state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveCondition {
    /// No target cells remain.
    Complete,
    /// Score is at least the objective target.
    Score,
    /// Seconds remaining are at least the objective target.
    Time,
    /// Accuracy percentage is at least the objective target.
    Accuracy,
    /// No mistakes were made.
    NoMistakes,
}

/// Named, points-bearing completion predicate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    /// Identifier unique within the level.
    pub id: ObjectiveId,
    /// Primary or bonus.
    pub kind: ObjectiveKind,
    /// Predicate evaluated against the game state.
    pub condition: ObjectiveCondition,
    /// Threshold used by score, time, and accuracy predicates.
    #[serde(default)]
    pub target: Option<u32>,
    /// Points credited once when the objective completes.
    pub points: u32,
    /// Human-readable summary for presentation.
    #[serde(default)]
    pub description: String,
}

/// Read-only figures objectives are evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectiveContext {
    /// Live count of target cells left on the grid.
    pub remaining_targets: usize,
    /// Current cumulative score.
    pub score: u64,
    /// Seconds left on the countdown, if the session is timed.
    pub time_left: Option<u32>,
    /// Accuracy percentage in `0..=100`.
    pub accuracy: u32,
    /// Mistakes made so far.
    pub mistakes: u32,
}

/// Accuracy multiplier stored as hundredths so scoring stays exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccuracyMultiplier(u32);

impl AccuracyMultiplier {
    /// Multiplier of exactly one.
    pub const UNIT: Self = Self(100);

    /// Creates a multiplier from a value expressed in hundredths.
    #[must_use]
    pub const fn from_hundredths(hundredths: u32) -> Self {
        Self(hundredths)
    }

    /// Multiplier expressed in hundredths.
    #[must_use]
    pub const fn hundredths(&self) -> u32 {
        self.0
    }

    /// Multiplier as a floating-point factor for presentation.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

/// Itemised points produced by a single scoring action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringBreakdown {
    /// Points for the action before bonuses.
    pub base_points: u32,
    /// Bonus proportional to the fraction of time remaining.
    pub time_bonus: u32,
    /// Bonus derived from the difficulty tier multiplier.
    pub difficulty_bonus: u32,
    /// Bonus derived from the current streak.
    pub streak_bonus: u32,
    /// Sum of points of the objectives passed to the scorer.
    pub objective_bonus: u32,
    /// Factor applied to the summed points.
    pub accuracy_multiplier: AccuracyMultiplier,
}

impl ScoringBreakdown {
    /// Sum of every additive component before the multiplier.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        u64::from(self.base_points)
            + u64::from(self.time_bonus)
            + u64::from(self.difficulty_bonus)
            + u64::from(self.streak_bonus)
            + u64::from(self.objective_bonus)
    }
}

/// Configuration of a single catalog level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Identifier of the level.
    pub id: LevelId,
    /// Display name of the level.
    #[serde(default)]
    pub name: String,
    /// Number of grid rows.
    pub rows: u32,
    /// Number of grid columns.
    pub columns: u32,
    /// Countdown length in seconds, if the level is timed.
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
    /// Rule cells must satisfy.
    pub rule: Rule,
    /// Number the rule is evaluated against.
    #[serde(default)]
    pub target_number: u32,
    /// Number of troggles roaming the level.
    #[serde(default)]
    pub enemy_count: u32,
    /// Troggle kinds assigned by index, cycling when shorter than the count.
    #[serde(default)]
    pub enemy_kinds: Vec<EnemyKind>,
    /// Objectives evaluated during the level.
    #[serde(default)]
    pub objectives: Vec<Objective>,
    /// Cumulative score required to unlock the level.
    #[serde(default)]
    pub min_total_score: Option<u64>,
}

impl LevelConfig {
    /// Validated grid dimensions of the level.
    pub fn grid_size(&self) -> Result<GridSize, GridSizeError> {
        GridSize::new(self.rows, self.columns)
    }

    /// Difficulty tier derived from the level id.
    #[must_use]
    pub const fn tier(&self) -> DifficultyTier {
        DifficultyTier::from_level(self.id)
    }

    /// Rule pairing evaluated by the level.
    #[must_use]
    pub const fn active_rule(&self) -> ActiveRule {
        ActiveRule::new(self.rule, self.target_number)
    }

    /// Kind of the troggle at the provided index, cycling through the list.
    #[must_use]
    pub fn enemy_kind_at(&self, index: usize) -> EnemyKind {
        if self.enemy_kinds.is_empty() {
            return EnemyKind::Standard;
        }
        self.enemy_kinds[index % self.enemy_kinds.len()]
    }
}

/// Summary emitted when a level session ends, handed to the persistence layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Level that was played.
    pub level_id: LevelId,
    /// Whether every target was eaten.
    pub won: bool,
    /// Score at the end of the session.
    pub final_score: u64,
    /// Accuracy percentage in `0..=100`.
    pub accuracy: u32,
    /// Star rating earned.
    pub stars_earned: u8,
    /// Objectives completed during the session.
    pub completed_objective_ids: Vec<ObjectiveId>,
    /// Mistakes made.
    pub mistakes: u32,
    /// Longest streak of correct eats.
    pub best_streak: u32,
    /// Seconds left on the countdown, if timed.
    pub time_remaining: Option<u32>,
    /// Countdown length in seconds, if timed.
    pub time_limit: Option<u32>,
    /// Simulated duration of the session.
    pub duration_ms: u64,
}

/// Achievements unlocked across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// Won any level.
    FirstVictory,
    /// Won a level without mistakes.
    PerfectLevel,
    /// Earned three stars on a level.
    ThreeStars,
    /// Won with at least half of the time limit left.
    Speedster,
    /// Reached a streak of ten correct eats.
    StreakMaster,
    /// Accumulated a cumulative score of 1,000.
    HighScorer,
}

/// Best result recorded for a completed level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Level the record belongs to.
    pub level_id: LevelId,
    /// Highest score reached on the level.
    pub best_score: u64,
    /// Highest star rating earned on the level.
    pub best_stars: u8,
    /// Number of times the level was won.
    pub completions: u32,
}

/// Persisted progression data exchanged with the storage port.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    /// Records of completed levels ordered by level id.
    #[serde(default)]
    pub completed_levels: Vec<LevelRecord>,
    /// Sum of final scores of every won session.
    #[serde(default)]
    pub total_score: u64,
    /// Achievements unlocked so far, ordered.
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

impl SaveData {
    /// Record of the provided level, if it was completed.
    #[must_use]
    pub fn record(&self, level: LevelId) -> Option<&LevelRecord> {
        self.completed_levels
            .iter()
            .find(|record| record.level_id == level)
    }

    /// Reports whether the provided level was completed.
    #[must_use]
    pub fn is_completed(&self, level: LevelId) -> bool {
        self.record(level).is_some()
    }

    /// Reports whether the achievement was unlocked.
    #[must_use]
    pub fn has_achievement(&self, achievement: Achievement) -> bool {
        self.achievements.contains(&achievement)
    }
}
