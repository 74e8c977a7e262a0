#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid construction and token placement for new sessions.
//!
//! The generator draws values from a resolved [`RulePlan`], scatters a bounded
//! number of target cells across the board and then runs a consistency pass
//! so that every cached target flag agrees with the rule engine.

use std::collections::HashSet;

use munchers_core::{ActiveRule, Cell, CellValue, Grid, GridSize, PlayMode, Position};
use munchers_system_rules::{is_correct, RulePlan};
use rand::{seq::SliceRandom, Rng};
use tracing::{debug, warn};

/// Upper bound on target cells placed on a fresh grid.
pub const MAX_TARGET_CELLS: usize = 8;

/// Lower bound on target cells placed on a fresh grid.
pub const MIN_TARGET_CELLS: usize = 3;

/// Cells that must stay free of targets so both the Muncher and a troggle fit.
const RESERVED_CELLS: usize = 2;

/// Number of target cells to place for a pool of the given size.
///
/// The count is `min(8, pool)` raised to at least three and then capped at
/// the cell count minus two.
#[must_use]
pub fn target_cell_count(correct_pool_len: usize, size: GridSize) -> usize {
    let capacity = size.cell_count().saturating_sub(RESERVED_CELLS);
    correct_pool_len
        .min(MAX_TARGET_CELLS)
        .max(MIN_TARGET_CELLS)
        .min(capacity)
}

/// Builds a grid whose values are drawn from the plan's pools.
pub fn generate<R>(size: GridSize, plan: &RulePlan, rng: &mut R) -> Grid
where
    R: Rng + ?Sized,
{
    let cell_count = size.cell_count();
    let target_count = target_cell_count(plan.correct().len(), size);

    let target_cells: HashSet<Position> = rand::seq::index::sample(rng, cell_count, target_count)
        .iter()
        .filter_map(|index| size.position(index))
        .collect();

    let mut grid = Grid::from_fn(size, |position| {
        let is_target = target_cells.contains(&position);
        let pool = if is_target {
            plan.correct()
        } else {
            plan.incorrect()
        };
        let value = pool.choose(rng).copied().unwrap_or(CellValue::Numeric(0));
        Cell::new(value, is_target)
    });
    let healed = reconcile_targets(&mut grid, plan.active());
    debug!(
        rows = size.rows(),
        columns = size.columns(),
        targets = target_count,
        healed,
        rule = %plan.active(),
        "generated grid"
    );
    grid
}

/// Re-derives every cached target flag from the rule engine.
///
/// Consumed cells are never targets. Returns the number of flags that had to
/// be corrected.
pub fn reconcile_targets(grid: &mut Grid, active: ActiveRule) -> usize {
    let mut healed = 0;
    for (_, cell) in grid.iter_mut() {
        let live = !cell.consumed_correctly && is_correct(cell.value, active);
        if cell.is_target != live {
            cell.is_target = live;
            healed += 1;
        }
    }
    healed
}

/// Starting cells of the Muncher and every troggle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    muncher: Position,
    troggles: Vec<Position>,
}

impl Placement {
    /// Starting cell of the Muncher.
    #[must_use]
    pub const fn muncher(&self) -> Position {
        self.muncher
    }

    /// Starting cells of the troggles in spawn order.
    #[must_use]
    pub fn troggles(&self) -> &[Position] {
        &self.troggles
    }
}

/// Chooses starting cells for the requested mode.
pub fn place<R>(mode: PlayMode, size: GridSize, troggle_count: usize, rng: &mut R) -> Placement
where
    R: Rng + ?Sized,
{
    match mode {
        PlayMode::Classic => place_classic(size, troggle_count, rng),
        PlayMode::Level => place_level(size, troggle_count, rng),
    }
}

/// Classic placement: Muncher bottom-right, first troggle top-left.
///
/// Troggles beyond the first are scattered over unoccupied cells.
pub fn place_classic<R>(size: GridSize, troggle_count: usize, rng: &mut R) -> Placement
where
    R: Rng + ?Sized,
{
    let [top_left, _, _, bottom_right] = size.corners();
    let mut occupied = vec![bottom_right];
    let mut troggles = Vec::with_capacity(troggle_count);
    for index in 0..troggle_count {
        let position = if index == 0 {
            top_left
        } else {
            unoccupied_cell(size, &occupied, rng)
        };
        occupied.push(position);
        troggles.push(position);
    }
    Placement {
        muncher: bottom_right,
        troggles,
    }
}

/// Level placement: every token lands on an independently chosen free cell.
pub fn place_level<R>(size: GridSize, troggle_count: usize, rng: &mut R) -> Placement
where
    R: Rng + ?Sized,
{
    let muncher = unoccupied_cell(size, &[], rng);
    let mut occupied = vec![muncher];
    let mut troggles = Vec::with_capacity(troggle_count);
    for _ in 0..troggle_count {
        let position = unoccupied_cell(size, &occupied, rng);
        occupied.push(position);
        troggles.push(position);
    }
    Placement { muncher, troggles }
}

fn unoccupied_cell<R>(size: GridSize, occupied: &[Position], rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    let free: Vec<Position> = size
        .positions()
        .filter(|position| !occupied.contains(position))
        .collect();
    match free.choose(rng) {
        Some(position) => *position,
        None => {
            let fallback = Position::new(0, 0);
            warn!(
                rows = size.rows(),
                columns = size.columns(),
                occupied = occupied.len(),
                %fallback,
                "no unoccupied cell left; using fallback placement"
            );
            fallback
        }
    }
}
