//! Breadth-first shortest paths over the 4-connected grid.

use std::collections::VecDeque;

use munchers_core::{GridSize, Position};

/// Computes a shortest path from `start` to `goal`.
///
/// The returned queue excludes `start` and ends at `goal`; it is empty when
/// both positions coincide. Every cell is enqueued at most once, so the search
/// is bounded by the cell count. Returns `None` when the goal is unreachable or
/// either endpoint lies outside the grid.
pub fn shortest_path<F>(
    size: GridSize,
    start: Position,
    goal: Position,
    mut is_blocked: F,
) -> Option<VecDeque<Position>>
where
    F: FnMut(Position) -> bool,
{
    let start_index = size.index(start)?;
    let goal_index = size.index(goal)?;
    if start_index == goal_index {
        return Some(VecDeque::new());
    }

    let mut came_from: Vec<Option<usize>> = vec![None; size.cell_count()];
    let mut visited = vec![false; size.cell_count()];
    visited[start_index] = true;

    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        let Some(current_index) = size.index(cell) else {
            continue;
        };

        for neighbor in size.neighbors(cell) {
            if is_blocked(neighbor) {
                continue;
            }

            let Some(neighbor_index) = size.index(neighbor) else {
                continue;
            };

            if visited[neighbor_index] {
                continue;
            }

            visited[neighbor_index] = true;
            came_from[neighbor_index] = Some(current_index);

            if neighbor_index == goal_index {
                return Some(reconstruct(size, &came_from, start_index, goal_index));
            }

            queue.push_back(neighbor);
        }
    }

    None
}

fn reconstruct(
    size: GridSize,
    came_from: &[Option<usize>],
    start_index: usize,
    goal_index: usize,
) -> VecDeque<Position> {
    let mut path = VecDeque::new();
    let mut cursor = goal_index;
    while cursor != start_index {
        if let Some(position) = size.position(cursor) {
            path.push_front(position);
        }
        match came_from.get(cursor).copied().flatten() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    path
}
