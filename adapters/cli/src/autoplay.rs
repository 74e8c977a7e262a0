use munchers_core::{Command, Direction, Position};
use munchers_world::{query, GameState, Session};
use tracing::debug;

/// Counts of the actions taken by [`play`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PlayReport {
    /// Ticks submitted.
    pub(crate) ticks: u32,
    /// Moves submitted.
    pub(crate) moves: u32,
    /// Eats submitted.
    pub(crate) eats: u32,
}

/// Plays the session greedily until it ends or `max_ticks` ticks elapse.
///
/// Between ticks the player either eats the target it stands on or walks one
/// step toward the nearest live target, avoiding cells held by troggles.
pub(crate) fn play(session: &mut Session, max_ticks: u32) -> PlayReport {
    let mut report = PlayReport::default();
    while !session.state().is_terminal() && report.ticks < max_ticks {
        if let Some(command) = choose(session.state()) {
            match command {
                Command::Eat => report.eats += 1,
                _ => report.moves += 1,
            }
            let _ = session.submit(command);
            if session.state().is_terminal() {
                break;
            }
        }
        let token = session.tick_token();
        let _ = session.tick(token);
        report.ticks += 1;
    }
    debug!(?report, "autoplay finished");
    report
}

/// Next player command for the state, if any helps.
pub(crate) fn choose(state: &GameState) -> Option<Command> {
    let targets = query::live_targets(state);
    let muncher = state.muncher();
    if targets.contains(&muncher) {
        return Some(Command::Eat);
    }
    let goal = targets
        .iter()
        .copied()
        .min_by_key(|target| (target.manhattan_distance(muncher), *target))?;

    let size = state.grid().size();
    let blocked = |position: Position| {
        state
            .troggles()
            .iter()
            .any(|troggle| troggle.position() == position)
    };
    let mut steps: Vec<(Direction, Position)> = Direction::ALL
        .into_iter()
        .filter_map(|direction| muncher.step(direction, size).map(|next| (direction, next)))
        .filter(|(_, next)| !blocked(*next))
        .collect();
    steps.sort_by_key(|(_, next)| next.manhattan_distance(goal));
    let (direction, next) = steps.first().copied()?;
    if next.manhattan_distance(goal) >= muncher.manhattan_distance(goal) {
        return None;
    }
    Some(Command::Move { direction })
}
