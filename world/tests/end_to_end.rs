use munchers_core::{
    ActiveRule, Cell, CellValue, Command, DifficultyTier, Direction, EnemyKind, Event, Grid,
    GridSize, LevelConfig, LevelId, LossCause, Objective, ObjectiveCondition, ObjectiveId,
    ObjectiveKind, PlayMode, Position, Rule, TroggleId,
};
use munchers_system_troggle_ai::base_profile;
use munchers_world::{
    self as world, eat, move_muncher, query, GameState, Layout, Troggle, HINT_DELAY_TICKS,
};
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

fn standard_troggle(row: u32, column: u32) -> Troggle {
    Troggle::new(
        TroggleId::new(0),
        Position::new(row, column),
        base_profile(EnemyKind::Standard),
    )
}

fn multiples_of_two_layout() -> Layout {
    Layout {
        mode: PlayMode::Classic,
        level_id: None,
        grid: numbered_grid(4, 5),
        rule: ActiveRule::new(Rule::Multiples, 2),
        muncher: Position::new(3, 4),
        troggles: vec![standard_troggle(0, 0)],
        tier: DifficultyTier::BASE,
        time_limit: None,
        objectives: Vec::new(),
    }
}

/// Walks to the goal without crossing the top-left corner.
///
/// From the top row the walk goes down first, otherwise it walks along the
/// current row first.
fn walk_to(mut state: GameState, goal: Position) -> GameState {
    let rows_first = state.muncher().row() == 0;
    if rows_first {
        state = walk_rows(state, goal);
    }
    while state.muncher().column() != goal.column() {
        let delta = if goal.column() > state.muncher().column() { 1 } else { -1 };
        let outcome = move_muncher(state, 0, delta);
        assert!(!outcome.collided);
        state = outcome.state;
    }
    walk_rows(state, goal)
}

fn walk_rows(mut state: GameState, goal: Position) -> GameState {
    while state.muncher().row() != goal.row() {
        let delta = if goal.row() > state.muncher().row() { 1 } else { -1 };
        let outcome = move_muncher(state, delta, 0);
        assert!(!outcome.collided);
        state = outcome.state;
    }
    state
}

fn eat_every_target(mut state: GameState) -> GameState {
    while let Some(goal) = query::live_targets(&state).first().copied() {
        state = walk_to(state, goal);
        let outcome = eat(state);
        assert!(outcome.consumed);
        assert!(outcome.correct);
        assert!(outcome.points > 0);
        state = outcome.state;
    }
    state
}

#[test]
fn eating_every_multiple_of_two_wins() {
    let state = GameState::from_layout(multiples_of_two_layout());
    assert_eq!(query::remaining_targets(&state), 10);

    let state = eat_every_target(state);

    assert!(state.is_game_won());
    assert!(!state.is_game_over());
    assert_eq!(query::remaining_targets(&state), 0);
    assert_eq!(state.mistakes(), 0);
    assert_eq!(state.correct_eats(), 10);
    assert_eq!(state.best_streak(), 10);
    assert_eq!(state.troggles()[0].position(), Position::new(0, 0));
}

#[test]
fn generated_classic_board_can_be_cleared() {
    let size = GridSize::new(4, 5).expect("valid size");
    let rule = ActiveRule::new(Rule::Multiples, 2);
    let state = (0..64)
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            GameState::classic(size, rule, 1, &mut rng)
        })
        .find(|state| !query::live_targets(state).contains(&Position::new(0, 0)))
        .expect("some seed leaves the troggle corner free of targets");

    assert_eq!(state.muncher(), Position::new(3, 4));
    assert_eq!(state.troggles()[0].position(), Position::new(0, 0));
    assert_eq!(state.rule(), rule);

    let state = eat_every_target(state);
    assert!(state.is_game_won());
    assert_eq!(state.mistakes(), 0);
}

#[test]
fn three_wrong_eats_lose_regardless_of_score() {
    let config = LevelConfig {
        id: LevelId::new(1),
        name: "No troggles".to_owned(),
        rows: 5,
        columns: 5,
        time_limit_secs: Some(90),
        rule: Rule::Multiples,
        target_number: 5,
        enemy_count: 0,
        enemy_kinds: Vec::new(),
        objectives: Vec::new(),
        min_total_score: None,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let state = GameState::level(&config, &mut rng).expect("valid level");
    let decoy = state
        .grid()
        .iter()
        .find(|(_, cell)| !cell.is_target)
        .map(|(position, _)| position)
        .expect("filler cell");
    let mut state = walk_to(state, decoy);

    for expected in 1..=3 {
        let outcome = eat(state);
        assert!(outcome.consumed);
        assert!(!outcome.correct);
        assert_eq!(outcome.points, 0);
        state = outcome.state;
        assert_eq!(state.mistakes(), expected);
        assert_eq!(state.score(), 0);
        assert_eq!(state.streak(), 0);
    }

    assert!(state.is_game_over());
    assert!(!state.is_game_won());
    assert_eq!(state.loss_cause(), Some(LossCause::TooManyMistakes));

    let after = eat(state);
    assert!(!after.consumed);
    assert_eq!(after.state.mistakes(), 3);
}

#[test]
fn eaten_cells_are_empty() {
    let state = GameState::from_layout(multiples_of_two_layout());
    let first = eat(state);
    assert!(first.correct);
    let score = first.state.score();

    let second = eat(first.state);
    assert!(!second.consumed);
    assert_eq!(second.points, 0);
    assert_eq!(second.state.score(), score);
    assert_eq!(second.state.mistakes(), 0);
    let cell = second
        .state
        .grid()
        .cell(Position::new(3, 4))
        .expect("cell");
    assert!(cell.consumed_correctly);
    assert!(!cell.is_target);
}

#[test]
fn moves_clamp_at_the_edges() {
    let state = GameState::from_layout(multiples_of_two_layout());
    let outcome = move_muncher(state, 0, 1);
    assert!(!outcome.collided);
    assert_eq!(outcome.state.muncher(), Position::new(3, 4));

    let outcome = move_muncher(outcome.state, 7, -9);
    assert_eq!(outcome.state.muncher(), Position::new(3, 0));
    let grid = outcome.state.grid();
    assert!(grid.cell(Position::new(3, 0)).expect("cell").occupied_by_player);
    assert!(!grid.cell(Position::new(3, 4)).expect("cell").occupied_by_player);
}

#[test]
fn walking_into_a_troggle_completes_the_move_and_loses() {
    let mut layout = multiples_of_two_layout();
    layout.troggles = vec![standard_troggle(3, 3)];
    let state = GameState::from_layout(layout);

    let outcome = move_muncher(state, 0, -1);
    assert!(outcome.collided);
    assert_eq!(outcome.state.muncher(), Position::new(3, 3));
    assert!(outcome.state.is_game_over());
    assert_eq!(
        outcome.state.loss_cause(),
        Some(LossCause::CaughtByTroggle)
    );

    let frozen = move_muncher(outcome.state, -1, 0);
    assert!(!frozen.collided);
    assert_eq!(frozen.state.muncher(), Position::new(3, 3));
}

#[test]
fn eating_under_a_troggle_loses() {
    let mut layout = multiples_of_two_layout();
    layout.troggles = vec![standard_troggle(3, 4)];
    let state = GameState::from_layout(layout);

    let outcome = eat(state);
    assert!(outcome.collided);
    assert!(!outcome.consumed);
    assert!(outcome.state.is_game_over());
    assert_eq!(outcome.state.score(), 0);
}

#[test]
fn hints_reveal_the_nearest_target() {
    let mut layout = multiples_of_two_layout();
    layout.troggles.clear();
    layout.muncher = Position::new(3, 3);
    let mut state = GameState::from_layout(layout);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut events = Vec::new();

    for _ in 0..HINT_DELAY_TICKS - 1 {
        state = world::apply(state, Command::Tick, &mut rng, &mut events);
    }
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::CellRevealed { .. })));

    state = world::apply(state, Command::Tick, &mut rng, &mut events);
    assert_eq!(
        events.last(),
        Some(&Event::CellRevealed {
            cell: Position::new(2, 3)
        })
    );
    assert!(state.grid().cell(Position::new(2, 3)).expect("cell").revealed);
    assert_eq!(state.ticks_since_correct(), 0);

    for _ in 0..HINT_DELAY_TICKS {
        state = world::apply(state, Command::Tick, &mut rng, &mut events);
    }
    assert_eq!(
        events.last(),
        Some(&Event::CellRevealed {
            cell: Position::new(3, 2)
        })
    );

    for _ in 0..4 {
        state = world::apply(state, Command::Tick, &mut rng, &mut events);
    }
    assert_eq!(state.ticks_since_correct(), 4);
    state = world::apply(
        state,
        Command::Move {
            direction: Direction::East,
        },
        &mut rng,
        &mut events,
    );
    state = world::apply(state, Command::Eat, &mut rng, &mut events);
    assert_eq!(state.correct_eats(), 1);
    assert_eq!(state.ticks_since_correct(), 0);
}

#[test]
fn objectives_credit_points_once_and_rate_stars() {
    let objective = |id: &str, kind, condition, target, points| Objective {
        id: ObjectiveId::new(id),
        kind,
        condition,
        target,
        points,
        description: String::new(),
    };
    let layout = Layout {
        mode: PlayMode::Level,
        level_id: Some(LevelId::new(2)),
        grid: numbered_grid(3, 3),
        rule: ActiveRule::new(Rule::Multiples, 4),
        muncher: Position::new(2, 2),
        troggles: Vec::new(),
        tier: DifficultyTier::BASE,
        time_limit: Some(60),
        objectives: vec![
            objective(
                "clear",
                ObjectiveKind::Primary,
                ObjectiveCondition::Complete,
                None,
                100,
            ),
            objective(
                "points",
                ObjectiveKind::Bonus,
                ObjectiveCondition::Score,
                Some(30),
                20,
            ),
            objective(
                "flawless",
                ObjectiveKind::Bonus,
                ObjectiveCondition::NoMistakes,
                None,
                50,
            ),
        ],
    };
    let state = GameState::from_layout(layout);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut events = Vec::new();

    let state = world::apply(
        state,
        Command::Move {
            direction: Direction::West,
        },
        &mut rng,
        &mut events,
    );
    events.clear();
    let state = world::apply(state, Command::Eat, &mut rng, &mut events);
    assert_eq!(
        events,
        vec![
            Event::CellEaten {
                cell: Position::new(2, 1),
                correct: true,
                points: 50,
            },
            Event::ObjectiveCompleted {
                objective: ObjectiveId::new("points"),
                points: 20,
            },
        ]
    );
    assert_eq!(state.score(), 70);

    let state = move_muncher(state, -1, 0).state;
    let state = move_muncher(state, 0, -1).state;
    events.clear();
    let state = world::apply(state, Command::Eat, &mut rng, &mut events);
    assert_eq!(
        events,
        vec![
            Event::CellEaten {
                cell: Position::new(1, 0),
                correct: true,
                points: 70,
            },
            Event::ObjectiveCompleted {
                objective: ObjectiveId::new("clear"),
                points: 100,
            },
            Event::ObjectiveCompleted {
                objective: ObjectiveId::new("flawless"),
                points: 50,
            },
            Event::GameWon,
        ]
    );
    assert_eq!(state.score(), 290);

    let summary = query::summary(&state).expect("finished level");
    assert!(summary.won);
    assert_eq!(summary.level_id, LevelId::new(2));
    assert_eq!(summary.final_score, 290);
    assert_eq!(summary.stars_earned, 3);
    assert_eq!(summary.accuracy, 100);
    assert_eq!(
        summary.completed_objective_ids,
        vec![
            ObjectiveId::new("points"),
            ObjectiveId::new("clear"),
            ObjectiveId::new("flawless"),
        ]
    );
    assert_eq!(summary.time_remaining, Some(60));
}

#[test]
fn classic_troggles_move_on_every_call() {
    let size = GridSize::new(5, 6).expect("valid size");
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut state = GameState::classic(size, ActiveRule::new(Rule::Multiples, 3), 1, &mut rng);
    assert_eq!(state.troggles()[0].position(), Position::new(0, 0));

    // Eight single steps cannot cover the nine cells to the Muncher's corner.
    for _ in 0..8 {
        let before = state.troggles()[0].position();
        state = world::move_troggles(state, &mut rng);
        let after = state.troggles()[0].position();
        assert_eq!(before.manhattan_distance(after), 1);
        assert!(!state.is_terminal());
    }
}
