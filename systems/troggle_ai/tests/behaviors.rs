use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use munchers_core::{DifficultyTier, EnemyKind, GridSize, Position, TroggleId, TroggleSnapshot};
use munchers_system_troggle_ai::{
    base_profile, classic_profile, next_position, profile_for, shortest_path, AiContext, Troggle,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const KINDS: [EnemyKind; 5] = [
    EnemyKind::Standard,
    EnemyKind::Speed,
    EnemyKind::Smart,
    EnemyKind::Blocker,
    EnemyKind::Hunter,
];

fn grid(rows: u32, columns: u32) -> GridSize {
    GridSize::new(rows, columns).expect("valid size")
}

fn troggle(id: u32, row: u32, column: u32, kind: EnemyKind) -> Troggle {
    Troggle::new(TroggleId::new(id), Position::new(row, column), base_profile(kind))
}

#[test]
fn smart_troggle_closes_distance_every_step() {
    let size = grid(5, 5);
    let muncher = Position::new(4, 4);
    let mut smart = troggle(0, 0, 0, EnemyKind::Smart);
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let context = AiContext {
        muncher,
        size,
        targets: &[],
        siblings: &[],
    };

    let mut moves = 0;
    for _ in 0..64 {
        let before = smart.position();
        let next = next_position(&mut smart, &context, &mut rng);
        if next != before {
            assert_eq!(
                next.manhattan_distance(muncher) + 1,
                before.manhattan_distance(muncher)
            );
            moves += 1;
        }
        smart.relocate(next);
        if next == muncher {
            break;
        }
    }
    assert_eq!(smart.position(), muncher);
    assert_eq!(moves, 8);
}

#[test]
fn blocker_heads_for_the_intercept_midpoint() {
    let size = grid(5, 5);
    let targets = [Position::new(4, 4), Position::new(0, 4)];
    let context = AiContext {
        muncher: Position::new(0, 0),
        size,
        targets: &targets,
        siblings: &[],
    };
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    // Nearest target (0,4) gives the midpoint (0,2).
    let mut blocker = troggle(0, 4, 2, EnemyKind::Blocker);
    assert_eq!(
        next_position(&mut blocker, &context, &mut rng),
        Position::new(3, 2)
    );

    let empty = AiContext {
        targets: &[],
        ..context
    };
    let mut pursuer = troggle(1, 4, 0, EnemyKind::Blocker);
    assert_eq!(
        next_position(&mut pursuer, &empty, &mut rng),
        Position::new(3, 0)
    );
}

#[test]
fn hunter_skips_slots_held_by_siblings() {
    let size = grid(5, 5);
    let muncher = Position::new(2, 2);
    let mut rng = ChaCha8Rng::seed_from_u64(13);
    let hunter = troggle(1, 1, 3, EnemyKind::Hunter);

    let alone = [hunter.snapshot()];
    let context = AiContext {
        muncher,
        size,
        targets: &[],
        siblings: &alone,
    };
    assert_eq!(
        next_position(&mut hunter.clone(), &context, &mut rng),
        Position::new(1, 2)
    );

    let siblings = [
        TroggleSnapshot {
            id: TroggleId::new(0),
            kind: EnemyKind::Hunter,
            position: Position::new(1, 2),
        },
        hunter.snapshot(),
    ];
    let context = AiContext {
        siblings: &siblings,
        ..context
    };
    assert_eq!(
        next_position(&mut hunter.clone(), &context, &mut rng),
        Position::new(2, 3)
    );
}

#[test]
fn hunter_on_a_slot_pursues_directly() {
    let size = grid(5, 5);
    let mut hunter = troggle(0, 1, 2, EnemyKind::Hunter);
    let siblings = [hunter.snapshot()];
    let context = AiContext {
        muncher: Position::new(2, 2),
        size,
        targets: &[],
        siblings: &siblings,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    assert_eq!(
        next_position(&mut hunter, &context, &mut rng),
        Position::new(2, 2)
    );
}

#[test]
fn replaying_the_same_seed_reproduces_every_step() {
    fn run(seed: u64) -> u64 {
        let size = grid(7, 8);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut troggles: Vec<Troggle> = KINDS
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                let id = u32::try_from(index).expect("small index");
                Troggle::new(
                    TroggleId::new(id),
                    Position::new(0, id),
                    profile_for(*kind, DifficultyTier::new(3)),
                )
            })
            .collect();
        let targets = [Position::new(3, 3), Position::new(6, 1)];
        let muncher = Position::new(6, 7);
        let mut hasher = DefaultHasher::new();
        for _ in 0..40 {
            let snapshots: Vec<TroggleSnapshot> = troggles.iter().map(Troggle::snapshot).collect();
            let context = AiContext {
                muncher,
                size,
                targets: &targets,
                siblings: &snapshots,
            };
            let next: Vec<Position> = troggles
                .iter_mut()
                .map(|troggle| next_position(troggle, &context, &mut rng))
                .collect();
            for (troggle, position) in troggles.iter_mut().zip(next) {
                troggle.relocate(position);
                position.hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    assert_eq!(run(0xfeed), run(0xfeed));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn breadth_first_paths_are_manhattan_on_open_grids(
        rows in 3u32..12,
        columns in 3u32..12,
        seed in any::<[u32; 4]>(),
    ) {
        let size = grid(rows, columns);
        let start = Position::new(seed[0] % rows, seed[1] % columns);
        let goal = Position::new(seed[2] % rows, seed[3] % columns);
        let path = shortest_path(size, start, goal, |_| false).expect("open grid");
        prop_assert_eq!(
            u32::try_from(path.len()).expect("small path"),
            start.manhattan_distance(goal)
        );
    }

    #[test]
    fn every_policy_takes_single_axis_steps_inside_the_grid(
        rows in 3u32..9,
        columns in 3u32..9,
        kind_index in 0usize..KINDS.len(),
        classic in any::<bool>(),
        coordinates in any::<[u32; 4]>(),
        seed in any::<u64>(),
    ) {
        let size = grid(rows, columns);
        let start = Position::new(coordinates[0] % rows, coordinates[1] % columns);
        let muncher = Position::new(coordinates[2] % rows, coordinates[3] % columns);
        let profile = if classic { classic_profile() } else { base_profile(KINDS[kind_index]) };
        let mut subject = Troggle::new(TroggleId::new(0), start, profile);
        let siblings = [subject.snapshot()];
        let targets = [Position::new(0, 0), Position::new(rows - 1, 0)];
        let context = AiContext { muncher, size, targets: &targets, siblings: &siblings };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..12 {
            let before = subject.position();
            let next = next_position(&mut subject, &context, &mut rng);
            prop_assert!(size.contains(next));
            prop_assert!(before.manhattan_distance(next) <= 1);
            subject.relocate(next);
        }
    }
}
