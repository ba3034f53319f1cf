//! Property tests for the rule invariants.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use gridwar::board::{Cell, Coord, GameMode, Grid, Precision, Seat, Troops};
use gridwar::config::GameConfig;
use gridwar::engine::Engine;
use gridwar::movegen::random_turn;
use gridwar::protocol::Snapshot;
use gridwar::resolve::{calculate_farm_bonus, next_farm_group, resolve_move, CombatOutcome};

fn mode_strategy() -> impl Strategy<Value = GameMode> {
    prop_oneof![Just(GameMode::Classic), Just(GameMode::Competitive)]
}

fn precision_strategy() -> impl Strategy<Value = Precision> {
    prop_oneof![Just(Precision::Whole), Just(Precision::Half)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_play_keeps_every_cell_consistent(
        seed in any::<u64>(),
        mode in mode_strategy(),
        precision in precision_strategy(),
        turns in 1usize..60,
    ) {
        let config = GameConfig { mode, precision, ..GameConfig::default() };
        let mut engine = Engine::headless(config);
        let mut rng = SmallRng::seed_from_u64(seed);

        for _ in 0..turns {
            if engine.state().game_over {
                break;
            }
            let seat = engine.state().current;
            for input in random_turn(engine.state(), seat, precision, &mut rng) {
                if engine.apply(input).is_err() {
                    break;
                }
            }
            prop_assert_eq!(engine.state().grid.find_inconsistency(), None);
        }

        // Whatever happened, the state survives the wire.
        let snapshot = engine.snapshot();
        let json = snapshot.to_json().unwrap();
        let decoded = Snapshot::from_json(&json).unwrap();
        prop_assert_eq!(decoded, snapshot);
    }

    #[test]
    fn farm_bonus_and_group_agree(mode in mode_strategy(), farms in 0u32..500) {
        let bonus = calculate_farm_bonus(mode, farms);
        let group = next_farm_group(mode, farms);
        prop_assert!(group.progress < group.group_size);

        let next_bonus = calculate_farm_bonus(mode, farms + 1);
        let completes = group.progress + 1 == group.group_size;
        prop_assert_eq!(next_bonus, bonus + u32::from(completes));
        if !completes {
            prop_assert_eq!(next_farm_group(mode, farms + 1).progress, group.progress + 1);
        }
    }

    #[test]
    fn combat_survivors_are_the_difference(
        attacker in 1u32..40,
        defender_unmoved in 0u32..20,
        defender_moved in 0u32..20,
    ) {
        prop_assume!(defender_unmoved + defender_moved > 0);
        let from = Coord::new(1, 1).unwrap();
        let to = Coord::new(1, 2).unwrap();
        let mut grid = Grid::empty();
        grid[from] = Cell {
            owner: Some(Seat::One),
            troops: Troops::from_halves(attacker),
            moved: Troops::ZERO,
        };
        grid[to] = Cell {
            owner: Some(Seat::Two),
            troops: Troops::from_halves(defender_unmoved),
            moved: Troops::from_halves(defender_moved),
        };

        let a = Troops::from_halves(attacker);
        let d = Troops::from_halves(defender_unmoved + defender_moved);
        let outcome = resolve_move(&mut grid, Seat::One, from, to, a).unwrap();
        let dst = grid[to];

        prop_assert_eq!(dst.total(), a.abs_diff(d));
        prop_assert!(dst.is_consistent());
        prop_assert_eq!(grid[from], Cell::EMPTY);
        match outcome {
            CombatOutcome::Captured { .. } => prop_assert_eq!(dst.owner, Some(Seat::One)),
            CombatOutcome::Repelled { .. } => prop_assert_eq!(dst.owner, Some(Seat::Two)),
            CombatOutcome::MutualDestruction { .. } => prop_assert_eq!(dst, Cell::EMPTY),
            CombatOutcome::Reinforced { .. } => prop_assert!(false, "enemy cell cannot be reinforced"),
        }
    }
}
