//! Property-based tests for movement, dice, draws and damage.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use boardwalk::config::{DEFAULT_PLAYER_HEALTH, DIE_FACES, PLUNDER_PERCENT};
use boardwalk::{
    apply_damage, Dice, Direction, Effect, EventCategory, EventEntry, EventTable, GameState,
    GridMap, Player, Position, RulesConfig,
};

fn any_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::East),
        Just(Direction::South),
        Just(Direction::West),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Legal moves never reverse the incoming direction and only lead to adjacent
    /// walkable tiles.
    #[test]
    fn prop_no_backtracking(x in 0i32..11, y in 0i32..11, incoming in any_direction()) {
        let map = GridMap::standard().unwrap();
        let pos = Position::new(x, y);

        for (direction, target) in map.legal_moves(pos, Some(incoming)) {
            prop_assert_ne!(direction, incoming.reverse());
            prop_assert_eq!(target, pos.step(direction));
            prop_assert!(map.tile_at(target).unwrap().is_walkable());
        }
    }

    /// A walker arriving on any walkable tile of the standard board always has
    /// somewhere to go.
    #[test]
    fn prop_standard_board_has_no_dead_ends(x in 0i32..11, y in 0i32..11, incoming in any_direction()) {
        let map = GridMap::standard().unwrap();
        let pos = Position::new(x, y);
        let from = pos.step(incoming.reverse());
        let arrived = map.tile_at(pos).map(|t| t.is_walkable()).unwrap_or(false)
            && map.tile_at(from).map(|t| t.is_walkable()).unwrap_or(false);
        if !arrived {
            return Ok(());
        }

        prop_assert!(!map.legal_moves(pos, Some(incoming)).is_empty());
    }

    /// Dice stay within their faces and doubled rolls sum two dice.
    #[test]
    fn prop_dice_in_range(seed in any::<u64>(), doubles in any::<bool>()) {
        let mut dice = Dice::new(seed);
        let roll = dice.roll(doubles);

        prop_assert_eq!(roll.faces.len(), if doubles { 2 } else { 1 });
        prop_assert_eq!(roll.total, roll.faces.iter().sum::<u32>());
        for face in roll.faces {
            prop_assert!((1..=DIE_FACES).contains(&face));
        }
    }

    /// Every entry comes up exactly once before the pile is reshuffled.
    #[test]
    fn prop_draws_without_replacement(seed in any::<u64>(), size in 1usize..20) {
        let entries: Vec<EventEntry> = (0..size)
            .map(|i| EventEntry::new(format!("Entry {}", i), "", Effect::AddScore(i as i64)))
            .collect();
        let mut table = EventTable::new(EventCategory::Destiny, entries);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut titles = HashSet::new();
        for _ in 0..size {
            titles.insert(table.draw(&mut rng).unwrap().title);
        }
        prop_assert_eq!(titles.len(), size);
        prop_assert_eq!(table.remaining(), 0);
    }

    /// Damage either lowers health or knocks out, and plunder is conserved between
    /// the two players.
    #[test]
    fn prop_damage_and_plunder(
        score in 0i64..1_000_000,
        health in 1i32..=DEFAULT_PLAYER_HEALTH,
        amount in 1i32..20,
        credited in any::<bool>()
    ) {
        let mut state = GameState::new(&RulesConfig::new(1));
        state.add_player(Player::new(1, "A", Position::new(0, 0), Direction::East, 500)).unwrap();
        let mut target = Player::new(2, "B", Position::new(1, 0), Direction::West, score);
        target.health = health;
        state.add_player(target).unwrap();

        let source = if credited { Some(1) } else { None };
        let outcome = apply_damage(&mut state, 2, amount, source, PLUNDER_PERCENT).unwrap();
        let target = state.player(2).unwrap();

        if amount >= health {
            prop_assert!(outcome.knocked_out);
            prop_assert_eq!(target.health, DEFAULT_PLAYER_HEALTH);
            prop_assert_eq!(target.dizziness, 1);
            prop_assert_eq!(outcome.plunder, score * PLUNDER_PERCENT / 100);
        } else {
            prop_assert!(!outcome.knocked_out);
            prop_assert_eq!(target.health, health - amount);
            prop_assert_eq!(outcome.plunder, 0);
        }

        prop_assert_eq!(target.score, score - outcome.plunder);
        prop_assert!(target.score >= 0);
        let attacker = state.player(1).unwrap().score;
        if credited {
            prop_assert_eq!(attacker, 500 + outcome.plunder);
        } else {
            prop_assert_eq!(attacker, 500);
        }
    }
}
