//! Integration test to ensure a game can be seated and played without errors.

use boardwalk::{
    autoplay, input_channel, AutoPlayer, BoardResult, EventTables, GameState, GridMap,
    RulesConfig, TileKind, TurnEngine,
};
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn test_basic_startup() -> BoardResult<()> {
    let map = GridMap::standard()?;
    let rules = RulesConfig {
        player_count: 4,
        ..RulesConfig::new(12345)
    };
    let state = GameState::setup(&map, &rules)?;

    assert_eq!(state.players.len(), 4);
    assert_eq!(state.player_ids(), vec![1, 2, 3, 4]);
    assert_eq!(state.round, 0);
    assert!(state.winner.is_none());
    assert!(state.event.is_none());

    let mut seats = HashSet::new();
    for player in state.players.values() {
        assert_eq!(map.tile_at(player.position)?, TileKind::Spawner);
        assert!(seats.insert(player.position), "two players share a spawner");
        assert!(player.fixed_direction);
        assert_eq!(player.score, rules.starting_score);
        // The forced first step must lead somewhere
        assert!(map
            .legal_moves(player.position, Some(player.direction))
            .iter()
            .any(|(direction, _)| *direction == player.direction));
    }

    Ok(())
}

#[test]
fn test_setup_is_seeded() -> BoardResult<()> {
    let map = GridMap::standard()?;
    let rules = RulesConfig {
        player_count: 3,
        ..RulesConfig::new(77)
    };

    let first = GameState::setup(&map, &rules)?;
    let second = GameState::setup(&map, &rules)?;
    let seats = |state: &GameState| -> Vec<_> {
        state.players.values().map(|p| (p.position, p.direction)).collect()
    };
    assert_eq!(seats(&first), seats(&second));
    Ok(())
}

#[test]
fn test_too_many_players_rejected() -> BoardResult<()> {
    let map = GridMap::standard()?;
    let rules = RulesConfig {
        player_count: 9,
        ..RulesConfig::new(1)
    };
    assert!(GameState::setup(&map, &rules).is_err());
    Ok(())
}

#[tokio::test]
async fn test_autoplayed_game_runs_to_completion() -> BoardResult<()> {
    let map = Arc::new(GridMap::standard()?);
    let rules = RulesConfig {
        player_count: 4,
        max_rounds: Some(150),
        ..RulesConfig::for_testing(2024)
    };
    let state = GameState::setup(&map, &rules)?;

    let (gate, handle, requests) = input_channel();
    let bot = tokio::spawn(autoplay(handle, requests, AutoPlayer::new(5)));

    let mut engine = TurnEngine::new(map, state, gate, EventTables::standard(), rules);
    let winner = engine.run().await?;
    let state = engine.into_state();
    let answered = bot.await.unwrap()?;

    assert!(answered > 0);
    assert!(winner.is_some() || state.round == 150);
    assert_eq!(winner, state.winner);
    assert!(state.event.is_none());
    assert!(state.steps.is_none());
    assert!(state.pending_dice.is_none());
    assert!(state.active_player().is_none());
    for player in state.players.values() {
        assert!(player.score >= 0);
        assert!(player.health > 0);
    }
    if let Some(winner) = winner {
        assert!(state.player(winner)?.score >= state.victory_score);
    }
    Ok(())
}

#[tokio::test]
async fn test_round_limit_stops_game() -> BoardResult<()> {
    let map = Arc::new(GridMap::standard()?);
    let rules = RulesConfig {
        player_count: 2,
        victory_score: i64::MAX,
        max_rounds: Some(3),
        ..RulesConfig::new(8)
    };
    let state = GameState::setup(&map, &rules)?;

    let (gate, handle, requests) = input_channel();
    let bot = tokio::spawn(autoplay(handle, requests, AutoPlayer::new(8)));

    let mut engine = TurnEngine::new(map, state, gate, EventTables::standard(), rules);
    assert_eq!(engine.run().await?, None);
    assert_eq!(engine.state().round, 3);
    assert!(!engine.is_running());

    drop(engine);
    bot.await.unwrap()?;
    Ok(())
}
