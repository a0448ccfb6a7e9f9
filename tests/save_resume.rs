//! Saving a game between rounds and picking it up again.

use boardwalk::{
    autoplay, input_channel, AutoPlayer, BoardResult, EventTables, GameState, GridMap,
    RulesConfig, Trap, TrapEffect, TurnEngine,
};
use std::sync::Arc;
use tempfile::tempdir;

async fn play_rounds(
    map: Arc<GridMap>,
    state: GameState,
    rules: RulesConfig,
    rounds: u32,
) -> BoardResult<GameState> {
    let (gate, handle, requests) = input_channel();
    let bot = tokio::spawn(autoplay(handle, requests, AutoPlayer::new(rules.seed)));

    let mut engine = TurnEngine::new(map, state, gate, EventTables::standard(), rules);
    for _ in 0..rounds {
        if engine.state().is_finished() {
            break;
        }
        engine.play_round().await?;
    }
    let state = engine.into_state();
    bot.await.unwrap()?;
    Ok(state)
}

#[tokio::test]
async fn test_save_and_resume_between_rounds() -> BoardResult<()> {
    let map = Arc::new(GridMap::standard()?);
    let rules = RulesConfig {
        player_count: 3,
        victory_score: 100_000,
        ..RulesConfig::new(31)
    };

    let mut state = GameState::setup(&map, &rules)?;
    state.traps.push(Trap {
        position: map.prisons()[0],
        owner: Some(1),
        effect: TrapEffect::Damage(2),
    });
    let state = play_rounds(Arc::clone(&map), state, rules.clone(), 2).await?;
    assert_eq!(state.round, 2);

    let dir = tempdir()?;
    let path = dir.path().join("game.json");
    state.save_to_file(&path)?;
    let restored = GameState::load_from_file(&path)?;
    assert_eq!(restored, state);

    let resumed = play_rounds(map, restored, rules, 1).await?;
    assert_eq!(resumed.round, 3);
    assert_eq!(resumed.game_id, state.game_id);
    assert_eq!(resumed.players.len(), 3);
    Ok(())
}

#[test]
fn test_corrupt_save_is_rejected() -> BoardResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json")?;
    assert!(GameState::load_from_file(&path).is_err());
    assert!(GameState::load_from_file(dir.path().join("missing.json")).is_err());
    Ok(())
}
