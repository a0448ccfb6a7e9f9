//! # Boardwalk Main Entry Point
//!
//! Seats the players on the standard board and plays a full game with every seat
//! answered by the autoplayer.

use boardwalk::{
    autoplay, input_channel, AutoPlayer, BoardError, BoardResult, EventTables, GameState,
    GridMap, LogPresenter, RulesConfig, TurnEngine,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Command line arguments for Boardwalk.
#[derive(Parser, Debug)]
#[command(name = "boardwalk")]
#[command(about = "A dice-and-path party board game played by bots")]
#[command(version)]
struct Args {
    /// Random seed for seating, dice and table draws
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of players
    #[arg(short, long)]
    players: Option<usize>,

    /// Rules file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Event table file (JSON)
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Stop after this many rounds
    #[arg(long)]
    max_rounds: Option<u32>,

    /// Write the final game state here
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> BoardResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    log::info!("Starting Boardwalk v{}", boardwalk::VERSION);

    let rules = load_rules(&args)?;
    let tables = match &args.tables {
        Some(path) => EventTables::load_from_path(path)?,
        None => EventTables::standard(),
    };

    let map = Arc::new(GridMap::standard()?);
    let state = GameState::setup(&map, &rules)?;
    log::info!("Game {} on a {}x{} board", state.game_id, map.width(), map.height());

    let (gate, handle, requests) = input_channel();
    let bot = tokio::spawn(autoplay(handle, requests, AutoPlayer::new(rules.seed)));

    let mut engine =
        TurnEngine::new(map, state, gate, tables, rules).with_presenter(LogPresenter);
    let result = engine.run().await;

    let state = engine.into_state();
    // Dropping the engine closes the gate, which ends the autoplayer
    match bot.await {
        Ok(Ok(answered)) => log::debug!("Autoplayer answered {} prompts", answered),
        Ok(Err(e)) => log::error!("Autoplayer failed: {}", e),
        Err(e) => log::error!("Autoplayer task panicked: {}", e),
    }

    match result {
        Ok(Some(winner)) => {
            let player = state.player(winner)?;
            log::info!(
                "{} wins with {} points after {} rounds",
                player.name,
                player.score,
                state.round
            );
        }
        Ok(None) => log::info!("No winner after {} rounds", state.round),
        Err(e) => {
            log::error!("Game aborted: {}", e);
            return Err(e);
        }
    }

    for player in state.players.values() {
        log::info!("  {}: {} points", player.name, player.score);
    }

    if let Some(path) = &args.save {
        state.save_to_file(path)?;
        log::info!("Saved game to {}", path.display());
    }

    Ok(())
}

/// Reads the rules file if given, then applies command line overrides.
fn load_rules(args: &Args) -> BoardResult<RulesConfig> {
    let mut rules = match &args.config {
        Some(path) => RulesConfig::load_from_path(path)?,
        None => RulesConfig::default(),
    };
    if let Some(seed) = args.seed {
        rules.seed = seed;
    }
    if let Some(players) = args.players {
        rules.player_count = players;
    }
    if args.max_rounds.is_some() {
        rules.max_rounds = args.max_rounds;
    }
    rules.validate()?;
    Ok(rules)
}

fn initialize_logging(log_level: &str) -> BoardResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        let filter = tracing_subscriber::EnvFilter::try_new(log_level)
            .map_err(|e| BoardError::InvalidConfig(format!("Bad log level: {}", e)))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .map_err(|e| BoardError::InvalidState(format!("Logging setup failed: {}", e)))?;
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        let level: log::LevelFilter = log_level
            .parse()
            .map_err(|_| BoardError::InvalidConfig(format!("Bad log level: {}", log_level)))?;
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .try_init()
            .map_err(|e| BoardError::InvalidState(format!("Logging setup failed: {}", e)))?;
    }

    Ok(())
}
