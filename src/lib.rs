//! # Boardwalk
//!
//! Rules engine for a turn-based multiplayer party board game played on a fixed grid.
//!
//! ## Architecture Overview
//!
//! Players take turns rolling dice, walking along constrained paths and landing on
//! tiles that trigger effects. The crate is organised around a handful of pieces:
//!
//! - **Grid Map**: static board topology and legal-move computation
//! - **Player**: per-player mutable state and the verbs acting on it
//! - **Event Tables**: draw piles of task/opportunity/destiny/punishment effects
//! - **Turn Engine**: the async sequence that drives rounds, movement, traps,
//!   combat and tile triggers
//! - **Input Gate**: single-slot request/response channel used whenever the engine
//!   needs a human decision
//! - **Game State**: the single source of truth, serializable for save/resume
//!
//! Rendering, audio and transport are not part of this crate. Presentation is told
//! what happened through the [`Presenter`] trait and answers prompts through a
//! [`GateHandle`].

pub mod events;
pub mod game;
pub mod input;
pub mod rendering;
pub mod utils;

// Core module re-exports
pub use events::*;
pub use game::*;
pub use input::*;
pub use rendering::*;
pub use utils::*;

/// Core error type for the Boardwalk rules engine.
///
/// Every variant except `Io` and `Serde` is an invariant violation: a malformed map,
/// a broken table, or a caller breaking the input protocol. None of them are
/// recoverable game states.
#[derive(thiserror::Error, Debug)]
pub enum BoardError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Map failed validation at construction
    #[error("Invalid map: {0}")]
    InvalidMap(String),

    /// Rules configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A tile lookup fell outside the board
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),

    /// An Empty tile was triggered
    #[error("Empty tile at {0:?} cannot be triggered")]
    UnreachableTile(Position),

    /// Movement found no legal direction
    #[error("Dead end at {0:?}: no legal moves")]
    DeadEnd(Position),

    /// Player id is not part of the game
    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Another event is still waiting for its verdict
    #[error("An event is already open")]
    EventAlreadyOpen,

    /// No outstanding request matches the id being resolved
    #[error("No pending request with id {0}")]
    NoPendingRequest(RequestId),

    /// The engine asked for input while a request was still outstanding
    #[error("Request {0} is still outstanding")]
    RequestOutstanding(RequestId),

    /// The supplied answer does not fit the prompt
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The other side of the input gate went away
    #[error("Input channel closed")]
    InputClosed,

    /// An event table has no entries to draw from
    #[error("Event table '{0}' is empty")]
    EmptyTable(String),
}

/// Result type used throughout the Boardwalk codebase.
pub type BoardResult<T> = Result<T, BoardError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rule constants.
pub mod config {
    /// Health every player starts with and is restored to after a knockout
    pub const DEFAULT_PLAYER_HEALTH: i32 = 6;

    /// Percentage of a defeated player's score taken as plunder
    pub const PLUNDER_PERCENT: i64 = 60;

    /// Score granted for landing on a spawner
    pub const SPAWNER_BONUS: i64 = 50;

    /// Score needed on a spawner to win
    pub const DEFAULT_VICTORY_SCORE: i64 = 1000;

    /// Score each player starts with
    pub const DEFAULT_STARTING_SCORE: i64 = 100;

    /// Faces on every die
    pub const DIE_FACES: u32 = 6;

    /// How long a message stays visible in the feed
    pub const MESSAGE_TTL_MS: u64 = 5000;
}
