//! # Game Module
//!
//! Core game state management, board topology, players and the turn engine.
//!
//! This module contains the fundamental building blocks of a Boardwalk game:
//! - Grid map and legal-move computation
//! - Player entities and their counters
//! - Shared game state with save/resume
//! - Combat and damage resolution
//! - The async turn engine

pub mod combat;
pub mod engine;
pub mod map;
pub mod player;
pub mod rules;
pub mod state;

pub use combat::*;
pub use engine::*;
pub use map::*;
pub use player::*;
pub use rules::*;
pub use state::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the board.
///
/// # Examples
///
/// ```
/// use boardwalk::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the position one step away in `direction`.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Facing and movement directions on the board.
///
/// Paths only run along grid lines, so there are no diagonals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use boardwalk::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::East => Position::new(1, 0),
            Direction::South => Position::new(0, 1),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Returns the direction pointing the other way.
    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Returns all four directions in clockwise order starting from north.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}

/// Identifier for players. Ids are handed out in turn order.
pub type PlayerId = u32;
