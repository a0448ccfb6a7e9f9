//! # Player Entity
//!
//! Per-player mutable state: position, facing, score, health and status counters.
//! Players are never removed from a game; a knockout resets them in place.

use crate::config::DEFAULT_PLAYER_HEALTH;
use crate::game::{Direction, PlayerId, Position};
use serde::{Deserialize, Serialize};

/// A participant in the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique id, also the turn order key
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current board position
    pub position: Position,
    /// Facing, used to rule out backtracking and for forced moves
    pub direction: Direction,
    /// Current score, never negative once an effect has applied
    pub score: i64,
    /// Current health; zero or below means knockout
    pub health: i32,
    /// Turns left to skip
    pub dizziness: u32,
    /// Turns left during which attacks are voided
    pub immune: u32,
    /// Pending doubled dice rolls
    pub double_dice: u32,
    /// Pending doubled attack rolls
    pub double_damage: u32,
    /// Next successful task pays double
    pub double_task_score: bool,
    /// Whether it is currently this player's turn
    pub active: bool,
    /// Next walk step follows `direction` without asking
    pub fixed_direction: bool,
}

/// Coarse status used by presentation to pick a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Normal,
    Dizzy,
}

impl Player {
    /// Creates a player at full health with no counters set.
    ///
    /// # Examples
    ///
    /// ```
    /// use boardwalk::{Direction, Player, Position};
    ///
    /// let player = Player::new(1, "Rudolph", Position::new(0, 0), Direction::East, 100);
    /// assert_eq!(player.health, boardwalk::config::DEFAULT_PLAYER_HEALTH);
    /// assert_eq!(player.dizziness, 0);
    /// ```
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        position: Position,
        direction: Direction,
        score: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            direction,
            score,
            health: DEFAULT_PLAYER_HEALTH,
            dizziness: 0,
            immune: 0,
            double_dice: 0,
            double_damage: 0,
            double_task_score: false,
            active: false,
            fixed_direction: false,
        }
    }

    pub fn status(&self) -> PlayerStatus {
        if self.dizziness > 0 {
            PlayerStatus::Dizzy
        } else {
            PlayerStatus::Normal
        }
    }

    pub fn is_immune(&self) -> bool {
        self.immune > 0
    }

    /// Adds `delta` to the score, clamping the result at zero.
    ///
    /// Returns the change actually applied.
    pub fn add_score(&mut self, delta: i64) -> i64 {
        let before = self.score;
        self.score = (self.score + delta).max(0);
        self.score - before
    }

    /// Subtracts `amount` from health.
    ///
    /// Returns true when the hit is a knockout, in which case health is restored to
    /// the default and the player is stunned for exactly one turn. Score transfer is
    /// handled by the combat module since it involves a second player.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health -= amount;
        if self.health > 0 {
            return false;
        }
        self.health = DEFAULT_PLAYER_HEALTH;
        self.dizziness = 1;
        true
    }

    pub fn heal(&mut self) {
        self.health = DEFAULT_PLAYER_HEALTH;
    }

    /// Consumes one pending doubled dice roll, if any.
    pub fn take_double_dice(&mut self) -> bool {
        if self.double_dice == 0 {
            return false;
        }
        self.double_dice -= 1;
        true
    }

    /// Consumes one pending doubled attack roll, if any.
    pub fn take_double_damage(&mut self) -> bool {
        if self.double_damage == 0 {
            return false;
        }
        self.double_damage -= 1;
        true
    }

    /// Consumes the doubled task score flag.
    pub fn take_double_task_score(&mut self) -> bool {
        std::mem::take(&mut self.double_task_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(1, "Test", Position::new(0, 0), Direction::East, 100)
    }

    #[test]
    fn test_damage_without_knockout() {
        let mut p = player();
        assert!(!p.take_damage(2));
        assert_eq!(p.health, DEFAULT_PLAYER_HEALTH - 2);
        assert_eq!(p.dizziness, 0);
    }

    #[test]
    fn test_knockout_resets_health_and_stuns_once() {
        let mut p = player();
        p.health = 1;
        p.dizziness = 3;
        assert!(p.take_damage(3));
        assert_eq!(p.health, DEFAULT_PLAYER_HEALTH);
        assert_eq!(p.dizziness, 1);
    }

    #[test]
    fn test_exact_zero_is_knockout() {
        let mut p = player();
        p.health = 2;
        assert!(p.take_damage(2));
    }

    #[test]
    fn test_score_clamps_at_zero() {
        let mut p = player();
        assert_eq!(p.add_score(-150), -100);
        assert_eq!(p.score, 0);
        assert_eq!(p.add_score(30), 30);
    }

    #[test]
    fn test_counters_are_consumed() {
        let mut p = player();
        assert!(!p.take_double_dice());
        p.double_dice = 1;
        assert!(p.take_double_dice());
        assert!(!p.take_double_dice());

        p.double_task_score = true;
        assert!(p.take_double_task_score());
        assert!(!p.double_task_score);
    }

    #[test]
    fn test_status() {
        let mut p = player();
        assert_eq!(p.status(), PlayerStatus::Normal);
        p.dizziness = 1;
        assert_eq!(p.status(), PlayerStatus::Dizzy);
    }
}
