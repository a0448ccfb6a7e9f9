//! # Rules Configuration
//!
//! Tunable rules for a single game, loadable from JSON.

use crate::config;
use crate::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// When a player's immunity counter ticks down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImmunityPolicy {
    /// At every turn start, even a turn lost to dizziness
    EveryTurn,
    /// Only on turns where the player actually rolls
    WhenActing,
}

/// Configuration for a game.
///
/// Every field has a default, so a JSON file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Random seed for dice, draws and setup
    pub seed: u64,
    /// Number of players to seat
    pub player_count: usize,
    /// Score needed on a spawner to win
    pub victory_score: i64,
    /// Score each player starts with
    pub starting_score: i64,
    /// Score granted for landing on a spawner
    pub spawner_bonus: i64,
    /// Percentage of a defeated player's score taken as plunder
    pub plunder_percent: i64,
    /// When immunity ticks down
    pub immunity_policy: ImmunityPolicy,
    /// Cosmetic pause after each walk step, in milliseconds
    pub step_delay_ms: u64,
    /// How long messages stay visible, in milliseconds
    pub message_ttl_ms: u64,
    /// Stop after this many rounds even without a winner
    pub max_rounds: Option<u32>,
}

impl RulesConfig {
    /// Creates the default rules with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            player_count: 2,
            victory_score: config::DEFAULT_VICTORY_SCORE,
            starting_score: config::DEFAULT_STARTING_SCORE,
            spawner_bonus: config::SPAWNER_BONUS,
            plunder_percent: config::PLUNDER_PERCENT,
            immunity_policy: ImmunityPolicy::EveryTurn,
            step_delay_ms: 0,
            message_ttl_ms: config::MESSAGE_TTL_MS,
            max_rounds: None,
        }
    }

    /// Rules for tests: no delays, small victory threshold.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            victory_score: 300,
            ..Self::new(seed)
        }
    }

    /// Checks the values make sense together.
    pub fn validate(&self) -> BoardResult<()> {
        if self.player_count == 0 {
            return Err(BoardError::InvalidConfig(
                "player_count must be at least 1".to_string(),
            ));
        }
        if !(0..=100).contains(&self.plunder_percent) {
            return Err(BoardError::InvalidConfig(format!(
                "plunder_percent {} is outside 0..=100",
                self.plunder_percent
            )));
        }
        if self.victory_score <= 0 {
            return Err(BoardError::InvalidConfig(
                "victory_score must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn message_ttl(&self) -> Duration {
        Duration::from_millis(self.message_ttl_ms)
    }

    /// Parses and validates rules from JSON.
    pub fn load_from_json(json: &str) -> BoardResult<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Reads rules from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> BoardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new(42)
    }
}
