//! # Game State Module
//!
//! Central game state shared by the turn engine and the presentation layer.
//!
//! This module contains the main GameState struct: the players in turn order, the
//! round counter, the in-progress move, the single open event slot, registered
//! traps, the message feed and the winner. It is the single source of truth and
//! round-trips through JSON for save/resume.

use crate::events::{Effect, EventCategory, TrapEffect};
use crate::game::{GridMap, Player, PlayerId, Position, RulesConfig};
use crate::{BoardError, BoardResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, SystemTime};
use uuid::Uuid;

/// An event waiting for its verdict.
///
/// Only one can be open at a time. Opening one is how the engine tells the input
/// layer that a decision is needed; resolving it applies `effect` and clears the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub category: EventCategory,
    pub player: PlayerId,
    pub title: String,
    pub description: String,
    pub has_fail: bool,
    pub effect: Effect,
}

/// A coordinate that fires an effect on anyone passing over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub position: Position,
    /// Player who set the trap; never triggers it and is credited for knockouts
    pub owner: Option<PlayerId>,
    pub effect: TrapEffect,
}

/// A single message feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub text: String,
    /// When the message stops being shown; None keeps it forever
    pub expires_at: Option<SystemTime>,
}

/// Append-only message feed whose entries expire from view after a while.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    next_id: u64,
    ttl_ms: u64,
    entries: Vec<LogEntry>,
}

impl MessageLog {
    /// Creates a log whose messages stay visible for `ttl`. A zero ttl never expires.
    pub fn new(ttl: Duration) -> Self {
        Self {
            next_id: 0,
            ttl_ms: ttl.as_millis() as u64,
            entries: Vec::new(),
        }
    }

    /// Appends a message with the default ttl and returns its id.
    pub fn push(&mut self, text: impl Into<String>) -> u64 {
        let ttl = (self.ttl_ms > 0).then(|| Duration::from_millis(self.ttl_ms));
        self.push_with_ttl(text, ttl)
    }

    /// Appends a message with an explicit ttl.
    ///
    /// Messages that have already expired are dropped first, so the log only ever
    /// holds what is still visible plus the new entry.
    pub fn push_with_ttl(&mut self, text: impl Into<String>, ttl: Option<Duration>) -> u64 {
        let now = SystemTime::now();
        self.prune(now);

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(LogEntry {
            id,
            text: text.into(),
            expires_at: ttl.map(|ttl| now + ttl),
        });
        id
    }

    /// Removes a message early.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// Messages still visible at `now`, oldest first.
    pub fn visible_at(&self, now: SystemTime) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.expires_at.map_or(true, |at| at > now))
            .map(|entry| entry.text.as_str())
            .collect()
    }

    pub fn visible(&self) -> Vec<&str> {
        self.visible_at(SystemTime::now())
    }

    /// Drops messages that expired before `now`.
    pub fn prune(&mut self, now: SystemTime) {
        self.entries
            .retain(|entry| entry.expires_at.map_or(true, |at| at > now));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any message contains `needle`. Handy for tests and debugging.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.text.contains(needle))
    }
}

/// Central game state containing all mutable game data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Identifies the game across saves
    pub game_id: Uuid,
    /// Players keyed by id; id order is turn order
    pub players: BTreeMap<PlayerId, Player>,
    /// Current round, starting at 0 before the first round
    pub round: u32,
    /// Steps left in the move in progress; None when nobody is moving
    pub steps: Option<u32>,
    /// Dice total waiting for acknowledgement; None when no roll is in progress
    pub pending_dice: Option<u32>,
    /// The open event, if any
    pub event: Option<ActiveEvent>,
    /// Registered traps
    pub traps: Vec<Trap>,
    /// Message feed
    pub messages: MessageLog,
    /// Score needed on a spawner to win
    pub victory_score: i64,
    /// Number of seats configured for the game
    pub player_count: usize,
    /// Set once, when someone wins
    pub winner: Option<PlayerId>,
}

impl GameState {
    /// Creates an empty state with no players.
    ///
    /// # Examples
    ///
    /// ```
    /// use boardwalk::{GameState, RulesConfig};
    ///
    /// let state = GameState::new(&RulesConfig::default());
    /// assert_eq!(state.round, 0);
    /// assert!(state.players.is_empty());
    /// ```
    pub fn new(rules: &RulesConfig) -> Self {
        Self {
            game_id: Uuid::new_v4(),
            players: BTreeMap::new(),
            round: 0,
            steps: None,
            pending_dice: None,
            event: None,
            traps: Vec::new(),
            messages: MessageLog::new(rules.message_ttl()),
            victory_score: rules.victory_score,
            player_count: rules.player_count,
            winner: None,
        }
    }

    /// Seats `rules.player_count` players on distinct, randomly chosen spawners.
    ///
    /// Each player faces the spawner's configured direction and takes their first
    /// step that way without being asked.
    pub fn setup(map: &GridMap, rules: &RulesConfig) -> BoardResult<Self> {
        rules.validate()?;

        let mut spawns = map.spawn_points();
        if spawns.len() < rules.player_count {
            return Err(BoardError::InvalidState(format!(
                "Not enough spawners: {} for {} players",
                spawns.len(),
                rules.player_count
            )));
        }

        let mut rng = StdRng::seed_from_u64(rules.seed);
        spawns.shuffle(&mut rng);

        let mut state = Self::new(rules);
        for (index, (position, direction)) in
            spawns.into_iter().take(rules.player_count).enumerate()
        {
            let id = index as PlayerId + 1;
            let mut player = Player::new(
                id,
                format!("Player {}", id),
                position,
                direction,
                rules.starting_score,
            );
            player.fixed_direction = true;
            state.add_player(player)?;
        }

        log::info!("Seated {} players", state.players.len());
        Ok(state)
    }

    /// Adds a player. Ids must be unique.
    pub fn add_player(&mut self, player: Player) -> BoardResult<PlayerId> {
        let id = player.id;
        if self.players.contains_key(&id) {
            return Err(BoardError::InvalidState(format!(
                "Player {} already exists",
                id
            )));
        }
        self.players.insert(id, player);
        Ok(id)
    }

    pub fn player(&self, id: PlayerId) -> BoardResult<&Player> {
        self.players.get(&id).ok_or(BoardError::UnknownPlayer(id))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> BoardResult<&mut Player> {
        self.players.get_mut(&id).ok_or(BoardError::UnknownPlayer(id))
    }

    /// Player ids in turn order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    /// Every player except `id`, in turn order.
    pub fn others(&self, id: PlayerId) -> Vec<PlayerId> {
        self.players.keys().copied().filter(|other| *other != id).collect()
    }

    /// Other players standing on the same tile as `id`.
    pub fn collisions(&self, id: PlayerId) -> BoardResult<Vec<PlayerId>> {
        let position = self.player(id)?.position;
        Ok(self
            .players
            .values()
            .filter(|other| other.id != id && other.position == position)
            .map(|other| other.id)
            .collect())
    }

    /// Marks exactly one player (or nobody) as active.
    pub fn set_active(&mut self, id: Option<PlayerId>) {
        for player in self.players.values_mut() {
            player.active = Some(player.id) == id;
        }
    }

    pub fn active_player(&self) -> Option<PlayerId> {
        self.players.values().find(|p| p.active).map(|p| p.id)
    }

    /// Appends to the message feed and mirrors the text to the log.
    pub fn push_message(&mut self, text: impl Into<String>) -> u64 {
        let text = text.into();
        log::info!("{}", text);
        self.messages.push(text)
    }

    /// Fills the single event slot.
    pub fn open_event(&mut self, event: ActiveEvent) -> BoardResult<()> {
        if self.event.is_some() {
            return Err(BoardError::EventAlreadyOpen);
        }
        self.event = Some(event);
        Ok(())
    }

    /// Empties the event slot, returning what was in it.
    pub fn close_event(&mut self) -> BoardResult<ActiveEvent> {
        self.event
            .take()
            .ok_or_else(|| BoardError::InvalidState("No event is open".to_string()))
    }

    /// Records the winner. Later calls keep the first winner.
    pub fn declare_winner(&mut self, id: PlayerId) {
        if self.winner.is_none() {
            self.winner = Some(id);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Saves the game state to JSON.
    pub fn save_to_json(&self) -> BoardResult<String> {
        serde_json::to_string_pretty(self).map_err(BoardError::from)
    }

    /// Loads game state from JSON.
    pub fn load_from_json(json: &str) -> BoardResult<Self> {
        serde_json::from_str(json).map_err(BoardError::from)
    }

    /// Writes the game state to a file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> BoardResult<()> {
        std::fs::write(path, self.save_to_json()?)?;
        Ok(())
    }

    /// Reads game state from a file.
    pub fn load_from_file(path: impl AsRef<Path>) -> BoardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }
}
