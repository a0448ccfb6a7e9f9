//! # Events Module
//!
//! Random event tables for task, opportunity, destiny and punishment tiles.
//!
//! Table entries carry an [`Effect`] descriptor instead of a closure, so content can
//! be loaded from JSON and effects can be inspected and tested on their own. The
//! turn engine is the only thing that interprets effects.

pub mod tables;

pub use tables::*;

use crate::{BoardError, BoardResult};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happens to the player who drew an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Task payout picked by the verdict
    Score { success: i64, failure: i64 },
    /// Flat score change
    AddScore(i64),
    /// Damage with nobody to credit for a knockout
    Damage(i32),
    /// Restore full health
    Heal,
    /// Skip this many turns
    Stun(u32),
    /// Void attacks for this many turns
    Immunity(u32),
    /// Next roll uses two dice
    DoubleDice,
    /// Next attack deals double damage
    DoubleDamage,
    /// Next successful task pays double
    DoubleTaskScore,
    /// Jump to a random other teleport tile without asking
    Teleport,
    /// Pick another player and attack them without confirmation
    ForcedAttack,
    /// Pick another player and take up to `amount` of their score
    StealScore { amount: i64 },
    /// Leave a trap on the current tile
    PlaceTrap(TrapEffect),
}

/// What a trap does to whoever walks over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapEffect {
    /// Damage credited to the trap owner
    Damage(i32),
    /// Skip this many turns
    Stun(u32),
    /// Flat score change
    Score(i64),
}

/// The four drawable tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Task,
    Opportunity,
    Destiny,
    Punishment,
}

impl EventCategory {
    /// Only tasks can fail.
    pub fn has_fail(self) -> bool {
        self == EventCategory::Task
    }

    pub fn label(self) -> &'static str {
        match self {
            EventCategory::Task => "task",
            EventCategory::Opportunity => "opportunity",
            EventCategory::Destiny => "destiny",
            EventCategory::Punishment => "punishment",
        }
    }
}

/// A single drawable entry: title, description and effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    pub title: String,
    pub description: String,
    pub effect: Effect,
}

impl EventEntry {
    pub fn new(title: impl Into<String>, description: impl Into<String>, effect: Effect) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            effect,
        }
    }
}

/// One table with its draw pile.
///
/// Draws are without replacement: every entry comes up once before the pile is
/// reshuffled, so the same entry can repeat at most across a reshuffle boundary.
#[derive(Debug, Clone)]
pub struct EventTable {
    category: EventCategory,
    entries: Vec<EventEntry>,
    pile: Vec<usize>,
}

impl EventTable {
    pub fn new(category: EventCategory, entries: Vec<EventEntry>) -> Self {
        Self {
            category,
            entries,
            pile: Vec::new(),
        }
    }

    pub fn category(&self) -> EventCategory {
        self.category
    }

    pub fn entries(&self) -> &[EventEntry] {
        &self.entries
    }

    /// Entries left before the next reshuffle.
    pub fn remaining(&self) -> usize {
        self.pile.len()
    }

    /// Draws the next entry, reshuffling when the pile runs out.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> BoardResult<EventEntry> {
        if self.entries.is_empty() {
            return Err(BoardError::EmptyTable(self.category.label().to_string()));
        }
        if self.pile.is_empty() {
            self.pile = (0..self.entries.len()).collect();
            self.pile.shuffle(rng);
            log::debug!("Reshuffled {} table", self.category.label());
        }
        let index = self
            .pile
            .pop()
            .ok_or_else(|| BoardError::EmptyTable(self.category.label().to_string()))?;
        Ok(self.entries[index].clone())
    }
}

/// Serializable table content, as supplied by whoever authors the game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableContent {
    pub task: Vec<EventEntry>,
    pub opportunity: Vec<EventEntry>,
    pub destiny: Vec<EventEntry>,
    pub punishment: Vec<EventEntry>,
}

/// All four tables.
#[derive(Debug, Clone)]
pub struct EventTables {
    task: EventTable,
    opportunity: EventTable,
    destiny: EventTable,
    punishment: EventTable,
}

impl EventTables {
    pub fn new(content: TableContent) -> Self {
        Self {
            task: EventTable::new(EventCategory::Task, content.task),
            opportunity: EventTable::new(EventCategory::Opportunity, content.opportunity),
            destiny: EventTable::new(EventCategory::Destiny, content.destiny),
            punishment: EventTable::new(EventCategory::Punishment, content.punishment),
        }
    }

    /// The built-in party content.
    pub fn standard() -> Self {
        Self::new(standard_content())
    }

    pub fn table(&self, category: EventCategory) -> &EventTable {
        match category {
            EventCategory::Task => &self.task,
            EventCategory::Opportunity => &self.opportunity,
            EventCategory::Destiny => &self.destiny,
            EventCategory::Punishment => &self.punishment,
        }
    }

    pub fn table_mut(&mut self, category: EventCategory) -> &mut EventTable {
        match category {
            EventCategory::Task => &mut self.task,
            EventCategory::Opportunity => &mut self.opportunity,
            EventCategory::Destiny => &mut self.destiny,
            EventCategory::Punishment => &mut self.punishment,
        }
    }

    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        category: EventCategory,
        rng: &mut R,
    ) -> BoardResult<EventEntry> {
        self.table_mut(category).draw(rng)
    }

    /// Loads table content from JSON.
    pub fn load_from_json(json: &str) -> BoardResult<Self> {
        let content: TableContent = serde_json::from_str(json)?;
        Ok(Self::new(content))
    }

    /// Loads table content from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> BoardResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }
}

impl Default for EventTables {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn numbered(n: i64) -> Vec<EventEntry> {
        (0..n)
            .map(|i| EventEntry::new(format!("entry {}", i), "", Effect::AddScore(i)))
            .collect()
    }

    #[test]
    fn test_draw_exhausts_before_repeating() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut table = EventTable::new(EventCategory::Opportunity, numbered(5));

        let first_cycle: HashSet<String> = (0..5)
            .map(|_| table.draw(&mut rng).unwrap().title)
            .collect();
        assert_eq!(first_cycle.len(), 5);
        assert_eq!(table.remaining(), 0);

        table.draw(&mut rng).unwrap();
        assert_eq!(table.remaining(), 4);
    }

    #[test]
    fn test_empty_table_errors() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut table = EventTable::new(EventCategory::Destiny, Vec::new());
        assert!(matches!(table.draw(&mut rng), Err(BoardError::EmptyTable(_))));
    }

    #[test]
    fn test_only_tasks_fail() {
        assert!(EventCategory::Task.has_fail());
        assert!(!EventCategory::Opportunity.has_fail());
        assert!(!EventCategory::Destiny.has_fail());
        assert!(!EventCategory::Punishment.has_fail());
    }

    #[test]
    fn test_load_content_from_json() {
        let json = r#"{
            "task": [
                { "title": "Sing", "description": "Sing a song", "effect": { "Score": { "success": 50, "failure": -20 } } }
            ],
            "punishment": [
                { "title": "Trip", "description": "Ouch", "effect": { "Damage": 2 } }
            ]
        }"#;
        let mut tables = EventTables::load_from_json(json).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let task = tables.draw(EventCategory::Task, &mut rng).unwrap();
        assert_eq!(task.effect, Effect::Score { success: 50, failure: -20 });
        assert!(tables.table(EventCategory::Opportunity).entries().is_empty());
        assert_eq!(
            tables.draw(EventCategory::Punishment, &mut rng).unwrap().effect,
            Effect::Damage(2)
        );
    }

    #[test]
    fn test_standard_tables_are_populated() {
        let tables = EventTables::standard();
        for category in [
            EventCategory::Task,
            EventCategory::Opportunity,
            EventCategory::Destiny,
            EventCategory::Punishment,
        ] {
            assert!(!tables.table(category).entries().is_empty());
        }
    }
}
