//! # Built-in Table Content
//!
//! The party game's stock tasks, opportunities, destinies and punishments.

use crate::events::{Effect, EventEntry, TableContent, TrapEffect};

fn task(title: &str, challenge: &str, success: i64, failure: i64) -> EventEntry {
    EventEntry::new(
        title,
        format!(
            "{}\n\nSuccess +{} points\nFailure {} points",
            challenge, success, failure
        ),
        Effect::Score { success, failure },
    )
}

/// Content used when no table file is supplied.
pub fn standard_content() -> TableContent {
    TableContent {
        task: vec![
            task("Eat Up", "Everyone in the group fills half a bowl and finishes it within 1 minute.", 80, -20),
            task("Drink Up", "Everyone in the group fills two cups and drains them within 30 seconds.", 50, -20),
            task("Name Game", "Remember and say the names of at least three people on your team.", 80, -20),
            task("Lyric Recall", "Listen to a song clip, then sing that part of the lyrics back.", 100, -20),
            task("Freeze Frame", "Perform the group pose the host calls out within 1 minute.", 50, -20),
            task("Glad You're Here", "Take a photo with someone from another team (no repeats) within 1 minute.", 60, -50),
            task("Holiday Trivia", "Answer a holiday trivia question from the host.", 50, -20),
            task("Face Gymnastics", "Stick a note on a teammate's face; they remove it using only facial muscles within 1 minute.", 80, -40),
            task("Supply Run", "Fetch the items the host asks for and return to your seat within 1 minute.", 60, -20),
            task("Charades", "One player faces away while the others act out the word; guess it within 3 minutes.", 80, -40),
            task("Nimble Feet", "Pass a cup of beans along the team using only feet; keep a quarter of the beans.", 80, -20),
            task("Tongue Twister", "Every teammate recites a tongue twister to a simple beat within 1 minute.", 60, -20),
            task("Freestyle", "Dance without music for a full minute.", 60, -20),
            task("Karaoke Lane", "Sing any song for a full minute.", 50, -20),
            task("Sketch Relay", "Teammates take turns drawing; the guesser gets two answers right within 2 minutes.", 50, -20),
            task("Butt Writer", "Spell out a phrase with your hips until the others guess it.", 60, -20),
            task("Pass It On", "Pass an object down the line using only heads or faces, no drops, within 2 minutes.", 80, -20),
            task("Staff Selfie", "Take a photo with a staff member (no repeats) within 1 minute.", 60, -40),
        ],
        opportunity: vec![
            EventEntry::new("Lucky Coin", "You find a coin on the path. +100 points.", Effect::AddScore(100)),
            EventEntry::new("Second Wind", "Your next roll uses two dice.", Effect::DoubleDice),
            EventEntry::new("Sharpened Blade", "Your next attack deals double damage.", Effect::DoubleDamage),
            EventEntry::new("Guardian Angel", "Attacks against you are voided for two turns.", Effect::Immunity(2)),
            EventEntry::new("Overachiever", "Your next successful task pays double.", Effect::DoubleTaskScore),
            EventEntry::new("Ambush", "Leave a snare on this tile. Whoever steps on it takes 2 damage.", Effect::PlaceTrap(TrapEffect::Damage(2))),
            EventEntry::new("First Aid", "Patch yourself up to full health.", Effect::Heal),
        ],
        destiny: vec![
            EventEntry::new("Windfall", "Fate smiles on you. +100 points.", Effect::AddScore(100)),
            EventEntry::new("Portal Storm", "You are swept away to another teleport.", Effect::Teleport),
            EventEntry::new("Duel", "Challenge any player to a fight.", Effect::ForcedAttack),
            EventEntry::new("Pickpocket", "Take up to 50 points from a player of your choice.", Effect::StealScore { amount: 50 }),
            EventEntry::new("Banana Peel", "Drop a peel here. Whoever steps on it loses a turn.", Effect::PlaceTrap(TrapEffect::Stun(1))),
        ],
        punishment: vec![
            EventEntry::new("Fine", "You pay a fine. -100 points.", Effect::AddScore(-100)),
            EventEntry::new("Last Supper", "Something you ate disagrees with you. Take 3 damage.", Effect::Damage(3)),
            EventEntry::new("Dizzy Spell", "You sit out your next turn.", Effect::Stun(1)),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_are_failable_scores() {
        let content = standard_content();
        for entry in &content.task {
            match entry.effect {
                Effect::Score { success, failure } => {
                    assert!(success > 0);
                    assert!(failure < 0);
                }
                ref other => panic!("task '{}' has effect {:?}", entry.title, other),
            }
        }
    }

    #[test]
    fn test_content_round_trips_through_json() {
        let content = standard_content();
        let json = serde_json::to_string(&content).unwrap();
        let parsed: TableContent = serde_json::from_str(&json).unwrap();
        assert_eq!(content, parsed);
    }
}
