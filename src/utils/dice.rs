//! # Dice
//!
//! Seeded six-sided dice with an optional queue of scripted faces.

use crate::config::DIE_FACES;
use crate::{BoardError, BoardResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The faces of one roll and their sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub faces: Vec<u32>,
    pub total: u32,
}

/// Dice used for movement and attack rolls.
///
/// Faces queued with [`Dice::push_fixed`] are consumed in order before any fresh
/// random face is drawn, which makes rolls scriptable.
#[derive(Debug, Clone)]
pub struct Dice {
    rng: StdRng,
    fixed: VecDeque<u32>,
}

impl Dice {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            fixed: VecDeque::new(),
        }
    }

    /// Queues predetermined faces.
    ///
    /// Every face must lie in `1..=DIE_FACES`. If any does not, nothing is queued
    /// and an `InvalidConfig` error is returned.
    pub fn push_fixed(&mut self, faces: impl IntoIterator<Item = u32>) -> BoardResult<()> {
        let faces: Vec<u32> = faces.into_iter().collect();
        if let Some(face) = faces.iter().find(|face| !(1..=DIE_FACES).contains(*face)) {
            return Err(BoardError::InvalidConfig(format!(
                "die face {} is outside 1..={}",
                face, DIE_FACES
            )));
        }
        self.fixed.extend(faces);
        Ok(())
    }

    /// Scripted faces not yet consumed.
    pub fn fixed_remaining(&self) -> usize {
        self.fixed.len()
    }

    /// Rolls a single die.
    pub fn roll_die(&mut self) -> u32 {
        match self.fixed.pop_front() {
            Some(face) => face,
            None => self.rng.gen_range(1..=DIE_FACES),
        }
    }

    /// Rolls one die, or two when `doubles` is set, and sums them.
    ///
    /// # Examples
    ///
    /// ```
    /// use boardwalk::Dice;
    ///
    /// let mut dice = Dice::new(7);
    /// dice.push_fixed([6]).unwrap();
    /// let roll = dice.roll(true);
    /// assert_eq!(roll.faces.len(), 2);
    /// assert_eq!(roll.faces[0], 6);
    /// ```
    pub fn roll(&mut self, doubles: bool) -> DiceRoll {
        let count = if doubles { 2 } else { 1 };
        let faces: Vec<u32> = (0..count).map(|_| self.roll_die()).collect();
        let total = faces.iter().sum();
        DiceRoll { faces, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_in_range() {
        let mut dice = Dice::new(99);
        for _ in 0..500 {
            let face = dice.roll_die();
            assert!((1..=DIE_FACES).contains(&face));
        }
    }

    #[test]
    fn test_fixed_sequence_consumed_in_order() {
        let mut dice = Dice::new(1);
        dice.push_fixed([3, 5]).unwrap();
        assert_eq!(dice.roll(false).total, 3);
        assert_eq!(dice.fixed_remaining(), 1);
        assert_eq!(dice.roll(false).faces, vec![5]);
        assert_eq!(dice.fixed_remaining(), 0);
    }

    #[test]
    fn test_doubles_draw_two_dice() {
        let mut dice = Dice::new(1);
        dice.push_fixed([6]).unwrap();
        let roll = dice.roll(true);
        assert_eq!(roll.faces.len(), 2);
        assert_eq!(roll.faces[0], 6);
        assert_eq!(roll.total, roll.faces.iter().sum::<u32>());
    }

    #[test]
    fn test_out_of_range_faces_rejected() {
        let mut dice = Dice::new(1);
        assert!(matches!(
            dice.push_fixed([0]),
            Err(BoardError::InvalidConfig(_))
        ));
        assert!(matches!(
            dice.push_fixed([2, DIE_FACES + 3]),
            Err(BoardError::InvalidConfig(_))
        ));
        // A rejected batch queues nothing
        assert_eq!(dice.fixed_remaining(), 0);

        dice.push_fixed([1, DIE_FACES]).unwrap();
        assert_eq!(dice.fixed_remaining(), 2);
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = Dice::new(5);
        let mut b = Dice::new(5);
        for _ in 0..20 {
            assert_eq!(a.roll(false), b.roll(false));
        }
    }
}
