//! Damage resolution.
//!
//! A knockout restores the defeated player in place and costs them a fixed share
//! of their score. When someone caused the knockout that share goes to them;
//! environmental damage simply destroys it.

use crate::game::{GameState, PlayerId};
use crate::BoardResult;
use serde::{Deserialize, Serialize};

/// Result of a single `apply_damage` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub target: PlayerId,
    pub source: Option<PlayerId>,
    pub amount: i32,
    /// Health the hit brought the target down to, before any knockout reset
    pub health_after_hit: i32,
    pub knocked_out: bool,
    /// Score removed from the target
    pub plunder: i64,
}

/// Share of `score` lost on a knockout, rounded down.
///
/// # Examples
///
/// ```
/// use boardwalk::plunder_amount;
///
/// assert_eq!(plunder_amount(105, 60), 63);
/// assert_eq!(plunder_amount(0, 60), 0);
/// ```
pub fn plunder_amount(score: i64, percent: i64) -> i64 {
    (score.max(0) * percent).div_euclid(100)
}

/// Applies `amount` damage to `target`, optionally credited to `source`.
///
/// Used for combat and for environmental sources alike. On a knockout the target
/// is reset to full health, stunned for one turn, and loses `plunder_percent` of
/// their score to `source` (or to nobody).
pub fn apply_damage(
    state: &mut GameState,
    target: PlayerId,
    amount: i32,
    source: Option<PlayerId>,
    plunder_percent: i64,
) -> BoardResult<DamageOutcome> {
    // Resolve the source first so an unknown id fails before anything changes
    if let Some(source) = source {
        state.player(source)?;
    }

    let defeated = state.player_mut(target)?;
    let score_before = defeated.score;
    let health_after_hit = defeated.health - amount;
    let knocked_out = defeated.take_damage(amount);

    let plunder = if knocked_out {
        let plunder = plunder_amount(score_before, plunder_percent);
        defeated.score -= plunder;
        plunder
    } else {
        0
    };

    if let Some(source) = source.filter(|_| plunder > 0) {
        state.player_mut(source)?.score += plunder;
    }

    Ok(DamageOutcome {
        target,
        source,
        amount,
        health_after_hit,
        knocked_out,
        plunder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PLAYER_HEALTH;
    use crate::game::{Direction, Player, Position, RulesConfig};
    use crate::BoardError;

    fn state() -> GameState {
        let mut state = GameState::new(&RulesConfig::for_testing(1));
        state
            .add_player(Player::new(1, "A", Position::new(0, 0), Direction::East, 200))
            .unwrap();
        state
            .add_player(Player::new(2, "B", Position::new(1, 0), Direction::West, 105))
            .unwrap();
        state
    }

    #[test]
    fn test_knockout_with_attacker_transfers_plunder() {
        let mut state = state();
        state.player_mut(2).unwrap().health = 1;

        let outcome = apply_damage(&mut state, 2, 3, Some(1), 60).unwrap();
        assert!(outcome.knocked_out);
        assert_eq!(outcome.health_after_hit, -2);
        assert_eq!(outcome.plunder, 63);

        let defeated = state.player(2).unwrap();
        assert_eq!(defeated.health, DEFAULT_PLAYER_HEALTH);
        assert_eq!(defeated.dizziness, 1);
        assert_eq!(defeated.score, 42);
        assert_eq!(state.player(1).unwrap().score, 263);
    }

    #[test]
    fn test_environmental_knockout_destroys_plunder() {
        let mut state = state();
        state.player_mut(2).unwrap().health = 2;

        let outcome = apply_damage(&mut state, 2, 5, None, 60).unwrap();
        assert!(outcome.knocked_out);
        assert_eq!(state.player(2).unwrap().score, 42);
        assert_eq!(state.player(1).unwrap().score, 200);
    }

    #[test]
    fn test_survivable_hit_changes_only_health() {
        let mut state = state();
        let outcome = apply_damage(&mut state, 2, 2, Some(1), 60).unwrap();
        assert!(!outcome.knocked_out);
        assert_eq!(outcome.plunder, 0);
        assert_eq!(state.player(2).unwrap().health, DEFAULT_PLAYER_HEALTH - 2);
        assert_eq!(state.player(2).unwrap().score, 105);
        assert_eq!(state.player(2).unwrap().dizziness, 0);
    }

    #[test]
    fn test_unknown_source_changes_nothing() {
        let mut state = state();
        let before = state.clone();
        let result = apply_damage(&mut state, 2, 10, Some(7), 60);
        assert!(matches!(result, Err(BoardError::UnknownPlayer(7))));
        assert_eq!(state, before);
    }
}
