//! # Rendering Module
//!
//! The presentation collaborator. The engine tells it what happened and never waits
//! on it; drawing, animation and sound live outside this crate.

use crate::game::{PlayerId, Position};
use serde::{Deserialize, Serialize};

/// Transient visual effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fx {
    Damage { target: PlayerId, amount: i32 },
    Knockout { target: PlayerId },
    Teleport { player: PlayerId, from: Position, to: Position },
    Victory { player: PlayerId },
}

/// Receives fire-and-forget notifications from the turn engine.
pub trait Presenter {
    /// The active player moved; point the camera at them.
    fn focus(&mut self, _player: PlayerId, _position: Position) {}

    /// Highlight the player whose turn it is, or nobody.
    fn highlight(&mut self, _player: Option<PlayerId>) {}

    /// Play a transient effect.
    fn effect(&mut self, _fx: Fx) {}
}

/// Presenter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

/// Presenter that writes notifications to the debug log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn focus(&mut self, player: PlayerId, position: Position) {
        log::debug!("Camera on player {} at {}", player, position);
    }

    fn highlight(&mut self, player: Option<PlayerId>) {
        match player {
            Some(player) => log::debug!("Highlighting player {}", player),
            None => log::debug!("Clearing highlight"),
        }
    }

    fn effect(&mut self, fx: Fx) {
        log::debug!("Effect: {:?}", fx);
    }
}
