//! Collaborator interfaces implemented outside the core: the render hook a
//! GUI attaches to, and the move-source contract a bot strategy fulfills.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::engine::{GameState, PlayerIndex, PlayerMove, PlayerState};

/// Render hook, called synchronously after each mutation. All methods have
/// no-op defaults so a headless session can run without a UI.
pub trait StateObserver {
    fn on_state_changed(&mut self, _current_player: &PlayerState, _deck_size: usize, _pile: &[Card]) {
    }

    fn on_opponent_zones_updated(&mut self, _player: PlayerIndex, _zones: &PlayerState) {}

    fn on_game_over(&mut self, _winner: &str) {}
}

/// Headless sessions and tests.
pub struct NoopObserver;

impl StateObserver for NoopObserver {}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A pluggable move source for a computer opponent. The heuristic is not the
/// core's business; the contract is. `choose_move` must return a play drawn
/// from `legal` (or a blind flip when the hand is empty), and `PickUpPile`
/// otherwise.
pub trait MoveStrategy {
    fn difficulty(&self) -> Difficulty;

    /// Pick exactly 3 hand cards for the face-up row during setup.
    fn choose_top_cards(&mut self, hand: &[Card]) -> Vec<Card>;

    fn choose_move(
        &mut self,
        legal: &[Card],
        player: &PlayerState,
        state: &GameState,
    ) -> PlayerMove;
}

/// Knobs for the lifecycle controller. `pacing` inserts a deliberate pause
/// so an observer can register a reveal before the state moves on; it is
/// presentation only and zero is always safe.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub pacing: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_secs(1),
        }
    }
}

impl SessionConfig {
    /// No pacing; what automated tests want.
    pub fn immediate() -> Self {
        Self {
            pacing: Duration::ZERO,
        }
    }
}
