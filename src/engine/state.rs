use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::errors::StateError;
use super::types::{Phase, PlayerIndex, PlayerState, BOTTOM_CARD_COUNT, TOP_CARD_COUNT};
use crate::cards::Card;

/// The full shared game state. Exclusively owned by the engine; the network
/// layer replaces it wholesale from snapshots, the UI only reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<PlayerState>,
    /// Shared draw pile, consumed from the front in shuffle order.
    pub deck: VecDeque<Card>,
    /// Discard pile; last element is the top card.
    pub pile: Vec<Card>,
    pub current_player_index: PlayerIndex,
    /// True for exactly the next play after a 7 was played.
    pub seven_switch: bool,
    pub phase: Phase,
    /// Monotonic snapshot sequence number, bumped once per resolved move.
    pub seq: u64,
}

impl GameState {
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let players: Vec<PlayerState> = names.into_iter().map(PlayerState::new).collect();
        debug_assert!((2..=4).contains(&players.len()));
        Self {
            players,
            deck: VecDeque::new(),
            pile: Vec::new(),
            current_player_index: 0,
            seven_switch: false,
            phase: Phase::Setup,
            seq: 0,
        }
    }

    pub fn pile_top(&self) -> Option<&Card> {
        self.pile.last()
    }

    pub fn current_player(&self) -> &PlayerState {
        &self.players[self.current_player_index]
    }

    pub fn current_player_mut(&mut self) -> &mut PlayerState {
        &mut self.players[self.current_player_index]
    }

    pub fn advance_turn(&mut self) {
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
    }

    /// Reset everything except the player roster, ready for a rematch deal.
    pub fn reset_for_rematch(&mut self) {
        for player in &mut self.players {
            player.hand.clear();
            player.top_cards.clear();
            player.bottom_cards.clear();
            player.confirmed = false;
        }
        self.deck.clear();
        self.pile.clear();
        self.current_player_index = 0;
        self.seven_switch = false;
        self.phase = Phase::Setup;
        self.seq = 0;
    }
}

pub trait InvariantCheck {
    fn validate_invariants(&self) -> Result<(), StateError>;
}

impl InvariantCheck for GameState {
    fn validate_invariants(&self) -> Result<(), StateError> {
        if !(2..=4).contains(&self.players.len()) {
            return Err(StateError::InvariantViolation("player count out of range"));
        }
        if self.current_player_index >= self.players.len() {
            return Err(StateError::InvariantViolation("turn pointer out of range"));
        }
        for player in &self.players {
            if player.top_cards.len() > TOP_CARD_COUNT {
                return Err(StateError::InvariantViolation("too many top cards"));
            }
            if player.bottom_cards.len() > BOTTOM_CARD_COUNT {
                return Err(StateError::InvariantViolation("too many face-down cards"));
            }
            if player.hand.iter().any(|c| c.bottom) {
                return Err(StateError::InvariantViolation("bottom flag on a hand card"));
            }
            if player.bottom_cards.iter().any(|c| !c.bottom) {
                return Err(StateError::InvariantViolation(
                    "face-down card missing bottom flag",
                ));
            }
        }
        if self.pile.iter().any(|c| !c.face_up || c.bottom) {
            return Err(StateError::InvariantViolation("pile card with zone flags"));
        }
        Ok(())
    }
}
