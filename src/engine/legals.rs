//! Legality oracle: pure queries the UI uses to enable affordances and a bot
//! strategy uses to pick from, with no side effects on the state.

use super::state::GameState;
use super::types::PlayerState;
use crate::cards::{compare_for_play, Card};

/// Is this single card legal on the current pile?
pub fn is_card_playable(card: &Card, pile: &[Card], seven_switch: bool) -> bool {
    compare_for_play(card, pile.last(), seven_switch)
}

/// The hand cards a player could legally play right now. Face-down cards are
/// never listed; they are flipped blind.
pub fn playable_cards(player: &PlayerState, pile: &[Card], seven_switch: bool) -> Vec<Card> {
    player
        .hand
        .iter()
        .filter(|c| is_card_playable(c, pile, seven_switch))
        .copied()
        .collect()
}

/// Whether pickup is forced: a player with no legal hand play must take the
/// pile (unless the hand is empty, in which case a blind flip is next).
pub fn has_any_legal_play(player: &PlayerState, pile: &[Card], seven_switch: bool) -> bool {
    player
        .hand
        .iter()
        .any(|c| is_card_playable(c, pile, seven_switch))
}

impl GameState {
    /// Oracle view for the acting player.
    pub fn playable_cards_for_current(&self) -> Vec<Card> {
        playable_cards(self.current_player(), &self.pile, self.seven_switch)
    }

    pub fn current_player_has_legal_play(&self) -> bool {
        has_any_legal_play(self.current_player(), &self.pile, self.seven_switch)
    }
}
