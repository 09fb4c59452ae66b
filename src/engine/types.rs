use crate::cards::Card;
use serde::{Deserialize, Serialize};

pub type PlayerIndex = usize;

pub const HAND_TARGET_SIZE: usize = 3;
pub const TOP_CARD_COUNT: usize = 3;
pub const BOTTOM_CARD_COUNT: usize = 3;
pub const INITIAL_HAND_SIZE: usize = 6;

/// Lifecycle phase of a session. Zones are only mutable through engine
/// operations valid for the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    TopSelection,
    AwaitingConfirmation,
    InPlay,
    GameOver { winner: PlayerIndex },
}

/// One participant's three card zones. Zones empty in strict order
/// hand -> top cards -> face-down cards; the only backward transition is
/// picking up the pile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub hand: Vec<Card>,
    pub top_cards: Vec<Card>,
    pub bottom_cards: Vec<Card>,
    pub confirmed: bool,
}

impl PlayerState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Vec::new(),
            top_cards: Vec::new(),
            bottom_cards: Vec::new(),
            confirmed: false,
        }
    }

    /// Pop a hand card for the pile. A played card is always face-up and
    /// never carries the bottom flag.
    pub fn play_from_hand(&mut self, index: usize) -> Card {
        let mut card = self.hand.remove(index);
        card.face_up = true;
        card.bottom = false;
        card
    }

    /// Remove one face-down card, revealing it. The caller decides whether it
    /// lands on the pile or (on an illegal flip) in the hand.
    pub fn take_bottom_card(&mut self, index: usize) -> Card {
        let mut card = self.bottom_cards.remove(index);
        card.face_up = true;
        card.bottom = false;
        card
    }

    /// Drain the entire pile into the hand. Picked-up cards become ordinary
    /// hand cards again.
    pub fn pick_up_pile(&mut self, pile: &mut Vec<Card>) {
        for mut card in pile.drain(..) {
            card.face_up = false;
            card.bottom = false;
            self.hand.push(card);
        }
    }

    pub fn add_to_hand(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.hand.extend(cards);
    }

    pub fn has_emptied_all_zones(&self) -> bool {
        self.hand.is_empty() && self.top_cards.is_empty() && self.bottom_cards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Rank, Suit};
    use crate::test_utils::serde::assert_round_trip_eq;

    #[test]
    fn played_hand_card_is_face_up_on_the_pile() {
        let mut player = PlayerState::new("p");
        player.hand.push(Card::new(Rank::Five, Suit::Clubs));
        let card = player.play_from_hand(0);
        assert!(card.face_up);
        assert!(!card.bottom);
        assert!(player.hand.is_empty());
    }

    #[test]
    fn picked_up_cards_lose_their_pile_flags() {
        let mut player = PlayerState::new("p");
        let mut pile = vec![
            {
                let mut c = Card::new(Rank::Nine, Suit::Hearts);
                c.face_up = true;
                c
            },
            {
                let mut c = Card::new(Rank::King, Suit::Spades);
                c.face_up = true;
                c
            },
        ];
        player.pick_up_pile(&mut pile);
        assert!(pile.is_empty());
        assert_eq!(player.hand.len(), 2);
        assert!(player.hand.iter().all(|c| !c.face_up && !c.bottom));
    }

    #[test]
    fn player_state_round_trips_with_serde() {
        let mut player = PlayerState::new("alice");
        player.hand.push(Card::new(Rank::Two, Suit::Clubs));
        player.top_cards.push(Card::new(Rank::Ace, Suit::Spades));
        assert_round_trip_eq(&player);
        assert_round_trip_eq(&Phase::GameOver { winner: 1 });
    }
}
