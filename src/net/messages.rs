//! Wire vocabulary. Variant and field names are the literal wire strings, so
//! payloads stay readable in a packet capture.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::engine::{GameState, Phase};

/// One peer-to-peer message, discriminated by the `action` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Message {
    /// Host -> joiner, once, right after the setup deal: the remaining deck
    /// and the joiner's dealt zones.
    #[serde(rename = "deckSync")]
    DeckSync {
        deck: VecDeque<Card>,
        player2bot: Vec<Card>,
        player2top: Vec<Card>,
        player2hand: Vec<Card>,
    },

    /// A player finished choosing their face-up row; doubles as the ready
    /// signal for the confirmation handshake.
    #[serde(rename = "confirmTopCards")]
    ConfirmTopCards {
        #[serde(rename = "playerIndex")]
        player_index: usize,
        #[serde(rename = "topCards")]
        top_cards: Vec<Card>,
        #[serde(rename = "bottomCards")]
        bottom_cards: Vec<Card>,
        hand: Vec<Card>,
    },

    /// Sent by whichever side detects both-confirmed first.
    #[serde(rename = "startGame")]
    StartGame,

    /// Full-state snapshot after every resolved turn; the receiver replaces
    /// its local state wholesale.
    #[serde(rename = "playCard")]
    PlayCard(GameSnapshot),

    #[serde(rename = "gameOver")]
    GameOver { winner: String },

    /// Rematch vote; the game resets once both sides have voted.
    #[serde(rename = "playAgainRequest")]
    PlayAgainRequest,
}

/// One player's three zones as they travel inside a snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerZones {
    pub hand: Vec<Card>,
    #[serde(rename = "topCards")]
    pub top_cards: Vec<Card>,
    #[serde(rename = "bottomCards")]
    pub bottom_cards: Vec<Card>,
}

/// The immutable state-transfer object behind `playCard`. `seq` is the
/// monotonic snapshot counter used to reject stale arrivals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub players: Vec<PlayerZones>,
    pub deck: VecDeque<Card>,
    pub pile: Vec<Card>,
    pub seven: bool,
    #[serde(rename = "currentPlayerIndex")]
    pub current_player_index: usize,
    pub seq: u64,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            players: state
                .players
                .iter()
                .map(|p| PlayerZones {
                    hand: p.hand.clone(),
                    top_cards: p.top_cards.clone(),
                    bottom_cards: p.bottom_cards.clone(),
                })
                .collect(),
            deck: state.deck.clone(),
            pile: state.pile.clone(),
            seven: state.seven_switch,
            current_player_index: state.current_player_index,
            seq: state.seq,
        }
    }

    /// Snapshots only travel mid-game; anything at or behind the local
    /// counter is a duplicate or a lost race.
    pub fn is_stale(&self, state: &GameState) -> bool {
        self.seq <= state.seq
    }

    /// Overwrite the local state wholesale. No diffing, no merging; names
    /// stay local since the wire never carries them.
    pub fn apply_to(&self, state: &mut GameState) {
        for (player, zones) in state.players.iter_mut().zip(&self.players) {
            player.hand = zones.hand.clone();
            player.top_cards = zones.top_cards.clone();
            player.bottom_cards = zones.bottom_cards.clone();
        }
        state.deck = self.deck.clone();
        state.pile = self.pile.clone();
        state.seven_switch = self.seven;
        state.current_player_index = self.current_player_index;
        state.seq = self.seq;
        state.phase = Phase::InPlay;
    }
}
