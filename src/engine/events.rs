use super::types::PlayerIndex;
use crate::cards::Card;

/// What happened while resolving a move. Returned to the caller so the
/// session layer can notify observers and pace reveals; never sent on the
/// wire (the protocol ships full snapshots instead).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    CardsPlayed {
        player: PlayerIndex,
        cards: Vec<Card>,
    },
    HandRefilled {
        player: PlayerIndex,
        drawn: usize,
    },
    /// Pile cleared by a 10 or four-of-a-kind; its cards leave the game.
    PileBombed,
    /// A 2 reset the ordering without clearing the pile.
    PileReset,
    SevenActivated,
    PilePickedUp {
        player: PlayerIndex,
        cards: usize,
    },
    /// Hand and deck were empty, so the face-up row became the new hand.
    TopCardsPromoted {
        player: PlayerIndex,
    },
    BottomCardRevealed {
        player: PlayerIndex,
        card: Card,
        legal: bool,
    },
    GameEnded {
        winner: PlayerIndex,
    },
}
