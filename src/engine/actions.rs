use serde::{Deserialize, Serialize};

/// A move submitted by the UI, a bot, or a test. Hand plays address cards by
/// index; a face-down flip is blind, so it only carries an index too.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMove {
    /// Play one or more same-ranked hand cards, in the given hand order.
    PlayHand { indices: Vec<usize> },
    /// Flip one face-down card; the engine plays it if legal, otherwise the
    /// flip becomes a forced pickup.
    FlipBottomCard { index: usize },
    /// Take the whole pile into hand. No-op when the pile is empty.
    PickUpPile,
}
