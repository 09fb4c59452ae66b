pub mod cards;
pub mod engine;
pub mod net;
pub mod session;

#[cfg(test)]
pub mod test_utils;

pub use cards::{compare_for_play, Card, Rank, Suit};
pub use engine::{GameState, PalaceEngine, PalaceRules};
