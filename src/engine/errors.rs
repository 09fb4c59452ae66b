use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlayError {
    #[error("not this player's turn")]
    NotPlayersTurn,

    #[error("operation not valid in the current phase")]
    WrongPhase,

    #[error("a play must contain at least one card")]
    EmptyPlay,

    #[error("all cards in a single play must share one rank")]
    MixedRanks,

    #[error("card not present in the source zone")]
    CardNotInZone,

    #[error("card is not legal on the current pile")]
    IllegalCard,

    #[error("source zone not reachable while earlier zones hold cards")]
    ZoneNotReachable,

    #[error("top card selection requires exactly {expected} cards, got {actual}")]
    BadTopCardCount { expected: usize, actual: usize },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StateError {
    #[error("invalid phase transition")]
    InvalidTransition,

    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}
