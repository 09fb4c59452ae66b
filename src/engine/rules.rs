use crate::cards::{Card, Rank};

/// What a resolved play does to the pile and the turn pointer. Effects are
/// mutually exclusive per play; precedence is the match order in
/// [`pile_effect`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PileEffect {
    /// Pile cleared, cards permanently out of the game, same player again.
    Bomb,
    /// Pile kept but comparisons reset, same player again.
    Reset,
    /// Seven-switch armed for the next play, turn advances.
    SevenNext,
    /// Turn advances normally.
    None,
}

impl PileEffect {
    pub fn turn_advances(self) -> bool {
        matches!(self, PileEffect::SevenNext | PileEffect::None)
    }
}

/// Do the top four pile cards share a rank? Counts cards across turns, so a
/// fourth matching card completes the bomb regardless of who played the
/// first three.
pub fn is_four_of_a_kind(pile: &[Card]) -> bool {
    if pile.len() < 4 {
        return false;
    }
    let top = pile[pile.len() - 1].rank;
    pile[pile.len() - 4..].iter().all(|c| c.rank == top)
}

/// Effect precedence for a play of `played_rank` with the cards already on
/// the pile: four-of-a-kind > 2 > 10 > 7 > nothing.
pub fn pile_effect(played_rank: Rank, pile: &[Card]) -> PileEffect {
    if is_four_of_a_kind(pile) {
        return PileEffect::Bomb;
    }
    match played_rank {
        Rank::Two => PileEffect::Reset,
        Rank::Ten => PileEffect::Bomb,
        Rank::Seven => PileEffect::SevenNext,
        _ => PileEffect::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Suit};

    fn pile_of(ranks: &[Rank]) -> Vec<Card> {
        ranks
            .iter()
            .map(|&r| {
                let mut c = Card::new(r, Suit::Clubs);
                c.face_up = true;
                c
            })
            .collect()
    }

    #[test]
    fn four_of_a_kind_needs_four_matching_top_cards() {
        assert!(!is_four_of_a_kind(&pile_of(&[
            Rank::Five,
            Rank::Five,
            Rank::Five
        ])));
        assert!(is_four_of_a_kind(&pile_of(&[
            Rank::Nine,
            Rank::Five,
            Rank::Five,
            Rank::Five,
            Rank::Five
        ])));
        assert!(!is_four_of_a_kind(&pile_of(&[
            Rank::Five,
            Rank::Five,
            Rank::Six,
            Rank::Five
        ])));
    }

    #[test]
    fn four_of_a_kind_beats_the_special_rank_effects() {
        let twos = pile_of(&[Rank::Two, Rank::Two, Rank::Two, Rank::Two]);
        assert_eq!(pile_effect(Rank::Two, &twos), PileEffect::Bomb);
        let tens = pile_of(&[Rank::Ten, Rank::Ten, Rank::Ten, Rank::Ten]);
        assert_eq!(pile_effect(Rank::Ten, &tens), PileEffect::Bomb);
    }

    #[test]
    fn special_ranks_map_to_their_effects() {
        let pile = pile_of(&[Rank::Four]);
        assert_eq!(pile_effect(Rank::Two, &pile), PileEffect::Reset);
        assert_eq!(pile_effect(Rank::Ten, &pile), PileEffect::Bomb);
        assert_eq!(pile_effect(Rank::Seven, &pile), PileEffect::SevenNext);
        assert_eq!(pile_effect(Rank::Jack, &pile), PileEffect::None);
    }
}
