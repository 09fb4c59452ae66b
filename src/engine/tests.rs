#![cfg(test)]

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;
use crate::cards::{short_deck, Card, Rank, Suit};

fn card(rank: Rank) -> Card {
    Card::new(rank, Suit::Clubs)
}

fn pile_card(rank: Rank) -> Card {
    let mut c = Card::new(rank, Suit::Hearts);
    c.face_up = true;
    c
}

fn bottom_card(rank: Rank) -> Card {
    let mut c = Card::new(rank, Suit::Spades);
    c.bottom = true;
    c
}

/// Two-player state already in play, with the given hands and pile.
fn in_play(hand0: Vec<Card>, hand1: Vec<Card>, pile: Vec<Card>) -> GameState {
    let mut state = GameState::new(["host", "joiner"]);
    state.players[0].hand = hand0;
    state.players[1].hand = hand1;
    state.pile = pile;
    state.phase = Phase::InPlay;
    state
}

#[test]
fn seeded_deal_is_deterministic_and_counts_out() {
    let mut state_a = GameState::new(["host", "joiner"]);
    let mut state_b = GameState::new(["host", "joiner"]);
    PalaceEngine::deal(&mut state_a, short_deck(), &mut StdRng::seed_from_u64(7)).unwrap();
    PalaceEngine::deal(&mut state_b, short_deck(), &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(state_a, state_b);

    assert_eq!(state_a.phase, Phase::TopSelection);
    // 26 cards, 9 per player dealt
    assert_eq!(state_a.deck.len(), 26 - 18);
    for player in &state_a.players {
        assert_eq!(player.hand.len(), INITIAL_HAND_SIZE);
        assert_eq!(player.bottom_cards.len(), BOTTOM_CARD_COUNT);
        assert!(player.bottom_cards.iter().all(|c| c.bottom));
        assert!(player.top_cards.is_empty());
    }
    state_a.validate_invariants().unwrap();
}

#[test]
fn top_selection_and_confirmation_reach_in_play() {
    let mut state = GameState::new(["host", "joiner"]);
    PalaceEngine::deal(&mut state, short_deck(), &mut StdRng::seed_from_u64(1)).unwrap();

    let picks0: Vec<Card> = state.players[0].hand[..3].to_vec();
    PalaceEngine::select_top_cards(&mut state, 0, &picks0).unwrap();
    assert_eq!(state.players[0].hand.len(), 3);
    assert_eq!(state.players[0].top_cards.len(), 3);
    assert!(state.players[0].top_cards.iter().all(|c| c.face_up));
    assert_eq!(state.phase, Phase::TopSelection);

    let picks1: Vec<Card> = state.players[1].hand[..3].to_vec();
    PalaceEngine::select_top_cards(&mut state, 1, &picks1).unwrap();
    assert_eq!(state.phase, Phase::AwaitingConfirmation);

    assert!(!PalaceEngine::confirm_ready(&mut state, 0).unwrap());
    assert!(PalaceEngine::confirm_ready(&mut state, 1).unwrap());
    assert_eq!(state.phase, Phase::InPlay);
    assert_eq!(state.current_player_index, 0);
    state.validate_invariants().unwrap();
}

#[test]
fn selecting_a_card_not_in_hand_is_rejected() {
    let mut state = GameState::new(["host", "joiner"]);
    PalaceEngine::deal(&mut state, short_deck(), &mut StdRng::seed_from_u64(1)).unwrap();
    let mut picks: Vec<Card> = state.players[0].hand[..3].to_vec();
    picks[2].suit = Suit::Diamonds; // not in the two-suit deck at all
    let err = PalaceEngine::select_top_cards(&mut state, 0, &picks).unwrap_err();
    assert_eq!(err, PlayError::CardNotInZone);
    assert!(state.players[0].top_cards.is_empty());
}

#[test]
fn playing_a_seven_restricts_exactly_one_following_play() {
    let mut state = in_play(
        vec![card(Rank::Seven), card(Rank::King)],
        vec![card(Rank::Five), card(Rank::Nine)],
        vec![],
    );
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] })
            .unwrap();
    assert!(events.contains(&GameEvent::SevenActivated));
    assert!(state.seven_switch);
    assert_eq!(state.current_player_index, 1);
    assert_eq!(state.pile_top().unwrap().rank, Rank::Seven);

    // Nine is above seven: rejected while the switch is live.
    let err = PalaceEngine::apply_move(&mut state, 1, &PlayerMove::PlayHand { indices: vec![1] })
        .unwrap_err();
    assert_eq!(err, PlayError::IllegalCard);

    // Five is fine, and the switch dies with that play.
    PalaceEngine::apply_move(&mut state, 1, &PlayerMove::PlayHand { indices: vec![0] }).unwrap();
    assert!(!state.seven_switch);

    // Back to player 0: unrestricted again, King on a Five is legal.
    PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] }).unwrap();
    assert_eq!(state.pile_top().unwrap().rank, Rank::King);
}

#[test]
fn four_of_a_kind_bombs_and_grants_another_turn() {
    let mut state = in_play(
        vec![card(Rank::Five), card(Rank::Jack)],
        vec![card(Rank::Nine)],
        vec![
            pile_card(Rank::Five),
            pile_card(Rank::Five),
            pile_card(Rank::Five),
        ],
    );
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] })
            .unwrap();
    assert!(events.contains(&GameEvent::PileBombed));
    assert!(state.pile.is_empty());
    assert!(!state.seven_switch);
    assert_eq!(state.current_player_index, 0, "bomber goes again");
}

#[test]
fn four_twos_bomb_instead_of_resetting() {
    let mut state = in_play(
        vec![card(Rank::Two), card(Rank::Six)],
        vec![card(Rank::Nine)],
        vec![
            pile_card(Rank::Two),
            pile_card(Rank::Two),
            pile_card(Rank::Two),
        ],
    );
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] })
            .unwrap();
    assert!(events.contains(&GameEvent::PileBombed));
    assert!(!events.contains(&GameEvent::PileReset));
    assert!(state.pile.is_empty());
    assert_eq!(state.current_player_index, 0);
}

#[test]
fn a_two_resets_without_clearing_and_the_player_goes_again() {
    let mut state = in_play(
        vec![card(Rank::Two), card(Rank::Six)],
        vec![card(Rank::Nine)],
        vec![pile_card(Rank::King)],
    );
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] })
            .unwrap();
    assert!(events.contains(&GameEvent::PileReset));
    assert_eq!(state.pile.len(), 2);
    assert_eq!(state.pile_top().unwrap().rank, Rank::Two);
    assert!(!state.seven_switch);
    assert_eq!(state.current_player_index, 0, "reset keeps the turn");

    // The 2 on top counts as lowest: the Six is now legal.
    PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] }).unwrap();
    assert_eq!(state.pile_top().unwrap().rank, Rank::Six);
    assert_eq!(state.current_player_index, 1);
}

#[test]
fn a_ten_bombs_and_the_player_goes_again() {
    let mut state = in_play(
        vec![card(Rank::Ten), card(Rank::Six)],
        vec![card(Rank::Nine)],
        vec![pile_card(Rank::Ace), pile_card(Rank::King)],
    );
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] })
            .unwrap();
    assert!(events.contains(&GameEvent::PileBombed));
    assert!(state.pile.is_empty());
    assert_eq!(state.current_player_index, 0);
}

#[test]
fn multi_card_play_must_share_one_rank() {
    let mut state = in_play(
        vec![card(Rank::Eight), card(Rank::Eight), card(Rank::Nine)],
        vec![card(Rank::Nine)],
        vec![],
    );
    let err =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0, 2] })
            .unwrap_err();
    assert_eq!(err, PlayError::MixedRanks);
    assert_eq!(state.players[0].hand.len(), 3, "rejection mutates nothing");

    PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0, 1] })
        .unwrap();
    assert_eq!(state.pile.len(), 2);
}

#[test]
fn rejected_moves_leave_the_state_untouched() {
    let state = in_play(
        vec![card(Rank::Four)],
        vec![card(Rank::Nine)],
        vec![pile_card(Rank::King)],
    );
    let mut probe = state.clone();
    let err = PalaceEngine::apply_move(&mut probe, 0, &PlayerMove::PlayHand { indices: vec![0] })
        .unwrap_err();
    assert_eq!(err, PlayError::IllegalCard);
    assert_eq!(probe, state);

    let err =
        PalaceEngine::apply_move(&mut probe, 1, &PlayerMove::PlayHand { indices: vec![0] })
            .unwrap_err();
    assert_eq!(err, PlayError::NotPlayersTurn);
    assert_eq!(probe, state);
}

#[test]
fn pickup_moves_the_whole_pile_and_advances_the_turn() {
    let pile: Vec<Card> = [Rank::Nine, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace]
        .iter()
        .map(|&r| pile_card(r))
        .collect();
    let mut state = in_play(
        vec![card(Rank::Three), card(Rank::Six)],
        vec![card(Rank::Nine)],
        pile,
    );
    state.seven_switch = true;
    let events = PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PickUpPile).unwrap();
    assert_eq!(
        events,
        vec![GameEvent::PilePickedUp { player: 0, cards: 5 }]
    );
    assert!(state.pile.is_empty());
    assert_eq!(state.players[0].hand.len(), 7);
    assert!(!state.seven_switch);
    assert_eq!(state.current_player_index, 1);
}

#[test]
fn pickup_on_an_empty_pile_is_a_no_op() {
    let state = in_play(vec![card(Rank::Three)], vec![card(Rank::Nine)], vec![]);
    let mut probe = state.clone();
    let events = PalaceEngine::apply_move(&mut probe, 0, &PlayerMove::PickUpPile).unwrap();
    assert!(events.is_empty());
    assert_eq!(probe, state, "no state change, no turn advance");
}

#[test]
fn hand_refills_to_three_from_the_deck_front() {
    let mut state = in_play(
        vec![card(Rank::Nine)],
        vec![card(Rank::Five)],
        vec![],
    );
    state.deck = vec![card(Rank::Three), card(Rank::Four), card(Rank::Jack)]
        .into_iter()
        .collect();
    state.players[0].top_cards = vec![pile_card(Rank::Ace)];
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] })
            .unwrap();
    assert!(events.contains(&GameEvent::HandRefilled { player: 0, drawn: 3 }));
    assert_eq!(
        state.players[0]
            .hand
            .iter()
            .map(|c| c.rank)
            .collect::<Vec<_>>(),
        vec![Rank::Three, Rank::Four, Rank::Jack],
        "drawn in shuffle order"
    );
    assert!(state.deck.is_empty());
    // Deck refill took priority: the face-up row stays where it is.
    assert_eq!(state.players[0].top_cards.len(), 1);
}

#[test]
fn top_cards_promote_only_once_hand_and_deck_are_both_empty() {
    let mut state = in_play(vec![card(Rank::Nine)], vec![card(Rank::Five)], vec![]);
    state.players[0].top_cards = vec![pile_card(Rank::Ace), pile_card(Rank::Four)];
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] })
            .unwrap();
    assert!(events.contains(&GameEvent::TopCardsPromoted { player: 0 }));
    assert_eq!(state.players[0].hand.len(), 2);
    assert!(state.players[0].top_cards.is_empty());
    assert_eq!(state.current_player_index, 1);
}

#[test]
fn legal_blind_flip_plays_the_revealed_card() {
    let mut state = in_play(vec![], vec![card(Rank::Five)], vec![pile_card(Rank::Four)]);
    state.players[0].bottom_cards = vec![bottom_card(Rank::Nine), bottom_card(Rank::Three)];
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::FlipBottomCard { index: 0 })
            .unwrap();
    assert!(matches!(
        events[0],
        GameEvent::BottomCardRevealed { legal: true, .. }
    ));
    assert_eq!(state.pile_top().unwrap().rank, Rank::Nine);
    assert!(state.pile_top().unwrap().face_up);
    assert_eq!(state.players[0].bottom_cards.len(), 1);
    assert_eq!(state.current_player_index, 1);
}

#[test]
fn illegal_blind_flip_becomes_a_forced_pickup() {
    let mut state = in_play(vec![], vec![card(Rank::Five)], vec![pile_card(Rank::King)]);
    state.players[0].bottom_cards = vec![bottom_card(Rank::Three)];
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::FlipBottomCard { index: 0 })
            .unwrap();
    assert!(matches!(
        events[0],
        GameEvent::BottomCardRevealed { legal: false, .. }
    ));
    assert!(state.pile.is_empty());
    // Revealed card plus the one pile card.
    assert_eq!(state.players[0].hand.len(), 2);
    assert!(state.players[0].bottom_cards.is_empty());
    assert!(state.players[0].hand.iter().all(|c| !c.bottom));
    assert_eq!(state.current_player_index, 1);
}

#[test]
fn blind_flip_requires_hand_and_top_row_to_be_empty() {
    let mut state = in_play(vec![card(Rank::Five)], vec![card(Rank::Nine)], vec![]);
    state.players[0].bottom_cards = vec![bottom_card(Rank::Three)];
    let err = PalaceEngine::apply_move(&mut state, 0, &PlayerMove::FlipBottomCard { index: 0 })
        .unwrap_err();
    assert_eq!(err, PlayError::ZoneNotReachable);
}

#[test]
fn playing_the_last_bottom_card_ends_the_game() {
    let mut state = in_play(vec![], vec![card(Rank::Five)], vec![pile_card(Rank::Four)]);
    state.players[0].bottom_cards = vec![bottom_card(Rank::Nine)];
    let events =
        PalaceEngine::apply_move(&mut state, 0, &PlayerMove::FlipBottomCard { index: 0 })
            .unwrap();
    assert!(events.contains(&GameEvent::GameEnded { winner: 0 }));
    assert_eq!(state.phase, Phase::GameOver { winner: 0 });
}

#[test]
fn end_to_end_seeded_short_deck_seven_play() {
    let mut state = GameState::new(["host", "joiner"]);
    PalaceEngine::deal(&mut state, short_deck(), &mut StdRng::seed_from_u64(42)).unwrap();

    for player in 0..2 {
        let picks: Vec<Card> = state.players[player].hand[..3].to_vec();
        PalaceEngine::select_top_cards(&mut state, player, &picks).unwrap();
    }
    PalaceEngine::confirm_ready(&mut state, 0).unwrap();
    PalaceEngine::confirm_ready(&mut state, 1).unwrap();
    assert_eq!(state.phase, Phase::InPlay);

    // Hand the host a 7 so the scripted opening play is deterministic.
    state.players[0].hand[0] = card(Rank::Seven);
    PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] }).unwrap();
    assert!(state.seven_switch, "joiner's next play is restricted");
    assert_eq!(state.pile_top().unwrap().rank, Rank::Seven);
    assert_eq!(state.current_player_index, 1);
    assert_eq!(state.players[0].hand.len(), 3, "refilled from the deck");
    state.validate_invariants().unwrap();
}

#[test]
fn three_and_four_player_games_rotate_the_turn_pointer() {
    let mut state = GameState::new(["a", "b", "c", "d"]);
    state.players.iter_mut().for_each(|p| {
        p.hand = vec![card(Rank::Nine), card(Rank::Jack)];
    });
    state.phase = Phase::InPlay;
    for expected_next in [1usize, 2, 3, 0] {
        let acting = state.current_player_index;
        PalaceEngine::apply_move(
            &mut state,
            acting,
            &PlayerMove::PlayHand { indices: vec![1] },
        )
        .unwrap();
        assert_eq!(state.current_player_index, expected_next);
        // Keep the pile climbing legal for the next seat.
        state.pile.clear();
    }
}

#[test]
fn seq_advances_once_per_resolved_move() {
    let mut state = in_play(
        vec![card(Rank::Nine), card(Rank::Jack)],
        vec![card(Rank::Five)],
        vec![],
    );
    assert_eq!(state.seq, 0);
    PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PlayHand { indices: vec![0] }).unwrap();
    assert_eq!(state.seq, 1);
    let err = PalaceEngine::apply_move(&mut state, 0, &PlayerMove::PickUpPile).unwrap_err();
    assert_eq!(err, PlayError::NotPlayersTurn);
    assert_eq!(state.seq, 1);
    PalaceEngine::apply_move(&mut state, 1, &PlayerMove::PickUpPile).unwrap();
    assert_eq!(state.seq, 2);
}
