use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::actions::PlayerMove;
use super::errors::{PlayError, StateError};
use super::events::GameEvent;
use super::rules::{pile_effect, PileEffect};
use super::state::GameState;
use super::types::{
    Phase, PlayerIndex, BOTTOM_CARD_COUNT, HAND_TARGET_SIZE, INITIAL_HAND_SIZE, TOP_CARD_COUNT,
};
use crate::cards::{compare_for_play, Card};

const LOG_TARGET: &str = "engine";

/// The Palace state machine. All zone mutation flows through these
/// operations; rejected moves leave the state untouched.
pub trait PalaceRules {
    /// Setup -> TopSelection: shuffle `deck` and deal each player 3 face-down
    /// cards plus a 6-card hand off the front.
    fn deal<R: Rng>(state: &mut GameState, deck: Vec<Card>, rng: &mut R)
        -> Result<(), StateError>;

    /// Move exactly 3 chosen hand cards into a player's face-up row. When the
    /// last player finishes, TopSelection -> AwaitingConfirmation.
    fn select_top_cards(
        state: &mut GameState,
        player: PlayerIndex,
        picks: &[Card],
    ) -> Result<(), PlayError>;

    /// Record a player's ready signal; once everyone has confirmed,
    /// AwaitingConfirmation -> InPlay. Returns whether all have confirmed.
    /// Safe to re-check on every relevant message.
    fn confirm_ready(state: &mut GameState, player: PlayerIndex) -> Result<bool, PlayError>;

    /// Resolve one move for the acting player.
    fn apply_move(
        state: &mut GameState,
        player: PlayerIndex,
        mv: &PlayerMove,
    ) -> Result<Vec<GameEvent>, PlayError>;
}

pub struct PalaceEngine;

impl PalaceRules for PalaceEngine {
    fn deal<R: Rng>(
        state: &mut GameState,
        mut deck: Vec<Card>,
        rng: &mut R,
    ) -> Result<(), StateError> {
        if state.phase != Phase::Setup {
            return Err(StateError::InvalidTransition);
        }
        deck.shuffle(rng);
        state.deck = deck.into_iter().collect();
        for player in &mut state.players {
            for _ in 0..BOTTOM_CARD_COUNT {
                let mut card = state
                    .deck
                    .pop_front()
                    .ok_or(StateError::InvariantViolation("deck too small to deal"))?;
                card.bottom = true;
                player.bottom_cards.push(card);
            }
            for _ in 0..INITIAL_HAND_SIZE {
                let card = state
                    .deck
                    .pop_front()
                    .ok_or(StateError::InvariantViolation("deck too small to deal"))?;
                player.hand.push(card);
            }
        }
        state.phase = Phase::TopSelection;
        debug!(
            target = LOG_TARGET,
            players = state.players.len(),
            deck_remaining = state.deck.len(),
            "dealt initial zones"
        );
        Ok(())
    }

    fn select_top_cards(
        state: &mut GameState,
        player: PlayerIndex,
        picks: &[Card],
    ) -> Result<(), PlayError> {
        if state.phase != Phase::TopSelection {
            return Err(PlayError::WrongPhase);
        }
        if picks.len() != TOP_CARD_COUNT {
            return Err(PlayError::BadTopCardCount {
                expected: TOP_CARD_COUNT,
                actual: picks.len(),
            });
        }
        let target = &state.players[player];
        if !target.top_cards.is_empty() {
            return Err(PlayError::WrongPhase);
        }
        // Resolve all picks against the hand before moving anything.
        let mut taken: Vec<usize> = Vec::with_capacity(TOP_CARD_COUNT);
        for pick in picks {
            let found = target
                .hand
                .iter()
                .enumerate()
                .find(|(i, c)| c.same_card(pick) && !taken.contains(i))
                .map(|(i, _)| i)
                .ok_or(PlayError::CardNotInZone)?;
            taken.push(found);
        }
        taken.sort_unstable();
        let target = &mut state.players[player];
        for &index in taken.iter().rev() {
            let mut card = target.hand.remove(index);
            card.face_up = true;
            target.top_cards.push(card);
        }
        if state
            .players
            .iter()
            .all(|p| p.top_cards.len() == TOP_CARD_COUNT)
        {
            state.phase = Phase::AwaitingConfirmation;
        }
        Ok(())
    }

    fn confirm_ready(state: &mut GameState, player: PlayerIndex) -> Result<bool, PlayError> {
        match state.phase {
            Phase::TopSelection | Phase::AwaitingConfirmation => {}
            _ => return Err(PlayError::WrongPhase),
        }
        state.players[player].confirmed = true;
        let all_confirmed = state.phase == Phase::AwaitingConfirmation
            && state.players.iter().all(|p| p.confirmed);
        if all_confirmed {
            state.phase = Phase::InPlay;
            state.current_player_index = 0;
            debug!(target = LOG_TARGET, "all players confirmed, entering play");
        }
        Ok(all_confirmed)
    }

    fn apply_move(
        state: &mut GameState,
        player: PlayerIndex,
        mv: &PlayerMove,
    ) -> Result<Vec<GameEvent>, PlayError> {
        if state.phase != Phase::InPlay {
            return Err(PlayError::WrongPhase);
        }
        if player != state.current_player_index {
            return Err(PlayError::NotPlayersTurn);
        }
        match mv {
            PlayerMove::PickUpPile => pick_up_pile(state, player),
            PlayerMove::PlayHand { indices } => play_hand(state, player, indices),
            PlayerMove::FlipBottomCard { index } => flip_bottom_card(state, player, *index),
        }
    }
}

/// Explicit pickup when no legal play exists. A no-op on an empty pile: no
/// state change, no turn advance.
fn pick_up_pile(state: &mut GameState, player: PlayerIndex) -> Result<Vec<GameEvent>, PlayError> {
    if state.pile.is_empty() {
        return Ok(Vec::new());
    }
    let count = state.pile.len();
    let mut pile = std::mem::take(&mut state.pile);
    state.players[player].pick_up_pile(&mut pile);
    state.pile = pile;
    state.seven_switch = false;
    state.advance_turn();
    state.seq += 1;
    debug!(
        target = LOG_TARGET,
        player,
        cards = count,
        "pile picked up"
    );
    Ok(vec![GameEvent::PilePickedUp {
        player,
        cards: count,
    }])
}

fn play_hand(
    state: &mut GameState,
    player: PlayerIndex,
    indices: &[usize],
) -> Result<Vec<GameEvent>, PlayError> {
    if indices.is_empty() {
        return Err(PlayError::EmptyPlay);
    }
    let hand = &state.players[player].hand;
    let mut ordered: Vec<usize> = indices.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    if ordered.len() != indices.len() {
        return Err(PlayError::CardNotInZone);
    }
    if ordered.iter().any(|&i| i >= hand.len()) {
        return Err(PlayError::CardNotInZone);
    }
    let rank = hand[ordered[0]].rank;
    if ordered.iter().any(|&i| hand[i].rank != rank) {
        return Err(PlayError::MixedRanks);
    }
    if !compare_for_play(&hand[ordered[0]], state.pile_top(), state.seven_switch) {
        return Err(PlayError::IllegalCard);
    }

    // Pop from the back so earlier indices stay valid, then restore hand order
    // on the pile.
    let mut played = Vec::with_capacity(ordered.len());
    for &index in ordered.iter().rev() {
        played.push(state.players[player].play_from_hand(index));
    }
    played.reverse();
    let mut events = vec![GameEvent::CardsPlayed {
        player,
        cards: played.clone(),
    }];
    state.pile.extend(played);

    // Refill from the deck front only for hand plays.
    let mut drawn = 0;
    while state.players[player].hand.len() < HAND_TARGET_SIZE {
        match state.deck.pop_front() {
            Some(card) => {
                state.players[player].hand.push(card);
                drawn += 1;
            }
            None => break,
        }
    }
    if drawn > 0 {
        events.push(GameEvent::HandRefilled { player, drawn });
    }

    finish_play(state, player, rank, events)
}

/// Blind flip: the revealed card is played if legal, otherwise it joins the
/// pile in the player's hand as a forced pickup.
fn flip_bottom_card(
    state: &mut GameState,
    player: PlayerIndex,
    index: usize,
) -> Result<Vec<GameEvent>, PlayError> {
    {
        let p = &state.players[player];
        if !p.hand.is_empty() || !p.top_cards.is_empty() {
            return Err(PlayError::ZoneNotReachable);
        }
        if index >= p.bottom_cards.len() {
            return Err(PlayError::CardNotInZone);
        }
    }
    let card = state.players[player].take_bottom_card(index);
    let legal = compare_for_play(&card, state.pile_top(), state.seven_switch);
    let mut events = vec![GameEvent::BottomCardRevealed {
        player,
        card,
        legal,
    }];
    if legal {
        events.push(GameEvent::CardsPlayed {
            player,
            cards: vec![card],
        });
        state.pile.push(card);
        return finish_play(state, player, card.rank, events);
    }

    // Forced pickup: revealed card plus the whole pile into the hand.
    let mut picked = card;
    picked.face_up = false;
    state.players[player].hand.push(picked);
    let count = state.pile.len();
    let mut pile = std::mem::take(&mut state.pile);
    state.players[player].pick_up_pile(&mut pile);
    state.pile = pile;
    state.seven_switch = false;
    state.advance_turn();
    state.seq += 1;
    debug!(
        target = LOG_TARGET,
        player,
        card = %card,
        "illegal blind flip, forced pickup"
    );
    events.push(GameEvent::PilePickedUp {
        player,
        cards: count,
    });
    Ok(events)
}

/// Common tail of every resolved play: pile effects, zone promotion, the
/// terminal check, and the turn pointer.
fn finish_play(
    state: &mut GameState,
    player: PlayerIndex,
    played_rank: crate::cards::Rank,
    mut events: Vec<GameEvent>,
) -> Result<Vec<GameEvent>, PlayError> {
    let effect = pile_effect(played_rank, &state.pile);
    match effect {
        PileEffect::Bomb => {
            // Bombed cards leave the game for good; they never rejoin the deck.
            state.pile.clear();
            state.seven_switch = false;
            events.push(GameEvent::PileBombed);
        }
        PileEffect::Reset => {
            state.seven_switch = false;
            events.push(GameEvent::PileReset);
        }
        PileEffect::SevenNext => {
            state.seven_switch = true;
            events.push(GameEvent::SevenActivated);
        }
        PileEffect::None => {
            state.seven_switch = false;
        }
    }

    // Hand refill from the deck takes priority; only once hand and deck are
    // both empty does the face-up row become the new hand. The face-down row
    // never promotes in bulk.
    let promote = {
        let p = &state.players[player];
        p.hand.is_empty() && state.deck.is_empty() && !p.top_cards.is_empty()
    };
    if promote {
        let p = &mut state.players[player];
        p.hand = std::mem::take(&mut p.top_cards);
        events.push(GameEvent::TopCardsPromoted { player });
    }

    if state.players[player].has_emptied_all_zones() {
        state.phase = Phase::GameOver { winner: player };
        state.seq += 1;
        events.push(GameEvent::GameEnded { winner: player });
        debug!(target = LOG_TARGET, winner = player, "game over");
        return Ok(events);
    }

    if effect.turn_advances() {
        state.advance_turn();
    }
    state.seq += 1;
    Ok(events)
}
