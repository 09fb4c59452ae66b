use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::hooks::{SessionConfig, StateObserver};
use crate::cards::{short_deck, standard_deck, Card};
use crate::engine::{
    GameEvent, GameState, PalaceEngine, PalaceRules, Phase, PlayError, PlayerIndex, PlayerMove,
    StateError, TOP_CARD_COUNT,
};
use crate::net::{GameSnapshot, Message, NetError, PeerConnection};

const LOG_TARGET: &str = "session";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("peer connection lost")]
    ConnectionLost,

    #[error("input is locked while it is not the local player's turn")]
    NotYourTurn,

    #[error("session has no peer connection")]
    NotNetworked,

    #[error("remote seats are driven by snapshots, not local selection")]
    RemoteSeat,

    #[error(transparent)]
    Play(#[from] PlayError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Net(#[from] NetError),
}

/// Drives one game session: the setup handshake, turn-by-turn snapshot sync,
/// end-of-game detection, and the rematch vote. Owns the engine state; the
/// network reader task only hands messages in, it never mutates state itself.
pub struct SessionController<O: StateObserver> {
    state: GameState,
    conn: Option<PeerConnection>,
    is_host: bool,
    local_seat: PlayerIndex,
    observer: O,
    config: SessionConfig,
    local_rematch_vote: bool,
    remote_rematch_vote: bool,
    rng: StdRng,
}

impl<O: StateObserver> SessionController<O> {
    /// Two-party network session. The host owns seat 0 and the deal.
    pub fn network(
        conn: PeerConnection,
        is_host: bool,
        names: [&str; 2],
        observer: O,
        config: SessionConfig,
        seed: Option<u64>,
    ) -> Self {
        Self {
            state: GameState::new(names),
            conn: Some(conn),
            is_host,
            local_seat: if is_host { 0 } else { 1 },
            observer,
            config,
            local_rematch_vote: false,
            remote_rematch_vote: false,
            rng: seeded(seed),
        }
    }

    /// Hot-seat or bot game in a single process; every seat is local.
    pub fn local(
        names: impl IntoIterator<Item = impl Into<String>>,
        observer: O,
        config: SessionConfig,
        seed: Option<u64>,
    ) -> Self {
        Self {
            state: GameState::new(names),
            conn: None,
            is_host: true,
            local_seat: 0,
            observer,
            config,
            local_rematch_vote: false,
            remote_rematch_vote: false,
            rng: seeded(seed),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn local_seat(&self) -> PlayerIndex {
        self.local_seat
    }

    /// Is the local side allowed to submit a move right now? The networked
    /// variant locks input while waiting for the opponent's snapshot.
    pub fn is_session_player(&self) -> bool {
        if self.state.phase != Phase::InPlay {
            return false;
        }
        self.conn.is_none() || self.state.current_player_index == self.local_seat
    }

    /// Deal and, when hosting, ship the joiner its zones. The joiner instead
    /// waits for `deckSync` via [`Self::pump`].
    pub async fn start(&mut self) -> Result<(), SessionError> {
        if self.conn.is_some() && !self.is_host {
            return Ok(());
        }
        let deck = if self.state.players.len() == 2 {
            short_deck()
        } else {
            standard_deck()
        };
        PalaceEngine::deal(&mut self.state, deck, &mut self.rng)?;
        self.send_deck_sync().await?;
        self.notify_state();
        Ok(())
    }

    /// Choose the local player's face-up row and signal readiness.
    pub async fn select_top_cards(&mut self, picks: &[Card]) -> Result<(), SessionError> {
        let seat = self.local_seat;
        PalaceEngine::select_top_cards(&mut self.state, seat, picks)?;
        let all_confirmed = PalaceEngine::confirm_ready(&mut self.state, seat)?;
        let player = &self.state.players[seat];
        let message = Message::ConfirmTopCards {
            player_index: seat,
            top_cards: player.top_cards.clone(),
            bottom_cards: player.bottom_cards.clone(),
            hand: player.hand.clone(),
        };
        self.send(message).await?;
        if all_confirmed {
            self.announce_start().await?;
        }
        Ok(())
    }

    /// In a local game the controller selects for every seat.
    pub fn select_top_cards_for(
        &mut self,
        seat: PlayerIndex,
        picks: &[Card],
    ) -> Result<(), SessionError> {
        if self.conn.is_some() {
            return Err(SessionError::RemoteSeat);
        }
        PalaceEngine::select_top_cards(&mut self.state, seat, picks)?;
        PalaceEngine::confirm_ready(&mut self.state, seat)?;
        if self.state.phase == Phase::InPlay {
            self.notify_state();
        }
        Ok(())
    }

    /// Submit a move for the acting seat, resolve it, and broadcast the
    /// resulting snapshot (or the game-over notice) to the peer.
    pub async fn submit_move(&mut self, mv: PlayerMove) -> Result<Vec<GameEvent>, SessionError> {
        let seat = if self.conn.is_some() {
            if !self.is_session_player() {
                return Err(SessionError::NotYourTurn);
            }
            self.local_seat
        } else {
            self.state.current_player_index
        };
        let events = PalaceEngine::apply_move(&mut self.state, seat, &mv)?;
        // Let an observer register a failed blind flip before the pile moves.
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::BottomCardRevealed { legal: false, .. }))
        {
            self.pace().await;
        }
        self.notify_state();
        self.broadcast_after_move().await?;
        Ok(events)
    }

    pub async fn submit_pickup(&mut self) -> Result<Vec<GameEvent>, SessionError> {
        self.submit_move(PlayerMove::PickUpPile).await
    }

    /// Vote for a rematch; the game resets once both sides have voted (in a
    /// local game the single local vote suffices).
    pub async fn request_play_again(&mut self) -> Result<(), SessionError> {
        if !self.local_rematch_vote {
            self.local_rematch_vote = true;
            self.send(Message::PlayAgainRequest).await?;
        }
        self.maybe_restart().await
    }

    /// Receive and handle the next peer message. `ConnectionLost` is terminal
    /// for the session; nothing is retried.
    pub async fn pump(&mut self) -> Result<Message, SessionError> {
        let message = match self.conn.as_mut() {
            Some(conn) => conn.recv().await.ok_or(SessionError::ConnectionLost)?,
            None => return Err(SessionError::NotNetworked),
        };
        self.handle_message(message.clone()).await?;
        Ok(message)
    }

    pub async fn handle_message(&mut self, message: Message) -> Result<(), SessionError> {
        match message {
            Message::DeckSync {
                deck,
                player2bot,
                player2top,
                player2hand,
            } => self.apply_deck_sync(deck, player2bot, player2top, player2hand),
            Message::ConfirmTopCards {
                player_index,
                top_cards,
                bottom_cards,
                hand,
            } => {
                self.handle_remote_confirm(player_index, top_cards, bottom_cards, hand)
                    .await?
            }
            Message::StartGame => self.handle_start_game(),
            Message::PlayCard(snapshot) => self.apply_snapshot(snapshot),
            Message::GameOver { winner } => self.handle_remote_game_over(&winner),
            Message::PlayAgainRequest => {
                self.remote_rematch_vote = true;
                self.maybe_restart().await?;
            }
        }
        Ok(())
    }

    fn apply_deck_sync(
        &mut self,
        deck: VecDeque<Card>,
        bottom: Vec<Card>,
        top: Vec<Card>,
        hand: Vec<Card>,
    ) {
        if self.is_host {
            warn!(target = LOG_TARGET, "host received deckSync, ignoring");
            return;
        }
        if self.state.phase != Phase::Setup {
            // rematch re-deal arriving after a finished game
            self.state.reset_for_rematch();
            self.local_rematch_vote = false;
            self.remote_rematch_vote = false;
        }
        self.state.deck = deck;
        let me = &mut self.state.players[self.local_seat];
        me.bottom_cards = bottom;
        me.top_cards = top;
        me.hand = hand;
        self.state.phase = Phase::TopSelection;
        info!(
            target = LOG_TARGET,
            deck_remaining = self.state.deck.len(),
            "received deal from host"
        );
    }

    async fn handle_remote_confirm(
        &mut self,
        player_index: PlayerIndex,
        top_cards: Vec<Card>,
        bottom_cards: Vec<Card>,
        hand: Vec<Card>,
    ) -> Result<(), SessionError> {
        if player_index >= self.state.players.len() || player_index == self.local_seat {
            warn!(
                target = LOG_TARGET,
                player_index, "confirmTopCards for an unexpected seat, dropped"
            );
            return Ok(());
        }
        // The peer's zones are authoritative for its own selection; our copy
        // of its hand may be empty (the joiner never sees the host's deal).
        let remote = &mut self.state.players[player_index];
        remote.hand = hand;
        remote.top_cards = top_cards;
        remote.bottom_cards = bottom_cards;
        if self.state.phase == Phase::TopSelection
            && self
                .state
                .players
                .iter()
                .all(|p| p.top_cards.len() == TOP_CARD_COUNT)
        {
            self.state.phase = Phase::AwaitingConfirmation;
        }
        let all_confirmed = PalaceEngine::confirm_ready(&mut self.state, player_index)?;
        if all_confirmed {
            self.announce_start().await?;
        }
        Ok(())
    }

    /// Harmless to hear twice: both sides may detect both-confirmed at the
    /// same moment and each send `startGame`.
    fn handle_start_game(&mut self) {
        match self.state.phase {
            Phase::InPlay => {}
            Phase::AwaitingConfirmation | Phase::TopSelection => {
                for player in &mut self.state.players {
                    player.confirmed = true;
                }
                self.state.phase = Phase::InPlay;
                self.state.current_player_index = 0;
                info!(target = LOG_TARGET, "peer started the game");
                self.notify_state();
            }
            _ => warn!(target = LOG_TARGET, "startGame in an unexpected phase"),
        }
    }

    fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        // Snapshots are only meaningful mid-game. After a rematch reset the
        // local counter restarts, so a late snapshot from the finished game
        // would pass the staleness check; anything outside play is a
        // protocol violation and is dropped.
        if self.state.phase != Phase::InPlay {
            warn!(
                target = LOG_TARGET,
                snapshot_seq = snapshot.seq,
                phase = ?self.state.phase,
                "snapshot outside play, dropped"
            );
            return;
        }
        if snapshot.is_stale(&self.state) {
            warn!(
                target = LOG_TARGET,
                snapshot_seq = snapshot.seq,
                local_seq = self.state.seq,
                "stale snapshot rejected"
            );
            return;
        }
        snapshot.apply_to(&mut self.state);
        debug!(
            target = LOG_TARGET,
            seq = self.state.seq,
            current = self.state.current_player_index,
            "applied snapshot"
        );
        self.notify_state();
        for index in 0..self.state.players.len() {
            if index != self.local_seat {
                self.observer
                    .on_opponent_zones_updated(index, &self.state.players[index]);
            }
        }
    }

    fn handle_remote_game_over(&mut self, winner: &str) {
        let index = self
            .state
            .players
            .iter()
            .position(|p| p.name == winner)
            .unwrap_or(self.state.current_player_index);
        self.state.phase = Phase::GameOver { winner: index };
        info!(target = LOG_TARGET, winner, "peer reported game over");
        self.observer.on_game_over(winner);
    }

    async fn maybe_restart(&mut self) -> Result<(), SessionError> {
        let votes = usize::from(self.local_rematch_vote) + usize::from(self.remote_rematch_vote);
        let needed = if self.conn.is_some() { 2 } else { 1 };
        if votes < needed {
            return Ok(());
        }
        info!(target = LOG_TARGET, "rematch agreed, dealing again");
        self.local_rematch_vote = false;
        self.remote_rematch_vote = false;
        self.state.reset_for_rematch();
        // The joiner waits for the host's fresh deckSync.
        if self.conn.is_none() || self.is_host {
            let deck = if self.state.players.len() == 2 {
                short_deck()
            } else {
                standard_deck()
            };
            PalaceEngine::deal(&mut self.state, deck, &mut self.rng)?;
            self.send_deck_sync().await?;
            self.notify_state();
        }
        Ok(())
    }

    async fn announce_start(&mut self) -> Result<(), SessionError> {
        self.pace().await;
        self.send(Message::StartGame).await?;
        info!(target = LOG_TARGET, "both players confirmed, game on");
        self.notify_state();
        Ok(())
    }

    async fn broadcast_after_move(&mut self) -> Result<(), SessionError> {
        if self.conn.is_none() {
            if let Phase::GameOver { winner } = self.state.phase {
                let name = self.state.players[winner].name.clone();
                self.observer.on_game_over(&name);
            }
            return Ok(());
        }
        if let Phase::GameOver { winner } = self.state.phase {
            let name = self.state.players[winner].name.clone();
            self.send(Message::GameOver {
                winner: name.clone(),
            })
            .await?;
            self.observer.on_game_over(&name);
        } else {
            let snapshot = GameSnapshot::capture(&self.state);
            self.send(Message::PlayCard(snapshot)).await?;
        }
        Ok(())
    }

    async fn send_deck_sync(&mut self) -> Result<(), SessionError> {
        if self.conn.is_none() {
            return Ok(());
        }
        let joiner = &self.state.players[1];
        let message = Message::DeckSync {
            deck: self.state.deck.clone(),
            player2bot: joiner.bottom_cards.clone(),
            player2top: joiner.top_cards.clone(),
            player2hand: joiner.hand.clone(),
        };
        self.send(message).await
    }

    async fn send(&mut self, message: Message) -> Result<(), SessionError> {
        if let Some(conn) = self.conn.as_mut() {
            conn.send(&message).await?;
        }
        Ok(())
    }

    fn notify_state(&mut self) {
        let current = &self.state.players[self.state.current_player_index];
        self.observer
            .on_state_changed(current, self.state.deck.len(), &self.state.pile);
    }

    /// Flush and close the peer socket. A no-op for a local session.
    pub async fn shutdown(&mut self) {
        if let Some(conn) = self.conn.as_mut() {
            conn.shutdown().await;
        }
    }

    async fn pace(&self) {
        if !self.config.pacing.is_zero() {
            tokio::time::sleep(self.config.pacing).await;
        }
    }
}

fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
