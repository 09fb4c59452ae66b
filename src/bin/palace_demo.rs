use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use palace_core::cards::Card;
use palace_core::engine::{GameState, Phase, PlayerIndex, PlayerMove, PlayerState, TOP_CARD_COUNT};
use palace_core::net::PeerConnection;
use palace_core::session::{
    Difficulty, MoveStrategy, SessionConfig, SessionController, StateObserver,
};

const LOG_TARGET: &str = "bin::palace_demo";
const PLAYER_NAMES: [&str; 2] = ["player1", "player2"];

#[derive(Debug, Parser)]
#[command(name = "palace_demo")]
#[command(about = "Headless Palace session: host, join, or play a local bot game", long_about = None)]
struct Args {
    /// Host a game: bind this address and wait for the joiner
    #[arg(long, env = "PALACE_HOST", value_name = "ADDR", conflicts_with = "join")]
    host: Option<SocketAddr>,

    /// Join a hosted game at this address
    #[arg(long, env = "PALACE_JOIN", value_name = "ADDR")]
    join: Option<SocketAddr>,

    /// Optional RNG seed for a reproducible deal (only the host deals)
    #[arg(long, env = "PALACE_SEED")]
    seed: Option<u64>,

    /// Skip the presentation pauses between reveals
    #[arg(long, default_value_t = false)]
    fast: bool,

    /// Toggle structured (JSON) logs
    #[arg(long, env = "PALACE_LOG_JSON", default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.json);

    let config = if args.fast {
        SessionConfig::immediate()
    } else {
        SessionConfig::default()
    };
    let mut strategy = FirstLegal;

    match (args.host, args.join) {
        (Some(addr), None) => {
            let conn = PeerConnection::host(addr)
                .await
                .with_context(|| format!("failed to host on {addr}"))?;
            let session = SessionController::network(
                conn,
                true,
                PLAYER_NAMES,
                LogObserver,
                config,
                args.seed,
            );
            run_networked(session, &mut strategy).await
        }
        (None, Some(addr)) => {
            let conn = PeerConnection::join(addr)
                .await
                .with_context(|| format!("failed to join {addr}"))?;
            let session = SessionController::network(
                conn,
                false,
                PLAYER_NAMES,
                LogObserver,
                config,
                args.seed,
            );
            run_networked(session, &mut strategy).await
        }
        _ => {
            let session =
                SessionController::local(PLAYER_NAMES, LogObserver, config, args.seed);
            run_local(session, &mut strategy).await
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::fmt().with_env_filter(filter).with_target(false);
    if json {
        builder.json().flatten_event(true).init();
    } else {
        builder.compact().init();
    }
}

/// Plays both local seats against each other until someone wins.
async fn run_local(
    mut session: SessionController<LogObserver>,
    strategy: &mut FirstLegal,
) -> Result<()> {
    session.start().await?;
    for seat in 0..session.state().players.len() {
        let picks = strategy.choose_top_cards(&session.state().players[seat].hand);
        session.select_top_cards_for(seat, &picks)?;
    }
    loop {
        if let Phase::GameOver { winner } = session.state().phase {
            info!(
                target = LOG_TARGET,
                winner = %session.state().players[winner].name,
                "game over"
            );
            return Ok(());
        }
        let mv = pick_move(strategy, session.state());
        session.submit_move(mv).await?;
    }
}

/// Drives the local seat and pumps peer messages for the remote one.
async fn run_networked(
    mut session: SessionController<LogObserver>,
    strategy: &mut FirstLegal,
) -> Result<()> {
    session.start().await?;
    // The joiner's deal arrives over the wire.
    while session.state().phase == Phase::Setup {
        session.pump().await?;
    }

    let seat = session.local_seat();
    let picks = strategy.choose_top_cards(&session.state().players[seat].hand);
    session.select_top_cards(&picks).await?;
    while session.state().phase != Phase::InPlay {
        session.pump().await?;
    }
    info!(target = LOG_TARGET, seat, "setup complete, playing");

    loop {
        if let Phase::GameOver { winner } = session.state().phase {
            info!(
                target = LOG_TARGET,
                winner = %session.state().players[winner].name,
                "game over"
            );
            session.shutdown().await;
            return Ok(());
        }
        if session.is_session_player() {
            let mv = pick_move(strategy, session.state());
            session.submit_move(mv).await?;
        } else {
            session.pump().await?;
        }
    }
}

fn pick_move(strategy: &mut FirstLegal, state: &GameState) -> PlayerMove {
    let seat = state.current_player_index;
    let legal = state.playable_cards_for_current();
    strategy.choose_move(&legal, &state.players[seat], state)
}

/// Lowest-effort opponent: keeps its three lowest cards up, plays the first
/// legal card, and flips bottom cards in order once the hand runs dry.
struct FirstLegal;

impl MoveStrategy for FirstLegal {
    fn difficulty(&self) -> Difficulty {
        Difficulty::Easy
    }

    fn choose_top_cards(&mut self, hand: &[Card]) -> Vec<Card> {
        hand[..TOP_CARD_COUNT].to_vec()
    }

    fn choose_move(
        &mut self,
        legal: &[Card],
        player: &PlayerState,
        _state: &GameState,
    ) -> PlayerMove {
        if player.hand.is_empty() {
            return PlayerMove::FlipBottomCard { index: 0 };
        }
        let index = legal
            .first()
            .and_then(|card| player.hand.iter().position(|c| c.same_card(card)));
        match index {
            Some(index) => PlayerMove::PlayHand {
                indices: vec![index],
            },
            None => PlayerMove::PickUpPile,
        }
    }
}

/// Narrates the session through tracing instead of a GUI.
struct LogObserver;

impl StateObserver for LogObserver {
    fn on_state_changed(&mut self, current_player: &PlayerState, deck_size: usize, pile: &[Card]) {
        match pile.last() {
            Some(top) => info!(
                target = LOG_TARGET,
                to_act = %current_player.name,
                deck_size,
                pile_size = pile.len(),
                pile_top = %top,
                "state"
            ),
            None => info!(
                target = LOG_TARGET,
                to_act = %current_player.name,
                deck_size,
                "state, pile empty"
            ),
        }
    }

    fn on_opponent_zones_updated(&mut self, player: PlayerIndex, zones: &PlayerState) {
        info!(
            target = LOG_TARGET,
            player,
            hand = zones.hand.len(),
            top = zones.top_cards.len(),
            bottom = zones.bottom_cards.len(),
            "opponent zones"
        );
    }

    fn on_game_over(&mut self, winner: &str) {
        info!(target = LOG_TARGET, winner, "winner announced");
    }
}
