use std::sync::Arc;

use tokio::sync::Mutex;

use bg_core::BgError;

use crate::ai::{AIManager, NotificationSink, TurnOutcome};
use crate::event::Event;
use crate::player::PlayerManager;
use crate::state::{GameState, Mode, Phase};
use crate::table::{Occupant, Table};
use crate::timer::Timer;
use crate::turn::TurnManager;
use crate::types::{Recipient, Seat, SessionId, WireStep};

/// Collaborator the victory path calls to persist Elo/currency deltas
/// and append the stats-log record (§4.3's "Victory path"). Implemented
/// by `bg-hosting`, which wraps `bg-auth`'s repository and
/// `bg-database`'s stats log — kept as a trait here so `bg-session`
/// never needs `tokio-postgres` just to award a game's rewards.
#[async_trait::async_trait]
pub trait StatsCollaborator: Send + Sync {
    async fn award(&self, game_id: SessionId, winner: &str, loser: &str, reason: Option<&str>);
}

/// Callback invoked once a session finishes, so the façade can ask the
/// registry to remove it from all three indexes without depending on
/// `bg-hosting` directly.
pub trait RegistryRemoval: Send + Sync {
    fn remove(&self, id: SessionId);
}

struct Inner {
    state: GameState,
    table: Table,
}

/// Composes the Turn Manager, Player/Lifecycle Manager, and AI Manager
/// under one shared lock and exposes the unified API the Socket Gateway
/// calls into (§4's façade, generalizing the teacher's single-room
/// `Room` type from N seats to backgammon's fixed two). Every public
/// method here acquires [`Inner`]'s mutex exactly once; no manager ever
/// holds a lock of its own, so there is nothing to re-enter.
pub struct GameSession {
    pub id: SessionId,
    inner: Mutex<Inner>,
    timer: Timer,
    sink: Arc<dyn NotificationSink>,
    stats: Arc<dyn StatsCollaborator>,
    registry: Arc<dyn RegistryRemoval>,
}

impl GameSession {
    pub fn new_pvp(
        white: Occupant,
        black: Occupant,
        sink: Arc<dyn NotificationSink>,
        stats: Arc<dyn StatsCollaborator>,
        registry: Arc<dyn RegistryRemoval>,
    ) -> Arc<Self> {
        let mut table = Table::new();
        table.seat(Seat::White, white);
        table.seat(Seat::Black, black);
        let mut state = GameState::new(Mode::Pvp);
        state.phase = Phase::AwaitingReady;
        Arc::new(Self { id: SessionId::default(), inner: Mutex::new(Inner { state, table }), timer: Timer::new(), sink, stats, registry })
    }

    /// `human_seat` is the `player_sign` the client chose in
    /// `start_pve`; the bot always takes the other seat.
    pub fn new_pve(
        human: Occupant,
        human_seat: Seat,
        sink: Arc<dyn NotificationSink>,
        stats: Arc<dyn StatsCollaborator>,
        registry: Arc<dyn RegistryRemoval>,
    ) -> Arc<Self> {
        let bot_seat = human_seat.opponent();
        let mut table = Table::new();
        table.seat(human_seat, human);
        table.seat(bot_seat, Occupant::bot("gnubg"));
        let mut state = GameState::new(Mode::Pve { bot_seat });
        state.phase = Phase::AwaitingReady;
        Arc::new(Self { id: SessionId::default(), inner: Mutex::new(Inner { state, table }), timer: Timer::new(), sink, stats, registry })
    }

    /// `player_ready`.
    pub async fn ready(self: &Arc<Self>, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        let (notifications, bot_seat) = {
            let mut guard = self.inner.lock().await;
            PlayerManager::ready(&mut guard.state, &mut guard.table, sid)?
        };
        if let Some(seat) = bot_seat {
            self.spawn_bot_turn(seat);
        }
        Ok(notifications)
    }

    /// `request_player_roll`.
    pub async fn roll_dice(self: &Arc<Self>, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        let (notifications, bot_seat) = {
            let mut guard = self.inner.lock().await;
            let notifications = TurnManager::roll_dice(&mut guard.state, sid)?;
            (notifications, Self::bot_needs_trigger(&guard.state, &guard.table))
        };
        if let Some(seat) = bot_seat {
            self.spawn_bot_turn(seat);
        }
        Ok(notifications)
    }

    /// `send_player_step`.
    pub async fn apply_step(&self, sid: Seat, step: WireStep) -> Result<Vec<(Recipient, Event)>, BgError> {
        let (notifications, was_finished) = {
            let mut guard = self.inner.lock().await;
            let was_finished = guard.state.phase == Phase::Finished;
            (TurnManager::apply_step(&mut guard.state, sid, step)?, was_finished)
        };
        self.settle_if_finished(was_finished, None).await;
        Ok(notifications)
    }

    /// `request_undo`.
    pub async fn undo(&self, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        let mut guard = self.inner.lock().await;
        TurnManager::undo(&mut guard.state, sid)
    }

    /// `send_turn_finished`.
    pub async fn finalize_turn(self: &Arc<Self>, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        let (notifications, was_finished, bot_seat) = {
            let mut guard = self.inner.lock().await;
            let was_finished = guard.state.phase == Phase::Finished;
            let notifications = TurnManager::finalize_turn(&mut guard.state, sid)?;
            (notifications, was_finished, Self::bot_needs_trigger(&guard.state, &guard.table))
        };
        self.settle_if_finished(was_finished, None).await;
        if let Some(seat) = bot_seat {
            self.spawn_bot_turn(seat);
        }
        Ok(notifications)
    }

    /// `player_give_up`.
    pub async fn give_up(&self, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        let (notifications, was_finished) = {
            let mut guard = self.inner.lock().await;
            let was_finished = guard.state.phase == Phase::Finished;
            (TurnManager::give_up(&mut guard.state, sid)?, was_finished)
        };
        self.settle_if_finished(was_finished, Some("opponent gave up")).await;
        Ok(notifications)
    }

    /// Clears `seat`'s socket, notifies the opponent, and arms the
    /// 60-second forfeit timer.
    pub async fn disconnect(self: &Arc<Self>, seat: Seat) -> Vec<(Recipient, Event)> {
        let notifications = {
            let mut guard = self.inner.lock().await;
            PlayerManager::disconnect(&mut guard.table, seat)
        };
        let session = Arc::clone(self);
        self.timer.arm(move || async move { Self::on_disconnect_timeout(session, seat).await });
        notifications
    }

    /// Rebinds a socket to any seat seated under `username` that is
    /// currently empty. Returns `None` when no such seat exists (the
    /// caller should fall back to treating the connection as fresh).
    pub async fn rejoin(&self, username: &str, socket_id: impl Into<String>) -> Option<(Seat, Vec<(Recipient, Event)>)> {
        let mut guard = self.inner.lock().await;
        let seat = PlayerManager::seat_for_rejoin(&guard.table, username)?;
        let notifications = PlayerManager::rejoin(&guard.state, &mut guard.table, seat, socket_id);
        if guard.table.is_connected(Seat::White) && guard.table.is_connected(Seat::Black) {
            self.timer.cancel();
        }
        Some((seat, notifications))
    }

    /// True iff `username` is seated at an empty seat in this session —
    /// used by the registry's username index to find a rejoin target
    /// without locking every live session.
    pub async fn has_empty_seat_for(&self, username: &str) -> bool {
        let guard = self.inner.lock().await;
        PlayerManager::seat_for_rejoin(&guard.table, username).is_some()
    }

    /// Binds `socket_id` to `seat` without requiring a username match —
    /// used once, at session creation, to seat the socket(s) that just
    /// created this game. Later reconnections go through [`Self::rejoin`]
    /// instead, which *does* require the username to match.
    pub async fn bind_socket(&self, seat: Seat, socket_id: impl Into<String>) {
        let mut guard = self.inner.lock().await;
        guard.table.reconnect(seat, socket_id);
    }

    /// The seat currently bound to `socket_id`, if any — the Socket
    /// Gateway uses this to resolve which seat an inbound message came
    /// from before dispatching into a manager.
    pub async fn seat_of_socket(&self, socket_id: &str) -> Option<Seat> {
        let guard = self.inner.lock().await;
        guard.table.seat_of_socket(socket_id)
    }

    /// Resolves a notification's [`Recipient`] into the socket id(s) it
    /// should be delivered to right now. Used by both the Gateway (for
    /// synchronously-returned notifications) and the Notification Queue
    /// Consumer (for paced, bot-originated ones).
    pub async fn sockets_for(&self, recipient: Recipient) -> Vec<String> {
        let guard = self.inner.lock().await;
        match recipient {
            Recipient::Seat(seat) => guard.table.occupant(seat).and_then(|o| o.socket_id.clone()).into_iter().collect(),
            Recipient::Both => [Seat::White, Seat::Black]
                .into_iter()
                .filter_map(|seat| guard.table.occupant(seat).and_then(|o| o.socket_id.clone()))
                .collect(),
        }
    }

    fn bot_needs_trigger(state: &GameState, table: &Table) -> Option<Seat> {
        if state.phase != Phase::Playing || !state.dice.is_empty() || !state.history.is_empty() {
            return None;
        }
        let seat = Seat::of_sign(state.turn);
        if table.is_bot(seat) {
            Some(seat)
        } else {
            None
        }
    }

    fn spawn_bot_turn(self: &Arc<Self>, bot_seat: Seat) {
        let session = Arc::clone(self);
        tokio::spawn(async move { session.drive_bot_turn(bot_seat).await });
    }

    /// The AI Manager's asynchronous pipeline (§4.5): roll under the
    /// lock, release it for the think-delay and the external engine
    /// call, then re-acquire to replay the canonical turn.
    async fn drive_bot_turn(self: Arc<Self>, bot_seat: Seat) {
        let human_seat = bot_seat.opponent();
        let (board, dice) = {
            let mut guard = self.inner.lock().await;
            AIManager::begin_turn(&mut guard.state, bot_seat.sign())
        };

        tokio::time::sleep(AIManager::think_delay()).await;

        let canonical = match bg_bot::get_bot_turn(&board, &dice, bot_seat.sign()).await {
            Ok(turn) => turn,
            Err(e) => {
                log::warn!("bot adapter call failed, treating turn as no moves: {e}");
                None
            }
        };

        let (was_finished, outcome) = {
            let mut guard = self.inner.lock().await;
            let was_finished = guard.state.phase == Phase::Finished;
            let outcome = AIManager::apply_turn(&mut guard.state, self.sink.as_ref(), human_seat, bot_seat, canonical);
            (was_finished, outcome)
        };

        if let TurnOutcome::Won { winner, bot_turn } = outcome {
            self.sink.enqueue(Recipient::Both, Event::GameOver { winner, reason: None, bot_turn: Some(bot_turn) });
            self.settle_if_finished(was_finished, None).await;
        }
    }

    async fn on_disconnect_timeout(session: Arc<Self>, seat: Seat) {
        let (winner_seat, was_finished) = {
            let mut guard = session.inner.lock().await;
            if guard.table.is_connected(seat) {
                return;
            }
            let was_finished = guard.state.phase == Phase::Finished;
            let winner_seat = PlayerManager::timeout_winner(&guard.table, seat);
            if let Some(winner_seat) = winner_seat {
                if guard.state.phase != Phase::Finished {
                    guard.state.winner = Some(winner_seat.sign());
                    guard.state.phase = Phase::Finished;
                }
            }
            (winner_seat, was_finished)
        };

        match winner_seat {
            Some(winner_seat) => {
                session.sink.enqueue(Recipient::Seat(winner_seat), Event::OpponentTimeoutVictory {});
                session.settle_if_finished(was_finished, Some("disconnect timeout")).await;
            }
            None => session.registry.remove(session.id),
        }
    }

    /// Runs the shared victory path's stats/registry half: awards Elo
    /// and currency, appends the stats record, and removes the session
    /// from the registry — but only the first time a call observes the
    /// `Finished` transition (`was_finished` captures the phase *before*
    /// the manager call that may have just flipped it), so a give-up
    /// racing a timer expiry or the AI callback can never double-credit
    /// (resolves Open Question (a) in §9). `registry.remove` does not
    /// drop the session immediately — the collaborator handed in here
    /// defers it behind whatever `game_over`/`opponent_timeout_victory`
    /// notification this same call just enqueued, so the paced delivery
    /// of earlier bot steps always finishes first.
    async fn settle_if_finished(&self, was_finished: bool, reason: Option<&str>) {
        if was_finished {
            return;
        }
        let (winner_name, loser_name) = {
            let guard = self.inner.lock().await;
            if guard.state.phase != Phase::Finished {
                return;
            }
            let Some(winner_sign) = guard.state.winner else { return };
            let winner_seat = Seat::of_sign(winner_sign);
            let loser_seat = winner_seat.opponent();
            (
                guard.table.occupant(winner_seat).map(|o| o.username.clone()).unwrap_or_default(),
                guard.table.occupant(loser_seat).map(|o| o.username.clone()).unwrap_or_default(),
            )
        };
        self.stats.award(self.id, &winner_name, &loser_name, reason).await;
        self.registry.remove(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullSink;
    impl NotificationSink for NullSink {
        fn enqueue(&self, _recipient: Recipient, _event: Event) {}
    }

    struct CountingStats {
        awards: AtomicUsize,
    }
    #[async_trait::async_trait]
    impl StatsCollaborator for CountingStats {
        async fn award(&self, _game_id: SessionId, _winner: &str, _loser: &str, _reason: Option<&str>) {
            self.awards.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingRegistry {
        removed: AtomicUsize,
    }
    impl RegistryRemoval for CountingRegistry {
        fn remove(&self, _id: SessionId) {
            self.removed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn harness() -> (Arc<GameSession>, Arc<CountingStats>, Arc<CountingRegistry>) {
        let stats = Arc::new(CountingStats { awards: AtomicUsize::new(0) });
        let registry = Arc::new(CountingRegistry { removed: AtomicUsize::new(0) });
        let session = GameSession::new_pvp(
            Occupant::human("alice", 1000, "default.png"),
            Occupant::human("bob", 1000, "default.png"),
            Arc::new(NullSink),
            stats.clone(),
            registry.clone(),
        );
        (session, stats, registry)
    }

    #[tokio::test]
    async fn give_up_awards_stats_exactly_once() {
        let (session, stats, registry) = harness();
        {
            let mut guard = session.inner.lock().await;
            guard.state.phase = Phase::Playing;
        }
        session.give_up(Seat::White).await.unwrap();
        assert_eq!(stats.awards.load(Ordering::SeqCst), 1);
        assert_eq!(registry.removed.load(Ordering::SeqCst), 1);

        // A second give-up against an already-finished session must not
        // re-credit stats or remove the (already removed) session again.
        let second = session.give_up(Seat::Black).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(stats.awards.load(Ordering::SeqCst), 1);
        assert_eq!(registry.removed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejoin_fails_for_unseated_username() {
        let (session, _, _) = harness();
        assert!(session.rejoin("nobody", "sock-1").await.is_none());
    }

    #[tokio::test]
    async fn rejoin_succeeds_for_a_seated_username() {
        let (session, _, _) = harness();
        let (seat, notifications) = session.rejoin("alice", "sock-1").await.unwrap();
        assert_eq!(seat, Seat::White);
        assert!(!notifications.is_empty());
    }
}
