use std::sync::Arc;

use rand::Rng;
use tokio_postgres::Client;

use bg_auth::AuthRepository;
use bg_core::BgError;
use bg_session::{Event, GameSession, InboundEvent, OpponentData, Occupant, Recipient, Role, Seat, SessionId};

use crate::matchmaker::{MatchResult, Matchmaker, Waiting};
use crate::queue::NotificationQueue;
use crate::registry::Registry;
use crate::sink::SessionSink;

/// The thin façade the Gateway calls into (§4.6's "Game Service"). Every
/// method returns the `(socket_id, Event)` pairs the Gateway hands
/// straight to [`crate::sockets::SocketRegistry`] — the Gateway never
/// touches a `GameSession` or the registry directly.
pub struct GameService {
    registry: Arc<Registry>,
    matchmaker: Arc<Matchmaker>,
    queue: Arc<NotificationQueue>,
    db: Arc<Client>,
    stats: Arc<dyn bg_session::StatsCollaborator>,
}

impl GameService {
    pub fn new(
        registry: Arc<Registry>,
        matchmaker: Arc<Matchmaker>,
        queue: Arc<NotificationQueue>,
        db: Arc<Client>,
        stats: Arc<dyn bg_session::StatsCollaborator>,
    ) -> Self {
        Self { registry, matchmaker, queue, db, stats }
    }

    /// Looks up the session a socket is currently seated in along with
    /// which seat it occupies, rejecting with `move_rejection` if the
    /// socket isn't part of any live game.
    async fn seated_session(&self, socket_id: &str) -> Result<(Arc<GameSession>, Seat), BgError> {
        let session = self
            .registry
            .by_socket(socket_id)
            .ok_or_else(|| BgError::Rejection("you are not part of a game".to_string()))?;
        let seat = session
            .seat_of_socket(socket_id)
            .await
            .ok_or_else(|| BgError::Rejection("you are not seated in this game".to_string()))?;
        Ok((session, seat))
    }

    /// Turns a handler's `Result` into wire events: `Ok` resolves every
    /// notification to its recipients' current sockets, `Err` is
    /// reported only to the caller (§7).
    async fn handle_result(
        &self,
        session: &Arc<GameSession>,
        socket_id: &str,
        result: Result<Vec<(Recipient, Event)>, BgError>,
    ) -> Vec<(String, Event)> {
        match result {
            Ok(notifications) => self.resolve(session, notifications).await,
            Err(err) => vec![(socket_id.to_string(), Event::MoveRejection { message: err.to_string() })],
        }
    }

    async fn resolve(&self, session: &Arc<GameSession>, notifications: Vec<(Recipient, Event)>) -> Vec<(String, Event)> {
        let mut out = Vec::new();
        for (recipient, event) in notifications {
            for socket_id in session.sockets_for(recipient).await {
                out.push((socket_id, event.clone()));
            }
        }
        out
    }

    /// `start_pve`. Rejects a socket that is already seated elsewhere.
    pub async fn start_pve(&self, socket_id: &str, username: &str, player_sign: i8) -> Vec<(String, Event)> {
        if self.registry.by_socket(socket_id).is_some() {
            return vec![(socket_id.to_string(), Event::MoveRejection { message: "already in a game".to_string() })];
        }
        let record = match self.db.lookup(username).await {
            Ok(Some(record)) => record,
            Ok(None) => return vec![(socket_id.to_string(), Event::MoveRejection { message: "unknown user".to_string() })],
            Err(err) => return vec![(socket_id.to_string(), Event::MoveRejection { message: err.to_string() })],
        };

        let sink = SessionSink::new(self.queue.clone());
        let human_seat = Seat::of_sign(player_sign);
        let session = GameSession::new_pve(
            Occupant::human(username, record.elo, record.icon.clone()),
            human_seat,
            sink.clone(),
            self.stats.clone(),
            sink.clone(),
        );
        sink.bind(session.id);
        session.bind_socket(human_seat, socket_id.to_string()).await;
        self.registry.add(session.clone(), &[socket_id.to_string()], &[username.to_string()]);

        vec![(socket_id.to_string(), Event::GameCreated { game_id: session.id.to_string() })]
    }

    /// `find_pvp_match`.
    pub async fn find_pvp_match(&self, socket_id: &str, username: &str) -> Vec<(String, Event)> {
        if self.registry.by_socket(socket_id).is_some() {
            return vec![(socket_id.to_string(), Event::MatchmakingRejected { message: "already in a game".to_string() })];
        }
        match self.matchmaker.find_or_queue(Waiting { socket_id: socket_id.to_string(), username: username.to_string() }) {
            MatchResult::AlreadyInQueue => {
                vec![(socket_id.to_string(), Event::MatchmakingRejected { message: "already searching".to_string() })]
            }
            MatchResult::Queued => vec![(socket_id.to_string(), Event::SearchingMatch {})],
            MatchResult::Found { a, b } => self.pair(a, b).await,
        }
    }

    pub async fn cancel_pvp_search(&self, socket_id: &str) -> Vec<(String, Event)> {
        self.matchmaker.cancel(socket_id);
        vec![(socket_id.to_string(), Event::SearchCancelled {})]
    }

    /// Resolves both waiting players' public profiles and seats them
    /// into a new session. If either lookup fails, the other socket is
    /// put back on the queue (§4.6) rather than losing its place.
    async fn pair(&self, a: Waiting, b: Waiting) -> Vec<(String, Event)> {
        let profile_a = self.db.lookup(&a.username).await.ok().flatten().map(|r| bg_auth::PublicProfile::from(&r));
        let profile_b = self.db.lookup(&b.username).await.ok().flatten().map(|r| bg_auth::PublicProfile::from(&r));

        let (profile_a, profile_b) = match (profile_a, profile_b) {
            (Some(pa), Some(pb)) => (pa, pb),
            (Some(_), None) => {
                self.matchmaker.requeue(a.clone());
                return vec![(
                    a.socket_id,
                    Event::MatchFailedRequeued { message: "opponent profile unavailable, searching again".to_string() },
                )];
            }
            (None, Some(_)) => {
                self.matchmaker.requeue(b.clone());
                return vec![(
                    b.socket_id,
                    Event::MatchFailedRequeued { message: "opponent profile unavailable, searching again".to_string() },
                )];
            }
            (None, None) => return Vec::new(),
        };

        let a_is_white = rand::rng().random_bool(0.5);
        let (white, white_socket, white_profile, black, black_socket, black_profile) = if a_is_white {
            (a.username.clone(), a.socket_id.clone(), profile_a.clone(), b.username.clone(), b.socket_id.clone(), profile_b.clone())
        } else {
            (b.username.clone(), b.socket_id.clone(), profile_b.clone(), a.username.clone(), a.socket_id.clone(), profile_a.clone())
        };

        let sink = SessionSink::new(self.queue.clone());
        let session = GameSession::new_pvp(
            Occupant::human(white.clone(), white_profile.elo, white_profile.icon.clone()),
            Occupant::human(black.clone(), black_profile.elo, black_profile.icon.clone()),
            sink.clone(),
            self.stats.clone(),
            sink.clone(),
        );
        sink.bind(session.id);
        session.bind_socket(Seat::White, white_socket.clone()).await;
        session.bind_socket(Seat::Black, black_socket.clone()).await;
        self.registry.add(
            session.clone(),
            &[white_socket.clone(), black_socket.clone()],
            &[white.clone(), black.clone()],
        );

        vec![
            (
                white_socket,
                Event::MatchFound {
                    game_id: session.id.to_string(),
                    role: Role::White,
                    opponent_data: OpponentData { username: black_profile.username, elo: black_profile.elo, icon: black_profile.icon },
                },
            ),
            (
                black_socket,
                Event::MatchFound {
                    game_id: session.id.to_string(),
                    role: Role::Black,
                    opponent_data: OpponentData { username: white_profile.username, elo: white_profile.elo, icon: white_profile.icon },
                },
            ),
        ]
    }

    /// `client_ready_for_sync` — rejoin by username, for a client that
    /// reconnected without remembering which game it was in.
    pub async fn sync_rejoin(&self, socket_id: &str, username: &str) -> Vec<(String, Event)> {
        let Some(session) = self.registry.by_username(username) else {
            return vec![(socket_id.to_string(), Event::MoveRejection { message: "no game to sync".to_string() })];
        };
        self.finish_rejoin(session, socket_id, username).await
    }

    /// `client_ready_for_roll{game_id}` — rejoin by the id the client
    /// already has cached from `game_created`/`match_found`.
    pub async fn rejoin_by_id(&self, socket_id: &str, username: &str, game_id: &str) -> Vec<(String, Event)> {
        let Ok(uuid) = game_id.parse::<uuid::Uuid>() else {
            return vec![(socket_id.to_string(), Event::MoveRejection { message: "malformed game id".to_string() })];
        };
        let Some(session) = self.registry.by_id(SessionId::from(uuid)) else {
            return vec![(socket_id.to_string(), Event::MoveRejection { message: "unknown game".to_string() })];
        };
        self.finish_rejoin(session, socket_id, username).await
    }

    async fn finish_rejoin(&self, session: Arc<GameSession>, socket_id: &str, username: &str) -> Vec<(String, Event)> {
        match session.rejoin(username, socket_id.to_string()).await {
            Some((_, notifications)) => {
                self.registry.associate_socket(socket_id.to_string(), session.id);
                self.resolve(&session, notifications).await
            }
            None => vec![(socket_id.to_string(), Event::MoveRejection { message: "no seat to rejoin".to_string() })],
        }
    }

    pub async fn player_ready(&self, socket_id: &str) -> Vec<(String, Event)> {
        match self.seated_session(socket_id).await {
            Ok((session, seat)) => {
                let result = session.ready(seat).await;
                self.handle_result(&session, socket_id, result).await
            }
            Err(err) => vec![(socket_id.to_string(), Event::MoveRejection { message: err.to_string() })],
        }
    }

    pub async fn request_player_roll(&self, socket_id: &str) -> Vec<(String, Event)> {
        match self.seated_session(socket_id).await {
            Ok((session, seat)) => {
                let result = session.roll_dice(seat).await;
                self.handle_result(&session, socket_id, result).await
            }
            Err(err) => vec![(socket_id.to_string(), Event::MoveRejection { message: err.to_string() })],
        }
    }

    pub async fn send_player_step(&self, socket_id: &str, step: bg_session::WireStep) -> Vec<(String, Event)> {
        match self.seated_session(socket_id).await {
            Ok((session, seat)) => {
                let result = session.apply_step(seat, step).await;
                self.handle_result(&session, socket_id, result).await
            }
            Err(err) => vec![(socket_id.to_string(), Event::MoveRejection { message: err.to_string() })],
        }
    }

    pub async fn request_undo(&self, socket_id: &str) -> Vec<(String, Event)> {
        match self.seated_session(socket_id).await {
            Ok((session, seat)) => {
                let result = session.undo(seat).await;
                self.handle_result(&session, socket_id, result).await
            }
            Err(err) => vec![(socket_id.to_string(), Event::MoveRejection { message: err.to_string() })],
        }
    }

    pub async fn send_turn_finished(&self, socket_id: &str) -> Vec<(String, Event)> {
        match self.seated_session(socket_id).await {
            Ok((session, seat)) => {
                let result = session.finalize_turn(seat).await;
                self.handle_result(&session, socket_id, result).await
            }
            Err(err) => vec![(socket_id.to_string(), Event::MoveRejection { message: err.to_string() })],
        }
    }

    pub async fn player_give_up(&self, socket_id: &str) -> Vec<(String, Event)> {
        match self.seated_session(socket_id).await {
            Ok((session, seat)) => {
                let result = session.give_up(seat).await;
                self.handle_result(&session, socket_id, result).await
            }
            Err(err) => vec![(socket_id.to_string(), Event::MoveRejection { message: err.to_string() })],
        }
    }

    /// Routes one decoded inbound event to its handler (§6). The Gateway
    /// is the only caller; `username` comes from the connection's JWT.
    pub async fn dispatch(&self, socket_id: &str, username: &str, inbound: InboundEvent) -> Vec<(String, Event)> {
        match inbound {
            InboundEvent::ClientReadyForSync => self.sync_rejoin(socket_id, username).await,
            InboundEvent::StartPve { player_sign, .. } => self.start_pve(socket_id, username, player_sign).await,
            InboundEvent::ClientReadyForRoll { game_id } => self.rejoin_by_id(socket_id, username, &game_id).await,
            InboundEvent::RequestPlayerRoll => self.request_player_roll(socket_id).await,
            InboundEvent::SendPlayerStep { step } => self.send_player_step(socket_id, step).await,
            InboundEvent::RequestUndo => self.request_undo(socket_id).await,
            InboundEvent::SendTurnFinished => self.send_turn_finished(socket_id).await,
            InboundEvent::PlayerGiveUp => self.player_give_up(socket_id).await,
            InboundEvent::FindPvpMatch => self.find_pvp_match(socket_id, username).await,
            InboundEvent::CancelPvpSearch => self.cancel_pvp_search(socket_id).await,
            InboundEvent::PlayerReady => self.player_ready(socket_id).await,
        }
    }
}
