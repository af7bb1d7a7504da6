use std::sync::Arc;

use futures::StreamExt;
use tokio_postgres::Client;

use bg_database::StatsLog;
use bg_session::Event;

use crate::matchmaker::Matchmaker;
use crate::queue::{self, NotificationQueue};
use crate::registry::Registry;
use crate::service::GameService;
use crate::sockets::SocketRegistry;
use crate::stats::DbStats;

/// Owns every process-wide collaborator (registry, matchmaker,
/// notification queue, socket table) and the websocket bridge loop that
/// drives them, generalizing the teacher's `Casino`. The teacher's
/// `Room` is an actor reached over channels; `bg-session`'s
/// `GameSession` is a plain async façade instead, so there is no
/// per-room task here — `bridge` talks to the session directly and only
/// the Notification Queue Consumer runs as a background task.
pub struct Gateway {
    registry: Arc<Registry>,
    matchmaker: Arc<Matchmaker>,
    sockets: Arc<SocketRegistry>,
    service: Arc<GameService>,
}

impl Gateway {
    pub fn new(db: Arc<Client>, stats_log: Arc<StatsLog>) -> Self {
        let registry = Arc::new(Registry::new());
        let matchmaker = Arc::new(Matchmaker::new());
        let sockets = Arc::new(SocketRegistry::new());
        let (queue, rx) = NotificationQueue::new();
        let queue = Arc::new(queue);

        tokio::spawn(queue::run(rx, registry.clone(), sockets.clone()));

        let stats = Arc::new(DbStats::new(db.clone(), stats_log));
        let service = Arc::new(GameService::new(registry.clone(), matchmaker.clone(), queue, db, stats));

        Self { registry, matchmaker, sockets, service }
    }

    /// Upgrades one websocket connection and spawns its bridge loop.
    /// `username` is `None` when the connecting token failed to verify —
    /// the socket gets `auth_failed` and is closed immediately (§7's
    /// terminal fault).
    pub async fn bridge(
        &self,
        username: Option<String>,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) -> anyhow::Result<()> {
        let Some(username) = username else {
            let json = bg_session::encode(&Event::AuthFailed { message: "invalid or expired token".to_string() })
                .unwrap_or_default();
            let _ = session.text(json).await;
            let _ = session.close(None).await;
            return Ok(());
        };

        let socket_id = uuid::Uuid::now_v7().to_string();
        self.sockets.insert(socket_id.clone(), session.clone());
        log::debug!("[gateway] socket {socket_id} connected as {username}");

        let registry = self.registry.clone();
        let matchmaker = self.matchmaker.clone();
        let sockets = self.sockets.clone();
        let service = self.service.clone();

        actix_web::rt::spawn(async move {
            'sesh: loop {
                match stream.next().await {
                    Some(Ok(actix_ws::Message::Text(text))) => {
                        let outgoing = match bg_session::decode(&text) {
                            Ok(inbound) => service.dispatch(&socket_id, &username, inbound).await,
                            Err(err) => vec![(socket_id.clone(), Event::MoveRejection { message: err.to_string() })],
                        };
                        for (target, event) in outgoing {
                            let Ok(json) = bg_session::encode(&event) else { continue };
                            if let Some(mut socket) = sockets.get(&target) {
                                if socket.text(json).await.is_err() && target == socket_id {
                                    break 'sesh;
                                }
                            }
                        }
                    }
                    Some(Ok(actix_ws::Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() {
                            break 'sesh;
                        }
                    }
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                }
            }

            matchmaker.cancel(&socket_id);
            if let Some(game_session) = registry.by_socket(&socket_id) {
                if let Some(seat) = game_session.seat_of_socket(&socket_id).await {
                    for (recipient, event) in game_session.disconnect(seat).await {
                        for target in game_session.sockets_for(recipient).await {
                            if let Ok(json) = bg_session::encode(&event) {
                                if let Some(mut socket) = sockets.get(&target) {
                                    let _ = socket.text(json).await;
                                }
                            }
                        }
                    }
                }
            }
            sockets.remove(&socket_id);
            log::debug!("[gateway] socket {socket_id} disconnected");
        });

        Ok(())
    }
}
