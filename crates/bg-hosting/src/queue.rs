use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;

use bg_session::{Event, Recipient, SessionId};

use crate::registry::Registry;
use crate::sockets::SocketRegistry;

/// One event queued for delivery, still tagged with the session and
/// recipient it needs resolving against (§4.7). The consumer resolves
/// `recipient` into socket ids at delivery time, not at enqueue time,
/// so a seat that reconnects between the bot's move and the paced
/// delivery still gets the notification on its new socket.
#[derive(Debug, Clone)]
pub struct QueuedNotification {
    pub session_id: SessionId,
    pub recipient: Recipient,
    pub event: Event,
}

/// One item on the wire between `SessionSink` and the consumer task.
/// `Retire` lets the victory path's registry removal ride the same
/// FIFO channel as the notifications it follows, so a session is never
/// dropped from the registry until every notification enqueued ahead
/// of the retirement has actually been delivered (§4.5, §5).
pub(crate) enum QueueItem {
    Deliver(QueuedNotification),
    Retire(SessionId),
}

/// Unbounded mpsc channel carrying bot-originated traffic from
/// `bg-session`'s [`bg_session::NotificationSink`] to the consumer task
/// below, so a bot's think-delay never blocks the turn manager's lock.
/// `None` is the shutdown sentinel.
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<Option<QueueItem>>,
}

impl NotificationQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Option<QueueItem>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn push(&self, item: QueuedNotification) {
        if self.tx.send(Some(QueueItem::Deliver(item))).is_err() {
            log::error!("notification queue consumer is gone, dropping event");
        }
    }

    /// Queues `id`'s removal from the registry behind whatever is
    /// already in flight for it. Never called directly — reached
    /// through `SessionSink`'s `RegistryRemoval` impl, which is the
    /// same object the session's events were pushed through.
    pub fn retire(&self, id: SessionId) {
        if self.tx.send(Some(QueueItem::Retire(id))).is_err() {
            log::error!("notification queue consumer is gone, dropping retirement for {id:?}");
        }
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(None);
    }
}

/// Drains the queue and delivers each notification to every socket its
/// recipient resolves to, pacing bot-originated events the way a human
/// opponent's own reaction time would (§4.7): a dice roll result sleeps
/// 0.5-1.5s, a bot's own move sleeps 0.75-2.0s, everything else goes out
/// immediately. Runs for the lifetime of the process as one spawned task.
pub async fn run(mut rx: mpsc::UnboundedReceiver<Option<QueueItem>>, registry: Arc<Registry>, sockets: Arc<SocketRegistry>) {
    while let Some(item) = rx.recv().await {
        let item = match item {
            Some(item) => item,
            None => break,
        };
        let item = match item {
            QueueItem::Retire(id) => {
                registry.remove_by_id(id);
                continue;
            }
            QueueItem::Deliver(item) => item,
        };
        let Some(session) = registry.by_id(item.session_id) else {
            log::warn!("notification queued for unknown session {:?}", item.session_id);
            continue;
        };
        let is_dice_roll = matches!(item.event, Event::BotDiceRollResult { .. });
        let is_bot_step = matches!(item.event, Event::OnOpponentStepExecuted { is_bot_move: true, .. });

        let json = match bg_session::encode(&item.event) {
            Ok(json) => json,
            Err(err) => {
                log::error!("failed to encode queued notification: {err}");
                continue;
            }
        };
        for socket_id in session.sockets_for(item.recipient).await {
            if let Some(mut socket) = sockets.get(&socket_id) {
                if let Err(err) = socket.text(json.clone()).await {
                    log::warn!("failed to deliver queued notification to {socket_id}: {err}");
                }
            }
        }

        if is_dice_roll {
            tokio::time::sleep(pace(0.5, 1.5)).await;
        } else if is_bot_step {
            tokio::time::sleep(pace(0.75, 2.0)).await;
        }
    }
}

fn pace(low: f64, high: f64) -> Duration {
    Duration::from_secs_f64(rand::rng().random_range(low..high))
}
