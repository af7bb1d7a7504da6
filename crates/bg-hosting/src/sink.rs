use std::sync::Arc;
use std::sync::OnceLock;

use bg_session::{Event, NotificationSink, Recipient, RegistryRemoval, SessionId};

use crate::queue::{NotificationQueue, QueueItem, QueuedNotification};

/// Bridges `bg-session`'s [`NotificationSink`] trait to this crate's
/// process-wide Notification Queue (§4.7). A session needs its sink
/// before it has an id — `GameSession::new_pvp`/`new_pve` mint the id
/// internally — so the id is filled in once, right after construction,
/// via [`Self::bind`] rather than threaded through the constructor.
///
/// Also implements [`RegistryRemoval`], and is handed to `GameSession`
/// for both roles. A session's victory path calls `sink.enqueue(...)`
/// for its final `game_over`/`opponent_timeout_victory` notification
/// and then `registry.remove(id)` — routing both through this one
/// queue guarantees the removal lands strictly after the notification
/// it follows, instead of racing the consumer's paced delivery of it.
pub struct SessionSink {
    session_id: OnceLock<SessionId>,
    queue: Arc<NotificationQueue>,
}

impl SessionSink {
    pub fn new(queue: Arc<NotificationQueue>) -> Arc<Self> {
        Arc::new(Self { session_id: OnceLock::new(), queue })
    }

    /// Must be called exactly once, immediately after the owning
    /// session is constructed and before any handler can possibly
    /// trigger a bot turn (so `enqueue` never observes an unbound sink).
    pub fn bind(&self, id: SessionId) {
        self.session_id.set(id).ok();
    }
}

impl NotificationSink for SessionSink {
    fn enqueue(&self, recipient: Recipient, event: Event) {
        let Some(&session_id) = self.session_id.get() else {
            log::error!("notification sink used before being bound to a session id, dropping event");
            return;
        };
        self.queue.push(QueuedNotification { session_id, recipient, event });
    }
}

impl RegistryRemoval for SessionSink {
    fn remove(&self, id: SessionId) {
        self.queue.retire(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_core::ID;

    #[test]
    fn enqueue_before_bind_is_dropped_not_panicked() {
        let (queue, mut rx) = NotificationQueue::new();
        let sink = SessionSink::new(Arc::new(queue));
        sink.enqueue(Recipient::Both, Event::TurnFinished {});
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn enqueue_after_bind_is_tagged_with_the_bound_session() {
        let (queue, mut rx) = NotificationQueue::new();
        let sink = SessionSink::new(Arc::new(queue));
        let id: SessionId = ID::default();
        sink.bind(id);
        sink.enqueue(Recipient::Both, Event::TurnFinished {});
        let queued = match rx.try_recv().unwrap().unwrap() {
            QueueItem::Deliver(queued) => queued,
            QueueItem::Retire(_) => panic!("expected a notification, not a retirement"),
        };
        assert_eq!(queued.session_id, id);
    }

    #[test]
    fn remove_pushes_a_retirement_for_the_given_id() {
        let (queue, mut rx) = NotificationQueue::new();
        let sink = SessionSink::new(Arc::new(queue));
        let id: SessionId = ID::default();
        sink.remove(id);
        match rx.try_recv().unwrap().unwrap() {
            QueueItem::Retire(retired) => assert_eq!(retired, id),
            QueueItem::Deliver(_) => panic!("expected a retirement, not a notification"),
        }
    }

    #[test]
    fn bind_is_idempotent_keeps_the_first_id() {
        let (queue, _rx) = NotificationQueue::new();
        let sink = SessionSink::new(Arc::new(queue));
        let first: SessionId = ID::default();
        let second: SessionId = ID::default();
        sink.bind(first);
        sink.bind(second);
        sink.enqueue(Recipient::Both, Event::TurnFinished {});
        assert_eq!(*sink.session_id.get().unwrap(), first);
    }
}
