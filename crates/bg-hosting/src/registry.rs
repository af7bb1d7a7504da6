use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use bg_session::{GameSession, SessionId};

/// Process-wide index of live sessions, keyed three ways (§4.6). A plain
/// `std::sync::Mutex` is enough here — every operation is a HashMap
/// lookup or insert with no `.await` in between, so there is nothing to
/// hold the lock across.
#[derive(Default)]
struct Inner {
    by_id: HashMap<SessionId, Arc<GameSession>>,
    by_socket: HashMap<String, SessionId>,
    by_username: HashMap<String, SessionId>,
}

pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    /// Inserts `session` under all three indexes at once: its id, every
    /// socket currently seated, and every username seated.
    pub fn add(&self, session: Arc<GameSession>, sockets: &[String], usernames: &[String]) {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        let id = session.id;
        for socket in sockets {
            inner.by_socket.insert(socket.clone(), id);
        }
        for username in usernames {
            inner.by_username.insert(username.clone(), id);
        }
        inner.by_id.insert(id, session);
    }

    pub fn by_id(&self, id: SessionId) -> Option<Arc<GameSession>> {
        self.inner.lock().expect("registry mutex poisoned").by_id.get(&id).cloned()
    }

    pub fn by_socket(&self, socket_id: &str) -> Option<Arc<GameSession>> {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        let id = *inner.by_socket.get(socket_id)?;
        inner.by_id.get(&id).cloned()
    }

    pub fn by_username(&self, username: &str) -> Option<Arc<GameSession>> {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        let id = *inner.by_username.get(username)?;
        inner.by_id.get(&id).cloned()
    }

    /// Rebinds `socket_id` to `id` without touching the username index —
    /// used on rejoin, where the username mapping is already correct and
    /// only the socket changed (§4.6).
    pub fn associate_socket(&self, socket_id: String, id: SessionId) {
        self.inner.lock().expect("registry mutex poisoned").by_socket.insert(socket_id, id);
    }

    /// Removes every entry referencing `id` from all three maps.
    pub fn remove_by_id(&self, id: SessionId) {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        inner.by_id.remove(&id);
        inner.by_socket.retain(|_, v| *v != id);
        inner.by_username.retain(|_, v| *v != id);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_session::{Occupant, RegistryRemoval};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullSink;
    impl bg_session::NotificationSink for NullSink {
        fn enqueue(&self, _recipient: bg_session::Recipient, _event: bg_session::Event) {}
    }
    struct NullStats;
    #[async_trait::async_trait]
    impl bg_session::StatsCollaborator for NullStats {
        async fn award(&self, _game_id: SessionId, _winner: &str, _loser: &str, _reason: Option<&str>) {}
    }
    struct CountingRegistry(AtomicUsize);
    impl RegistryRemoval for CountingRegistry {
        fn remove(&self, _id: SessionId) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn add_then_lookup_by_all_three_keys() {
        let registry = Registry::new();
        let session = GameSession::new_pvp(
            Occupant::human("alice", 1000, "default.png"),
            Occupant::human("bob", 1000, "default.png"),
            Arc::new(NullSink),
            Arc::new(NullStats),
            Arc::new(CountingRegistry(AtomicUsize::new(0))),
        );
        registry.add(session.clone(), &["sock-1".to_string()], &["alice".to_string(), "bob".to_string()]);

        assert!(registry.by_id(session.id).is_some());
        assert!(registry.by_socket("sock-1").is_some());
        assert!(registry.by_username("alice").is_some());
        assert!(registry.by_username("bob").is_some());
    }

    #[test]
    fn remove_by_id_clears_every_index() {
        let registry = Registry::new();
        let session = GameSession::new_pvp(
            Occupant::human("alice", 1000, "default.png"),
            Occupant::human("bob", 1000, "default.png"),
            Arc::new(NullSink),
            Arc::new(NullStats),
            Arc::new(CountingRegistry(AtomicUsize::new(0))),
        );
        let id = session.id;
        registry.add(session, &["sock-1".to_string()], &["alice".to_string()]);
        registry.remove_by_id(id);

        assert!(registry.by_id(id).is_none());
        assert!(registry.by_socket("sock-1").is_none());
        assert!(registry.by_username("alice").is_none());
    }

    #[test]
    fn associate_socket_does_not_touch_username_index() {
        let registry = Registry::new();
        let session = GameSession::new_pvp(
            Occupant::human("alice", 1000, "default.png"),
            Occupant::human("bob", 1000, "default.png"),
            Arc::new(NullSink),
            Arc::new(NullStats),
            Arc::new(CountingRegistry(AtomicUsize::new(0))),
        );
        let id = session.id;
        registry.add(session, &["sock-1".to_string()], &["alice".to_string()]);
        registry.associate_socket("sock-2".to_string(), id);

        assert!(registry.by_socket("sock-2").is_some());
        assert!(registry.by_username("alice").is_some());
    }
}
