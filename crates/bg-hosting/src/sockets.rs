use std::collections::HashMap;
use std::sync::Mutex;

/// socket id → the live `actix_ws::Session` handle used to push frames
/// to that connection. `actix_ws::Session` is a cheap, cloneable handle
/// onto the connection's write half, so storing clones here and calling
/// `.text()` outside the lock is safe.
#[derive(Default)]
pub struct SocketRegistry {
    sockets: Mutex<HashMap<String, actix_ws::Session>>,
}

impl SocketRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, socket_id: String, session: actix_ws::Session) {
        self.sockets.lock().expect("socket registry mutex poisoned").insert(socket_id, session);
    }

    pub fn remove(&self, socket_id: &str) {
        self.sockets.lock().expect("socket registry mutex poisoned").remove(socket_id);
    }

    pub fn get(&self, socket_id: &str) -> Option<actix_ws::Session> {
        self.sockets.lock().expect("socket registry mutex poisoned").get(socket_id).cloned()
    }
}
