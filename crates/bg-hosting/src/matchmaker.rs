use std::collections::VecDeque;
use std::sync::Mutex;

/// One socket waiting for a PvP opponent. Carries just enough of the
/// connecting player's identity that a successful pairing can build a
/// session's seating without a second registry round-trip.
#[derive(Debug, Clone)]
pub struct Waiting {
    pub socket_id: String,
    pub username: String,
}

/// Outcome of [`Matchmaker::find_or_queue`] (§4.6).
pub enum MatchResult {
    AlreadyInQueue,
    Queued,
    Found { a: Waiting, b: Waiting },
}

/// FIFO queue of sockets waiting for a PvP opponent, under its own
/// mutex — the Matchmaker never looks at a session, only at the queue
/// (§3's "it knows nothing about sessions").
pub struct Matchmaker {
    queue: Mutex<VecDeque<Waiting>>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self { queue: Mutex::new(VecDeque::new()) }
    }

    /// Pops the head of the queue and pairs it with `waiting` if one is
    /// present; otherwise enqueues `waiting` and reports `Queued`. A
    /// socket already in the queue gets `AlreadyInQueue` instead of a
    /// duplicate entry.
    pub fn find_or_queue(&self, waiting: Waiting) -> MatchResult {
        let mut queue = self.queue.lock().expect("matchmaker mutex poisoned");
        if queue.iter().any(|w| w.socket_id == waiting.socket_id) {
            return MatchResult::AlreadyInQueue;
        }
        match queue.pop_front() {
            Some(opponent) => MatchResult::Found { a: opponent, b: waiting },
            None => {
                queue.push_back(waiting);
                MatchResult::Queued
            }
        }
    }

    /// Appends `waiting` to the back of the queue unconditionally, never
    /// pairing it against whoever is already there. Used to put a
    /// survivor back on the queue after its pairing attempt falls
    /// through (§4.6) — `find_or_queue` would instead pop and steal
    /// whoever is actually waiting.
    pub fn requeue(&self, waiting: Waiting) {
        let mut queue = self.queue.lock().expect("matchmaker mutex poisoned");
        if queue.iter().any(|w| w.socket_id == waiting.socket_id) {
            return;
        }
        queue.push_back(waiting);
    }

    /// Removes `socket_id` from the queue, if present. The Gateway calls
    /// this unconditionally on every disconnect (§4.6).
    pub fn cancel(&self, socket_id: &str) {
        self.queue.lock().expect("matchmaker mutex poisoned").retain(|w| w.socket_id != socket_id);
    }
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiting(socket: &str, user: &str) -> Waiting {
        Waiting { socket_id: socket.to_string(), username: user.to_string() }
    }

    #[test]
    fn first_socket_queues_second_pairs() {
        let mm = Matchmaker::new();
        assert!(matches!(mm.find_or_queue(waiting("s1", "alice")), MatchResult::Queued));
        match mm.find_or_queue(waiting("s2", "bob")) {
            MatchResult::Found { a, b } => {
                assert_eq!(a.socket_id, "s1");
                assert_eq!(b.socket_id, "s2");
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn requeueing_the_same_socket_is_rejected() {
        let mm = Matchmaker::new();
        mm.find_or_queue(waiting("s1", "alice"));
        assert!(matches!(mm.find_or_queue(waiting("s1", "alice")), MatchResult::AlreadyInQueue));
    }

    #[test]
    fn cancel_removes_from_queue() {
        let mm = Matchmaker::new();
        mm.find_or_queue(waiting("s1", "alice"));
        mm.cancel("s1");
        assert!(matches!(mm.find_or_queue(waiting("s1", "alice")), MatchResult::Queued));
    }

    #[test]
    fn requeue_appends_without_stealing_whoever_is_waiting() {
        let mm = Matchmaker::new();
        mm.find_or_queue(waiting("s1", "alice"));
        mm.requeue(waiting("s2", "bob"));
        match mm.find_or_queue(waiting("s3", "carol")) {
            MatchResult::Found { a, b } => {
                assert_eq!(a.socket_id, "s1");
                assert_eq!(b.socket_id, "s3");
            }
            _ => panic!("expected s1 to still be paired off first"),
        }
        match mm.find_or_queue(waiting("s4", "dave")) {
            MatchResult::Found { a, b } => {
                assert_eq!(a.socket_id, "s2");
                assert_eq!(b.socket_id, "s4");
            }
            _ => panic!("expected the requeued socket to still be in line"),
        }
    }
}
