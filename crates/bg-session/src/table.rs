use std::collections::HashMap;

use crate::types::Seat;

/// One occupant of a session: tracks whether the seat is a bot, the
/// username last bound to it (for rejoin-by-username), and its current
/// socket id, if any client is attached right now.
#[derive(Debug, Clone)]
pub struct Occupant {
    pub username: String,
    pub elo: i32,
    pub icon: String,
    pub is_bot: bool,
    pub socket_id: Option<String>,
    pub ready: bool,
}

impl Occupant {
    /// A human occupant, carrying the profile snapshot (elo/icon) the
    /// Game Service resolved from the auth collaborator at session
    /// creation time — so `initial_setup`'s `opponent_data` never needs
    /// a database round-trip from inside the session lock.
    pub fn human(username: impl Into<String>, elo: i32, icon: impl Into<String>) -> Self {
        Self { username: username.into(), elo, icon: icon.into(), is_bot: false, socket_id: None, ready: false }
    }

    pub fn bot(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            elo: 0,
            icon: "bot.png".to_string(),
            is_bot: true,
            socket_id: Some(String::new()),
            ready: true,
        }
    }
}

/// Seat ↔ socket ↔ username bookkeeping for one session. Adapted from the
/// teacher's room seating table, generalized from N players to the fixed
/// two-seat backgammon layout (PvE leaves one seat permanently bot-bound).
#[derive(Debug, Default)]
pub struct Table {
    seats: HashMap<Seat, Occupant>,
}

impl Table {
    pub fn new() -> Self {
        Self { seats: HashMap::new() }
    }

    pub fn seat(&mut self, seat: Seat, occupant: Occupant) {
        self.seats.insert(seat, occupant);
    }

    pub fn occupant(&self, seat: Seat) -> Option<&Occupant> {
        self.seats.get(&seat)
    }

    pub fn occupant_mut(&mut self, seat: Seat) -> Option<&mut Occupant> {
        self.seats.get_mut(&seat)
    }

    pub fn is_bot(&self, seat: Seat) -> bool {
        self.seats.get(&seat).map(|o| o.is_bot).unwrap_or(false)
    }

    pub fn seat_of_socket(&self, socket_id: &str) -> Option<Seat> {
        self.seats
            .iter()
            .find(|(_, o)| o.socket_id.as_deref() == Some(socket_id))
            .map(|(seat, _)| *seat)
    }

    pub fn seat_of_username(&self, username: &str) -> Option<Seat> {
        self.seats
            .iter()
            .find(|(_, o)| o.username == username)
            .map(|(seat, _)| *seat)
    }

    /// Clears the socket binding for `seat` without forgetting the
    /// occupant's username, so a later rejoin can rebind to it.
    pub fn disconnect(&mut self, seat: Seat) {
        if let Some(occupant) = self.seats.get_mut(&seat) {
            occupant.socket_id = None;
        }
    }

    pub fn reconnect(&mut self, seat: Seat, socket_id: impl Into<String>) {
        if let Some(occupant) = self.seats.get_mut(&seat) {
            occupant.socket_id = Some(socket_id.into());
        }
    }

    pub fn is_connected(&self, seat: Seat) -> bool {
        self.seats.get(&seat).map(|o| o.socket_id.is_some()).unwrap_or(false)
    }

    pub fn both_ready(&self) -> bool {
        self.seats.get(&Seat::White).map(|o| o.ready).unwrap_or(false)
            && self.seats.get(&Seat::Black).map(|o| o.ready).unwrap_or(false)
    }

    pub fn set_ready(&mut self, seat: Seat) {
        if let Some(occupant) = self.seats.get_mut(&seat) {
            occupant.ready = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejoin_rebinds_by_username() {
        let mut table = Table::new();
        table.seat(Seat::White, Occupant::human("alice", 1000, "default.png"));
        table.seat(Seat::Black, Occupant::human("bob", 1000, "default.png"));
        table.reconnect(Seat::White, "sock-1");
        table.disconnect(Seat::White);
        assert!(!table.is_connected(Seat::White));

        let seat = table.seat_of_username("alice").unwrap();
        table.reconnect(seat, "sock-2");
        assert!(table.is_connected(Seat::White));
    }

    #[test]
    fn bot_occupant_is_always_considered_connected() {
        let mut table = Table::new();
        table.seat(Seat::Black, Occupant::bot("gnubg"));
        assert!(table.is_connected(Seat::Black));
        assert!(table.is_bot(Seat::Black));
    }
}
