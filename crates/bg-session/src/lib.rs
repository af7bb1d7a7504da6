//! Per-session state machine: rule-engine orchestration, lifecycle, and
//! bot turns, composed behind one façade per live game.
//!
//! The managers in this crate (`TurnManager`, `PlayerManager`,
//! `AIManager`) are stateless — every operation takes `&mut GameState`
//! and/or `&mut Table` and returns the notifications to enqueue. Only
//! [`session::GameSession`] holds a lock, acquiring it once per call and
//! handing the guard's contents down to whichever manager the call
//! needs. `bg-hosting` depends on this crate to run the registry,
//! matchmaker, and websocket bridge around many sessions at once; this
//! crate never depends back on it — [`session::NotificationSink`]-style
//! traits invert that edge.
#![allow(dead_code)]

mod ai;
mod dice;
mod event;
mod message;
mod player;
mod protocol;
mod session;
mod state;
mod table;
mod timer;
mod turn;
mod types;

pub use ai::{AIManager, NotificationSink, TurnOutcome};
pub use event::{Event, Notification, OpponentData, Role};
pub use message::InboundEvent;
pub use player::PlayerManager;
pub use protocol::{decode, encode};
pub use session::{GameSession, RegistryRemoval, StatsCollaborator};
pub use state::{GameState, Mode, Phase};
pub use table::{Occupant, Table};
pub use timer::Timer;
pub use turn::TurnManager;
pub use types::{wire_turns, GameSessionMarker, Recipient, Seat, SessionId, WireStep};
