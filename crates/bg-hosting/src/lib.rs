//! Process-wide collaborators that run many [`bg_session::GameSession`]s
//! at once: the session registry, PvP matchmaker, paced notification
//! queue, socket table, and the websocket bridge that ties them to
//! actix-web.
//!
//! Grounded on the teacher's `hosting` crate (`casino.rs`/`handle.rs`),
//! generalized from one room type reached over channels to the fixed
//! two-seat backgammon session, which is a plain async façade rather
//! than a message-passing actor — see [`gateway::Gateway`]'s doc comment.

mod gateway;
mod matchmaker;
mod queue;
mod registry;
mod service;
mod sink;
mod sockets;
mod stats;

pub use gateway::Gateway;
pub use matchmaker::{MatchResult, Matchmaker, Waiting};
pub use queue::{NotificationQueue, QueuedNotification};
pub use registry::Registry;
pub use service::GameService;
pub use sink::SessionSink;
pub use sockets::SocketRegistry;
pub use stats::DbStats;
