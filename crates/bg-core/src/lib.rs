//! Core type aliases, traits, and constants for the backgammon server.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace: the phantom-typed entity identifier, the crate-wide
//! error enum, and the runtime bootstrap helpers (logging, shutdown).
#![allow(dead_code)]

mod error;

pub use error::{BgError, InternalFault};

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// A single checker count on a board slot; positive = White, negative = Black.
pub type Count = i8;
/// A board slot index, 0..=27.
pub type Slot = usize;
/// A single die's pip count, 1..=6.
pub type Pip = u8;
/// Elo rating delta applied on game end.
pub type Rating = i32;
/// In-game currency delta applied on game end.
pub type Currency = i32;

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    /// Useful for converting between marker types (e.g. socket -> session).
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self {
            inner: uuid::Uuid::deserialize(deserializer)?,
            marker: PhantomData,
        })
    }
}

// ============================================================================
// DOMAIN CONSTANTS
// ============================================================================
/// Number of checkers each side starts and ends with.
pub const CHECKERS_PER_SIDE: u8 = 15;
/// Borne-off checkers required to win a game (no match play, fixed target).
pub const WINNING_SCORE: u8 = CHECKERS_PER_SIDE;
/// White's tray (borne-off) slot.
pub const WHITE_TRAY: Slot = 0;
/// Black's tray (borne-off) slot.
pub const BLACK_TRAY: Slot = 26;
/// White's bar slot.
pub const WHITE_BAR: Slot = 25;
/// Black's bar slot.
pub const BLACK_BAR: Slot = 27;
/// Sign used for White throughout the board vector.
pub const WHITE: i8 = 1;
/// Sign used for Black throughout the board vector.
pub const BLACK: i8 = -1;

/// Seconds a disconnected seat has to rejoin before forfeiting.
pub const DISCONNECT_TIMEOUT_SECS: u64 = 60;
/// Maximum number of tied first rolls retried before surfacing a fault.
pub const FIRST_ROLL_TIE_RETRY_LIMIT: u8 = 8;

/// Default Elo awarded to the winner.
pub const ELO_REWARD_WIN: Rating = 1;
/// Default currency awarded to the winner.
pub const MONEY_REWARD_WIN: Currency = 10;
/// Default Elo penalty applied to the loser.
pub const ELO_PENALTY_LOSS: Rating = -1;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        println!();
        log::warn!("hard interrupt received, exiting immediately");
        std::process::exit(0);
    });
}

/// Global interrupt flag for graceful shutdown coordination.
#[cfg(feature = "server")]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if graceful shutdown was requested (via stdin "Q").
#[cfg(feature = "server")]
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
}
/// No-op interrupt check when the server feature is disabled.
#[cfg(not(feature = "server"))]
pub fn interrupted() -> bool {
    false
}

/// Register a graceful interrupt handler. Type "Q" + Enter to drain and stop.
/// Used at shutdown to drain the Notification Queue's sentinel before exit.
#[cfg(feature = "server")]
pub fn brb() {
    std::thread::spawn(|| loop {
        let ref mut buffer = String::new();
        if std::io::stdin().read_line(buffer).is_ok() {
            if buffer.trim().to_uppercase() == "Q" {
                log::warn!("graceful interrupt requested, draining queues...");
                INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn id_round_trips_through_uuid() {
        let id = ID::<Marker>::default();
        let uuid: uuid::Uuid = id.into();
        let back: ID<Marker> = uuid.into();
        assert_eq!(id, back);
    }

    #[test]
    fn id_cast_preserves_uuid() {
        struct Other;
        let id = ID::<Marker>::default();
        let uuid = id.inner();
        let cast: ID<Other> = id.cast();
        assert_eq!(cast.inner(), uuid);
    }

    #[test]
    fn ids_are_ordered_by_uuid() {
        let a = ID::<Marker>::default();
        let b = ID::<Marker>::default();
        assert_eq!(a.cmp(&b), a.inner().cmp(&b.inner()));
    }
}
