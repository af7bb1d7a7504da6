use serde::{Deserialize, Serialize};

use bg_core::{ID, WHITE};

/// A seat in a session: the two colors, or PvE's single human seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    White,
    Black,
}

impl Seat {
    pub fn sign(self) -> i8 {
        match self {
            Seat::White => WHITE,
            Seat::Black => -WHITE,
        }
    }

    pub fn of_sign(sign: i8) -> Self {
        if sign == WHITE { Seat::White } else { Seat::Black }
    }

    pub fn opponent(self) -> Self {
        match self {
            Seat::White => Seat::Black,
            Seat::Black => Seat::White,
        }
    }
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Seat(Seat),
    Both,
}

/// Wire-facing mirror of [`bg_rules::Step`] — `bg-rules` stays
/// dependency-free, so the serializable shape lives here at the session
/// boundary instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireStep {
    pub from: usize,
    pub to: usize,
}

impl From<bg_rules::Step> for WireStep {
    fn from(step: bg_rules::Step) -> Self {
        Self { from: step.from, to: step.to }
    }
}
impl From<WireStep> for bg_rules::Step {
    fn from(step: WireStep) -> Self {
        bg_rules::Step { from: step.from, to: step.to }
    }
}

pub fn wire_turns(turns: &[Vec<bg_rules::Step>]) -> Vec<Vec<WireStep>> {
    turns
        .iter()
        .map(|seq| seq.iter().copied().map(WireStep::from).collect())
        .collect()
}

/// Unique marker type for [`ID<GameSessionMarker>`] so session ids don't
/// collide with any other entity's id space.
pub struct GameSessionMarker;
pub type SessionId = ID<GameSessionMarker>;
