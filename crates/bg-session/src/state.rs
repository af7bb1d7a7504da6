use bg_rules::{initial_board, Board, HistoryRecord};

use crate::types::Seat;

/// Who the session is matching the human against. PvE always pins the
/// bot to one fixed seat for the session's lifetime — the Matchmaker
/// never reassigns it, and the AI Manager only ever drives `bot_seat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Pvp,
    Pve { bot_seat: Seat },
}

impl Mode {
    pub fn bot_seat(self) -> Option<Seat> {
        match self {
            Mode::Pvp => None,
            Mode::Pve { bot_seat } => Some(bot_seat),
        }
    }
}

/// The session's forward-only lifecycle. Matches are created, wait for
/// both seats to ready up, resolve the opening roll, play, and finish;
/// there is no path back to an earlier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    AwaitingReady,
    StartingRoll,
    Playing,
    Finished,
}

/// All per-session game data that lives behind the session's single
/// mutex. Mirrors the board/dice/history triple the rule engine works
/// over, plus the bookkeeping (bear-off counts, whose turn, phase) that
/// the rule engine itself stays ignorant of.
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: Mode,
    pub phase: Phase,
    pub board: Board,
    pub dice: Vec<u8>,
    pub possible_turns: Vec<Vec<bg_rules::Step>>,
    pub history: Vec<HistoryRecord>,
    pub turn: i8,
    pub borne_white: u8,
    pub borne_black: u8,
    pub winner: Option<i8>,
}

impl GameState {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            phase: Phase::Created,
            board: initial_board(),
            dice: Vec::new(),
            possible_turns: Vec::new(),
            history: Vec::new(),
            turn: bg_core::WHITE,
            borne_white: 0,
            borne_black: 0,
            winner: None,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Mode::Pvp)
    }
}
