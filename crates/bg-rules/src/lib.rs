//! Pure, side-effect-free rule engine for short (standard) backgammon.
//!
//! Every operation here is a function over a 28-slot board vector; none of
//! them touch sockets, the database, or any session state. The session
//! layer (`bg-session`) owns the mutable per-game state and calls into
//! this crate for legality and board algebra.

mod board;
mod generate;
mod validate;

pub use board::{apply_step, bar_of, initial_board, opponent_bar_of, tray_of, undo_step};
pub use board::{Board, HistoryRecord, Step};
pub use generate::{enumerate_turns, single_moves};
pub use validate::get_move_details;

use bg_core::{BLACK, WHITE};

/// Returns the winning side, or 0 if neither side has borne off all
/// fifteen checkers yet.
pub fn winner(borne_white: u8, borne_black: u8) -> i8 {
    if borne_white >= bg_core::WINNING_SCORE {
        WHITE
    } else if borne_black >= bg_core::WINNING_SCORE {
        BLACK
    } else {
        0
    }
}

/// True iff at least one legal turn sequence exists.
pub fn are_moves_available(possible_turns: &[Vec<Step>]) -> bool {
    !possible_turns.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_is_zero_until_fifteen_borne_off() {
        assert_eq!(winner(0, 0), 0);
        assert_eq!(winner(14, 0), 0);
        assert_eq!(winner(15, 0), WHITE);
        assert_eq!(winner(0, 15), BLACK);
    }

    #[test]
    fn are_moves_available_reflects_emptiness() {
        assert!(!are_moves_available(&[]));
        assert!(are_moves_available(&[vec![Step { from: 24, to: 18 }]]));
    }
}
