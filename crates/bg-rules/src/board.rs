use bg_core::{BLACK, BLACK_BAR, BLACK_TRAY, WHITE, WHITE_BAR, WHITE_TRAY};

/// 28-slot signed checker vector. Index 0 = White tray, 1..24 = points,
/// 25 = White bar, 26 = Black tray, 27 = Black bar. Positive = White,
/// negative = Black.
pub type Board = [i8; 28];

/// A single sub-step within a turn: move the checker at `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub from: usize,
    pub to: usize,
}

/// A committed sub-step, recorded so it can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRecord {
    pub step: Step,
    pub die_used: u8,
    pub was_blot: bool,
}

/// Bar slot for the given mover.
pub fn bar_of(sign: i8) -> usize {
    if sign == WHITE { WHITE_BAR } else { BLACK_BAR }
}

/// Tray (borne-off) slot for the given mover.
pub fn tray_of(sign: i8) -> usize {
    if sign == WHITE { WHITE_TRAY } else { BLACK_TRAY }
}

/// Bar slot for the opponent of the given mover.
pub fn opponent_bar_of(sign: i8) -> usize {
    bar_of(-sign)
}

/// The standard short-backgammon starting position.
///
/// White: 2 on 24, 5 on 13, 3 on 8, 5 on 6.
/// Black: 2 on 1, 5 on 12, 3 on 17, 5 on 19.
pub fn initial_board() -> Board {
    let mut board = [0i8; 28];
    board[24] = 2 * WHITE;
    board[13] = 5 * WHITE;
    board[8] = 3 * WHITE;
    board[6] = 5 * WHITE;
    board[1] = 2 * BLACK;
    board[12] = 5 * BLACK;
    board[17] = 3 * BLACK;
    board[19] = 5 * BLACK;
    board
}

/// Applies a legal step to the board, returning the new vector. Captures a
/// lone opponent checker on the destination (a blot) to the opponent's bar.
/// Assumes the step is legal; callers guarantee this via `enumerate_turns`
/// or `get_move_details`.
pub fn apply_step(board: &Board, step: Step, sign: i8) -> Board {
    let mut next = *board;
    next[step.from] -= sign;
    if step.to == tray_of(sign) {
        next[step.to] += sign;
        return next;
    }
    if next[step.to] == -sign {
        let bar = opponent_bar_of(sign);
        next[bar] -= sign;
        next[step.to] = 0;
    }
    next[step.to] += sign;
    next
}

/// Inverts `apply_step` using the `was_blot` flag to restore a captured
/// opponent checker from the opponent's bar. Returns the reverted board
/// plus the adjusted bear-off counters.
pub fn undo_step(
    board: &Board,
    record: &HistoryRecord,
    sign: i8,
    borne_white: u8,
    borne_black: u8,
) -> (Board, u8, u8) {
    let mut prev = *board;
    let Step { from, to } = record.step;
    let mut borne_white = borne_white;
    let mut borne_black = borne_black;

    if to == tray_of(sign) {
        prev[to] -= sign;
        if sign == WHITE {
            borne_white -= 1;
        } else {
            borne_black -= 1;
        }
    } else {
        prev[to] -= sign;
        if record.was_blot {
            prev[to] -= sign;
            let bar = opponent_bar_of(sign);
            prev[bar] += sign;
        }
    }
    prev[from] += sign;
    (prev, borne_white, borne_black)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_conserves_checkers() {
        let board = initial_board();
        let white: i32 = board.iter().filter(|&&c| c > 0).map(|&c| c as i32).sum();
        let black: i32 = board.iter().filter(|&&c| c < 0).map(|&c| -(c as i32)).sum();
        assert_eq!(white, 15);
        assert_eq!(black, 15);
    }

    #[test]
    fn apply_then_undo_restores_board() {
        let board = initial_board();
        let step = Step { from: 24, to: 18 };
        let applied = apply_step(&board, step, WHITE);
        let record = HistoryRecord {
            step,
            die_used: 6,
            was_blot: false,
        };
        let (reverted, bw, bb) = undo_step(&applied, &record, WHITE, 0, 0);
        assert_eq!(reverted, board);
        assert_eq!((bw, bb), (0, 0));
    }

    #[test]
    fn capturing_a_blot_sends_it_to_the_bar() {
        let mut board = [0i8; 28];
        board[24] = WHITE;
        board[18] = BLACK;
        let step = Step { from: 24, to: 18 };
        let applied = apply_step(&board, step, WHITE);
        assert_eq!(applied[18], WHITE);
        assert_eq!(applied[bar_of(BLACK)], BLACK);
        assert_eq!(applied[24], 0);
    }

    #[test]
    fn undoing_a_capture_restores_the_blot() {
        let mut board = [0i8; 28];
        board[24] = WHITE;
        board[18] = BLACK;
        let step = Step { from: 24, to: 18 };
        let applied = apply_step(&board, step, WHITE);
        let record = HistoryRecord {
            step,
            die_used: 6,
            was_blot: true,
        };
        let (reverted, _, _) = undo_step(&applied, &record, WHITE, 0, 0);
        assert_eq!(reverted, board);
    }

    #[test]
    fn bearing_off_increments_tray_and_undo_decrements_counter() {
        let mut board = [0i8; 28];
        board[1] = WHITE;
        let step = Step {
            from: 1,
            to: tray_of(WHITE),
        };
        let applied = apply_step(&board, step, WHITE);
        assert_eq!(applied[tray_of(WHITE)], WHITE);
        let record = HistoryRecord {
            step,
            die_used: 1,
            was_blot: false,
        };
        let (reverted, bw, _) = undo_step(&applied, &record, WHITE, 1, 0);
        assert_eq!(reverted, board);
        assert_eq!(bw, 0);
    }
}
