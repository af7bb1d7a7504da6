use crate::board::{tray_of, Board, Step};
use crate::generate::single_moves;

/// Validates a single sub-step against the current possible turns and
/// determines which die it consumes and whether it captures a blot.
///
/// Returns `None` if no enumerated sequence begins with `step`.
pub fn get_move_details(
    board: &Board,
    dice: &[u8],
    sign: i8,
    step: Step,
    possible_turns: &[Vec<Step>],
) -> Option<(u8, bool)> {
    let valid = possible_turns.iter().any(|seq| seq.first() == Some(&step));
    if !valid {
        return None;
    }

    let mut distinct = dice.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    let die_used = distinct
        .into_iter()
        .find(|&d| single_moves(board, sign, d).contains(&step))?;

    let was_blot = step.to != tray_of(sign) && board[step.to] * sign == -1;
    Some((die_used, was_blot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::initial_board;
    use crate::generate::enumerate_turns;
    use bg_core::WHITE;

    #[test]
    fn valid_first_step_reports_die_and_blot_flag() {
        let board = initial_board();
        let dice = [6, 5];
        let turns = enumerate_turns(&board, &dice, WHITE);
        let step = Step { from: 24, to: 18 };
        let (die, was_blot) = get_move_details(&board, &dice, WHITE, step, &turns).unwrap();
        assert_eq!(die, 6);
        assert!(!was_blot);
    }

    #[test]
    fn step_not_among_possible_turns_is_invalid() {
        let board = initial_board();
        let dice = [6, 5];
        let turns = enumerate_turns(&board, &dice, WHITE);
        let bogus = Step { from: 1, to: 2 };
        assert!(get_move_details(&board, &dice, WHITE, bogus, &turns).is_none());
    }
}
