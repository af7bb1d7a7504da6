use crate::board::{apply_step, bar_of, tray_of, Board, Step};
use bg_core::WHITE;

/// Whether every checker the mover owns sits within their home board.
fn all_in_home(board: &Board, sign: i8) -> bool {
    let home: std::ops::RangeInclusive<usize> = if sign == WHITE { 1..=6 } else { 19..=24 };
    for point in 1..=24usize {
        if board[point] * sign > 0 && !home.contains(&point) {
            return false;
        }
    }
    true
}

/// Distance from `point` to bearing off, for the given mover.
fn distance_from_home_edge(sign: i8, point: usize) -> u8 {
    if sign == WHITE {
        point as u8
    } else {
        (25 - point) as u8
    }
}

/// True iff no mover checker sits strictly farther from home than `point`.
fn no_farther_checker(board: &Board, sign: i8, point: usize) -> bool {
    if sign == WHITE {
        ((point + 1)..=6).all(|p| board[p] * sign <= 0)
    } else {
        (19..point).all(|p| board[p] * sign <= 0)
    }
}

/// True iff `to` may legally receive a mover checker: empty, mover-owned,
/// or a lone opponent blot.
fn destination_open(board: &Board, sign: i8, to: usize) -> bool {
    let occupant = board[to];
    occupant == 0 || occupant * sign > 0 || occupant == -sign
}

/// All single-step moves for one remaining die `d`, for the given mover.
/// Enforces bar-first: if the mover has a checker on the bar, only the
/// bar-entry step is considered.
pub fn single_moves(board: &Board, sign: i8, die: u8) -> Vec<Step> {
    let bar = bar_of(sign);
    if board[bar] != 0 {
        let to = if sign == WHITE {
            25 - die as usize
        } else {
            die as usize
        };
        return if (1..=24).contains(&to) && destination_open(board, sign, to) {
            vec![Step { from: bar, to }]
        } else {
            Vec::new()
        };
    }

    let mut moves = Vec::new();
    let home_and_beyond = all_in_home(board, sign);
    for from in 1..=24usize {
        if board[from] * sign <= 0 {
            continue;
        }
        let raw_to = from as i32 - (die as i32) * (sign as i32);
        if (1..=24).contains(&raw_to) {
            let to = raw_to as usize;
            if destination_open(board, sign, to) {
                moves.push(Step { from, to });
            }
            continue;
        }
        if !home_and_beyond {
            continue;
        }
        let exact = distance_from_home_edge(sign, from) == die;
        let farthest = no_farther_checker(board, sign, from);
        if exact || farthest {
            moves.push(Step {
                from,
                to: tray_of(sign),
            });
        }
    }
    moves
}

/// Recursively explores every reachable sequence of single steps over the
/// remaining dice multiset, via iterative deepening: at each node, every
/// distinct remaining die value is tried, and a node with no legal
/// continuation becomes a leaf sequence.
fn explore(board: Board, dice: Vec<u8>, sign: i8, path: Vec<Step>, out: &mut Vec<Vec<Step>>) {
    let mut distinct = dice.clone();
    distinct.sort_unstable();
    distinct.dedup();

    let mut branched = false;
    for die in distinct {
        for mv in single_moves(&board, sign, die) {
            let mut remaining = dice.clone();
            let idx = remaining.iter().position(|&d| d == die).expect("die present");
            remaining.remove(idx);
            let next_board = apply_step(&board, mv, sign);
            let mut next_path = path.clone();
            next_path.push(mv);
            explore(next_board, remaining, sign, next_path, out);
            branched = true;
        }
    }
    if !branched {
        out.push(path);
    }
}

/// Returns the set of full legal turn sequences for `(board, dice, sign)`,
/// applying the three canonical constraints: play maximum, play the larger
/// die when only one die is playable, and bar-first (enforced implicitly
/// by `single_moves`).
pub fn enumerate_turns(board: &Board, dice: &[u8], sign: i8) -> Vec<Vec<Step>> {
    let mut raw = Vec::new();
    explore(*board, dice.to_vec(), sign, Vec::new(), &mut raw);

    let max_len = raw.iter().map(Vec::len).max().unwrap_or(0);
    if max_len == 0 {
        return Vec::new();
    }
    let mut sequences: Vec<Vec<Step>> = raw.into_iter().filter(|seq| seq.len() == max_len).collect();
    dedup_sequences(&mut sequences);

    let mut distinct_dice = dice.to_vec();
    distinct_dice.sort_unstable();
    distinct_dice.dedup();
    let is_double = dice.len() == 4 || distinct_dice.len() == 1;
    if dice.len() == 2 && !is_double && max_len == 1 {
        let larger = dice.iter().max().copied().unwrap();
        let larger_is_playable = sequences
            .iter()
            .any(|seq| !seq.is_empty() && single_moves(board, sign, larger).contains(&seq[0]));
        if larger_is_playable {
            sequences.retain(|seq| !seq.is_empty() && single_moves(board, sign, larger).contains(&seq[0]));
        }
    }

    sequences
}

fn dedup_sequences(sequences: &mut Vec<Vec<Step>>) {
    let mut seen: Vec<Vec<(usize, usize)>> = Vec::new();
    sequences.retain(|seq| {
        let key: Vec<(usize, usize)> = seq.iter().map(|s| (s.from, s.to)).collect();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::initial_board;

    #[test]
    fn opening_roll_six_five_plays_both_dice() {
        let board = initial_board();
        let turns = enumerate_turns(&board, &[6, 5], WHITE);
        assert!(turns.iter().all(|t| t.len() == 2));
        assert!(turns.contains(&vec![
            Step { from: 24, to: 18 },
            Step { from: 18, to: 13 },
        ]));
    }

    #[test]
    fn forced_larger_die_excludes_sequences_using_the_smaller_pip() {
        // Construct a position where only the 4 is playable from any point,
        // and the 2 cannot be played from any starting point.
        let mut board = [0i8; 28];
        board[24] = WHITE;
        board[20] = -WHITE * 0; // no-op filler kept for clarity
        board[22] = -1; // black blot blocks the 2 (24-2=22) would be a hit, so make the 2 illegal another way
        // Block every destination for pip 2 except keep pip 4 open.
        for p in 1..=24 {
            if p == 20 {
                board[p] = 0;
            }
        }
        // Black owns a made point (2+) at 22 so White's pip-2 move (24->22) is blocked,
        // while White's pip-4 move (24->20) lands on an empty point.
        board[22] = -2;
        let turns = enumerate_turns(&board, &[2, 4], WHITE);
        for turn in &turns {
            assert!(!(turn.len() == 1 && turn[0] == Step { from: 24, to: 22 }));
        }
    }

    #[test]
    fn bar_reentry_hits_a_blot_and_excludes_blocked_points() {
        let mut board = [0i8; 28];
        board[bar_of(WHITE)] = WHITE;
        board[22] = -1;
        board[24] = -2;
        let turns = enumerate_turns(&board, &[3, 1], WHITE);
        let first_steps: Vec<Step> = turns.iter().filter_map(|t| t.first().copied()).collect();
        assert!(first_steps.contains(&Step {
            from: bar_of(WHITE),
            to: 22
        }));
        assert!(!first_steps.contains(&Step {
            from: bar_of(WHITE),
            to: 24
        }));
    }

    #[test]
    fn bear_off_with_overshoot_uses_farthest_checker() {
        let mut board = [0i8; 28];
        board[3] = WHITE;
        board[2] = WHITE;
        board[1] = 3 * WHITE;
        let turns = enumerate_turns(&board, &[6, 1], WHITE);
        assert!(turns.iter().any(|t| t.contains(&Step {
            from: 3,
            to: tray_of(WHITE)
        })));
        assert!(!turns.iter().any(|t| t.contains(&Step {
            from: 2,
            to: tray_of(WHITE)
        }) && t.len() == 2
            && t.contains(&Step {
                from: 3,
                to: tray_of(WHITE)
            })));
    }

    #[test]
    fn doubles_yield_four_entry_dice_and_length_capped_sequences() {
        let board = initial_board();
        let turns = enumerate_turns(&board, &[5, 5, 5, 5], WHITE);
        assert!(!turns.is_empty());
        let max_len = turns.iter().map(Vec::len).max().unwrap();
        assert!(max_len <= 4);
        assert!(turns.iter().all(|t| t.len() == max_len));
    }
}
