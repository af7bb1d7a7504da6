use bg_rules::{bar_of, Board};
use base64::Engine;

use bg_core::WHITE;

/// Orders a side's own 24 points from their ace point (nearest bear-off)
/// to their 24-point (farthest), in global board coordinates.
fn relative_points(sign: i8) -> Vec<usize> {
    if sign == WHITE {
        (1..=24).collect()
    } else {
        (1..=24).rev().collect()
    }
}

fn encode_section(bits: &mut Vec<u8>, board: &Board, sign: i8) {
    for point in relative_points(sign) {
        let n = if board[point] * sign > 0 { board[point].unsigned_abs() } else { 0 };
        bits.extend(std::iter::repeat(1u8).take(n as usize));
        bits.push(0);
    }
    let bar = bar_of(sign);
    let n = board[bar].unsigned_abs();
    bits.extend(std::iter::repeat(1u8).take(n as usize));
    bits.push(0);
}

/// Encodes a board into the external engine's 14-character position
/// identifier, from the given mover's perspective.
///
/// Layout: the opponent's points (opponent-relative order) and bar, then
/// the mover's points (mover-relative order) and bar, packed into 80 bits
/// padded with zeros, grouped into 10 bytes (each byte's bits read
/// least-significant-first), then base64-encoded with trailing `=`
/// stripped.
pub fn position_id(board: &Board, mover_sign: i8) -> String {
    let opponent_sign = -mover_sign;
    let mut bits = Vec::with_capacity(80);
    encode_section(&mut bits, board, opponent_sign);
    encode_section(&mut bits, board, mover_sign);

    debug_assert!(
        bits.len() <= 80,
        "legal position exceeded 80 bits before padding: {}",
        bits.len()
    );
    bits.resize(80, 0);

    let mut bytes = [0u8; 10];
    for (i, chunk) in bits.chunks(8).enumerate() {
        let mut byte = 0u8;
        for (j, &bit) in chunk.iter().enumerate() {
            byte |= bit << j;
        }
        bytes[i] = byte;
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    encoded.trim_end_matches('=').to_string()
}

/// Encodes the fixed-rules-no-cube match state into the external engine's
/// 12-character match identifier. Only the dice pair and the on-roll flag
/// vary; cube value/owner, Crawford, game state, score, and match length
/// are pinned to this server's single-game, no-cube ruleset.
pub fn match_id(die1: u8, die2: u8, on_roll: u8) -> String {
    const CUBE_VALUE_LOG2: u128 = 0;
    const CUBE_OWNER: u128 = 3;
    const CRAWFORD: u128 = 0;
    const GAME_STATE: u128 = 1;
    const DOUBLE_OFFERED: u128 = 0;
    const RESIGN_OFFERED: u128 = 0;
    const MATCH_LENGTH: u128 = 0;
    const SCORE0: u128 = 0;
    const SCORE1: u128 = 0;
    const JACOBY_OFF: u128 = 0;

    let mut bits: u128 = 0;
    bits |= CUBE_VALUE_LOG2 << 0;
    bits |= CUBE_OWNER << 4;
    bits |= (on_roll as u128) << 6;
    bits |= CRAWFORD << 7;
    bits |= GAME_STATE << 8;
    bits |= (on_roll as u128) << 11; // turn_to_move mirrors on_roll
    bits |= DOUBLE_OFFERED << 12;
    bits |= RESIGN_OFFERED << 13;
    bits |= (die1 as u128) << 15;
    bits |= (die2 as u128) << 18;
    bits |= MATCH_LENGTH << 21;
    bits |= SCORE0 << 36;
    bits |= SCORE1 << 51;
    bits |= JACOBY_OFF << 66;

    let raw = bits.to_le_bytes();
    base64::engine::general_purpose::STANDARD.encode(&raw[0..9])
}

/// Maps the API-style on-roll flag (0 for White, 1 for Black) used in the
/// match identifier.
pub fn player_index_api(bot_sign: i8) -> u8 {
    if bot_sign == WHITE { 0 } else { 1 }
}

/// Maps the console `set turn` command's player index, which uses the
/// opposite convention from the match identifier's on-roll flag.
pub fn player_index_console(bot_sign: i8) -> u8 {
    if bot_sign == WHITE { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_rules::initial_board;

    #[test]
    fn position_id_is_deterministic() {
        let board = initial_board();
        let a = position_id(&board, WHITE);
        let b = position_id(&board, WHITE);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_boards_encode_differently() {
        let board = initial_board();
        let mut other = board;
        other[24] -= WHITE;
        other[23] += WHITE;
        assert_ne!(position_id(&board, WHITE), position_id(&other, WHITE));
    }

    #[test]
    fn match_id_is_twelve_characters_with_no_padding() {
        let mid = match_id(3, 1, 0);
        assert_eq!(mid.len(), 12);
        assert!(!mid.contains('='));
    }

    #[test]
    fn player_index_conventions_are_opposite() {
        assert_ne!(player_index_api(WHITE), player_index_console(WHITE));
        assert_ne!(player_index_api(-WHITE), player_index_console(-WHITE));
    }
}
