use bg_core::{BgError, WHITE};
use bg_rules::{enumerate_turns, Board, Step};

use crate::parse::{convert_coordinates, extract_move_island, parse_gnubg_to_atomic_moves};
use crate::posid::{match_id, player_index_api, player_index_console, position_id};
use crate::process::{build_commands, invoke_engine};

/// Collapses a turn into its reduced form: repeatedly picks a step whose
/// source is not any remaining step's destination as a chain head, then
/// extends it through steps whose source equals the running chain's
/// destination, collapsing each chain into one `{from, final_to}` segment.
pub fn reduce_turn_path(steps: &[Step]) -> Vec<Step> {
    let mut remaining: Vec<Step> = steps.to_vec();
    let mut reduced = Vec::new();

    while !remaining.is_empty() {
        let head_idx = remaining
            .iter()
            .position(|s| !remaining.iter().any(|other| other.to == s.from))
            .unwrap_or(0);
        let mut chain = remaining.remove(head_idx);

        while let Some(next_idx) = remaining.iter().position(|s| s.from == chain.to) {
            let next = remaining.remove(next_idx);
            chain.to = next.to;
        }
        reduced.push(chain);
    }
    reduced
}

fn sorted_by_endpoints(steps: &[Step]) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = steps.iter().map(|s| (s.from, s.to)).collect();
    pairs.sort_unstable();
    pairs
}

/// Matches a parsed atomic move list against the rule engine's enumerated
/// turns in two tries: direct sorted equality, then reduced-chain sorted
/// equality. Returns the matching canonical (unreduced) sequence so the AI
/// Manager can replay it step by step with accurate `was_blot`/bear-off
/// bookkeeping.
pub fn reconcile(parsed: &[Step], enumerated: &[Vec<Step>]) -> Option<Vec<Step>> {
    let parsed_sorted = sorted_by_endpoints(parsed);
    if let Some(seq) = enumerated.iter().find(|seq| sorted_by_endpoints(seq) == parsed_sorted) {
        return Some(seq.clone());
    }

    let parsed_reduced = sorted_by_endpoints(&reduce_turn_path(parsed));
    enumerated
        .iter()
        .find(|seq| sorted_by_endpoints(&reduce_turn_path(seq)) == parsed_reduced)
        .cloned()
}

/// Full pipeline: asks the external engine for a move recommendation on
/// `(board, dice, bot_sign)` and reconciles it against the rule engine's
/// enumeration. Returns `None` when the engine's output cannot be
/// reconciled with any canonical turn — the AI Manager treats this as "bot
/// has no moves" (the hard synchronization failure path of §7).
pub async fn get_bot_turn(board: &Board, dice: &[u8], bot_sign: i8) -> Result<Option<Vec<Step>>, BgError> {
    let possible_turns = enumerate_turns(board, dice, bot_sign);
    if possible_turns.is_empty() {
        return Ok(None);
    }

    let (die1, die2) = (
        dice.first().copied().unwrap_or(0),
        dice.get(1).copied().unwrap_or(dice.first().copied().unwrap_or(0)),
    );
    let pid = position_id(board, bot_sign);
    let mid = match_id(die1, die2, player_index_api(bot_sign));
    let commands = build_commands(&mid, &pid, player_index_console(bot_sign));

    let stdout = invoke_engine(&commands).await?;
    let Some(island) = extract_move_island(&stdout) else {
        log::warn!("bot adapter: engine output had no hinted move, treating as no moves");
        return Ok(None);
    };

    let engine_steps = parse_gnubg_to_atomic_moves(&island);
    let board_steps = if bot_sign == WHITE {
        engine_steps
    } else {
        convert_coordinates(&engine_steps, bot_sign)
    };

    match reconcile(&board_steps, &possible_turns) {
        Some(canonical) => Ok(Some(canonical)),
        None => {
            log::warn!("bot adapter: could not reconcile engine move against rule engine enumeration");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_match_reconciles_without_reduction() {
        let parsed = vec![Step { from: 8, to: 5 }, Step { from: 6, to: 5 }];
        let enumerated = vec![vec![Step { from: 6, to: 5 }, Step { from: 8, to: 5 }]];
        let result = reconcile(&parsed, &enumerated).unwrap();
        assert_eq!(sorted_by_endpoints(&result), sorted_by_endpoints(&parsed));
    }

    #[test]
    fn chained_notation_reduces_to_match_a_single_enumerated_hop() {
        let parsed = vec![Step { from: 24, to: 18 }, Step { from: 18, to: 13 }];
        let enumerated = vec![vec![Step { from: 24, to: 13 }]];
        let result = reconcile(&parsed, &enumerated).unwrap();
        assert_eq!(result, vec![Step { from: 24, to: 13 }]);
    }

    #[test]
    fn unreconcilable_move_yields_none() {
        let parsed = vec![Step { from: 1, to: 2 }];
        let enumerated = vec![vec![Step { from: 24, to: 18 }]];
        assert!(reconcile(&parsed, &enumerated).is_none());
    }
}
