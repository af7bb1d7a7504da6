use bg_core::BgError;
use bg_rules::{apply_step, are_moves_available, enumerate_turns, get_move_details, undo_step, winner, Step};

use crate::dice::roll_turn;
use crate::event::Event;
use crate::state::{GameState, Phase};
use crate::types::{wire_turns, Recipient, Seat, WireStep};

/// Stateless orchestration over a session's [`GameState`]: every
/// operation takes `&mut GameState` and returns the notifications the
/// caller (holding the session lock) should enqueue. No manager here
/// owns its own lock — the façade acquires the session mutex once per
/// call and passes the guard's contents down as plain arguments.
pub struct TurnManager;

impl TurnManager {
    /// `request_player_roll`. Fails if it isn't `sid`'s turn, the game
    /// isn't playing, or dice are already rolled.
    pub fn roll_dice(state: &mut GameState, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        if state.phase != Phase::Playing {
            return Err(BgError::rejection("game is not in progress"));
        }
        if state.turn != sid.sign() {
            return Err(BgError::rejection("not your turn"));
        }
        if !state.dice.is_empty() || !state.history.is_empty() {
            return Err(BgError::rejection("dice already rolled this turn"));
        }

        let dice = roll_turn();
        state.possible_turns = enumerate_turns(&state.board, &dice, state.turn);
        state.dice = dice.clone();

        if !are_moves_available(&state.possible_turns) {
            state.dice.clear();
            state.possible_turns.clear();
            state.turn = -state.turn;
            return Ok(vec![
                (Recipient::Seat(sid), Event::DiceRollResult { dice: dice.clone(), possible_turns: vec![] }),
                (Recipient::Seat(sid.opponent()), Event::OpponentRollResult { dice: dice.clone() }),
                (Recipient::Both, Event::TurnFinished {}),
            ]);
        }

        Ok(vec![
            (
                Recipient::Seat(sid),
                Event::DiceRollResult { dice: dice.clone(), possible_turns: wire_turns(&state.possible_turns) },
            ),
            (Recipient::Seat(sid.opponent()), Event::OpponentRollResult { dice }),
        ])
    }

    /// `send_player_step`. Validates, commits the board mutation,
    /// recomputes `possible_turns`, and checks for an immediate winner.
    pub fn apply_step(
        state: &mut GameState,
        sid: Seat,
        step: WireStep,
    ) -> Result<Vec<(Recipient, Event)>, BgError> {
        if state.phase != Phase::Playing {
            return Err(BgError::rejection("game is not in progress"));
        }
        if state.turn != sid.sign() {
            return Err(BgError::rejection("not your turn"));
        }
        let step: Step = step.into();
        let (die_used, was_blot) =
            get_move_details(&state.board, &state.dice, state.turn, step, &state.possible_turns)
                .ok_or_else(|| BgError::rejection("illegal step"))?;

        state.board = apply_step(&state.board, step, state.turn);
        if let Some(pos) = state.dice.iter().position(|&d| d == die_used) {
            state.dice.remove(pos);
        }
        state.history.push(bg_rules::HistoryRecord { step, die_used, was_blot });

        let tray = bg_rules::tray_of(state.turn);
        if step.to == tray {
            if state.turn == bg_core::WHITE {
                state.borne_white += 1;
            } else {
                state.borne_black += 1;
            }
        }
        state.possible_turns = enumerate_turns(&state.board, &state.dice, state.turn);

        if let Some(notifications) = Self::check_winner(state, sid)? {
            return Ok(notifications);
        }

        let wire_step = WireStep::from(step);
        Ok(vec![
            (
                Recipient::Seat(sid),
                Event::StepAccepted {
                    dice: state.dice.clone(),
                    possible_turns: wire_turns(&state.possible_turns),
                    can_undo: state.can_undo(),
                    borne_white: state.borne_white,
                    borne_black: state.borne_black,
                    board: state.board,
                },
            ),
            (
                Recipient::Seat(sid.opponent()),
                Event::OpponentStepExecuted {
                    step: wire_step,
                    borne_white: state.borne_white,
                    borne_black: state.borne_black,
                    was_blot,
                    board: state.board,
                },
            ),
        ])
    }

    /// `request_undo`. Pops the last history record and inverts it.
    pub fn undo(state: &mut GameState, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        if state.phase != Phase::Playing {
            return Err(BgError::rejection("game is not in progress"));
        }
        if state.turn != sid.sign() {
            return Err(BgError::rejection("not your turn"));
        }
        let record = state.history.pop().ok_or_else(|| BgError::rejection("nothing to undo"))?;

        let (board, borne_white, borne_black) =
            undo_step(&state.board, &record, state.turn, state.borne_white, state.borne_black);
        state.board = board;
        state.borne_white = borne_white;
        state.borne_black = borne_black;
        state.dice.push(record.die_used);
        state.dice.sort_unstable_by(|a, b| b.cmp(a));
        state.possible_turns = enumerate_turns(&state.board, &state.dice, state.turn);

        Ok(vec![
            (
                Recipient::Seat(sid),
                Event::UndoAccepted {
                    dice: state.dice.clone(),
                    possible_turns: wire_turns(&state.possible_turns),
                    board: state.board,
                    borne_white: state.borne_white,
                    borne_black: state.borne_black,
                },
            ),
            (
                Recipient::Seat(sid.opponent()),
                Event::OpponentUndoExecuted {
                    board: state.board,
                    borne_white: state.borne_white,
                    borne_black: state.borne_black,
                },
            ),
        ])
    }

    /// `send_turn_finished`. Rejects if moves remain unplayed; otherwise
    /// checks for a winner, then flips the turn and clears per-turn state.
    pub fn finalize_turn(state: &mut GameState, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        if state.phase != Phase::Playing {
            return Err(BgError::rejection("game is not in progress"));
        }
        if state.turn != sid.sign() {
            return Err(BgError::rejection("not your turn"));
        }
        if are_moves_available(&state.possible_turns) {
            return Err(BgError::rejection("you must play all available moves"));
        }

        if let Some(notifications) = Self::check_winner(state, sid)? {
            return Ok(notifications);
        }

        state.dice.clear();
        state.possible_turns.clear();
        state.history.clear();
        state.turn = -state.turn;

        Ok(vec![(Recipient::Both, Event::TurnFinished {})])
    }

    /// `player_give_up`. The giving-up side always loses, regardless of
    /// board state.
    pub fn give_up(state: &mut GameState, sid: Seat) -> Result<Vec<(Recipient, Event)>, BgError> {
        if state.phase == Phase::Finished {
            return Ok(vec![]);
        }
        state.winner = Some(sid.opponent().sign());
        state.phase = Phase::Finished;
        Ok(vec![(
            Recipient::Both,
            Event::GameOver { winner: sid.opponent().sign(), reason: Some("opponent gave up".to_string()), bot_turn: None },
        )])
    }

    /// Checks `state` for a winner and, if found, transitions to
    /// `Finished` and returns the `game_over` notification. The
    /// `Finished` check itself gates re-entry: a session already
    /// finished never re-credits a second victory.
    fn check_winner(state: &mut GameState, _sid: Seat) -> Result<Option<Vec<(Recipient, Event)>>, BgError> {
        if state.phase == Phase::Finished {
            return Ok(Some(vec![]));
        }
        let result = winner(state.borne_white, state.borne_black);
        if result == 0 {
            return Ok(None);
        }
        state.winner = Some(result);
        state.phase = Phase::Finished;
        Ok(Some(vec![(Recipient::Both, Event::GameOver { winner: result, reason: None, bot_turn: None })]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_out_of_turn_is_rejected() {
        let mut state = GameState::default();
        state.phase = Phase::Playing;
        state.turn = bg_core::WHITE;
        assert!(TurnManager::roll_dice(&mut state, Seat::Black).is_err());
    }

    #[test]
    fn double_roll_yields_four_dice() {
        let mut state = GameState::default();
        state.phase = Phase::Playing;
        state.turn = bg_core::WHITE;
        // Force a deterministic outcome isn't possible without injecting
        // the rng; instead assert the invariant that holds regardless of
        // the roll: dice length is always 2 or 4.
        let _ = TurnManager::roll_dice(&mut state, Seat::White);
        assert!(state.dice.len() == 2 || state.dice.len() == 4 || state.dice.is_empty());
    }

    #[test]
    fn finishing_turn_with_moves_left_is_rejected() {
        let mut state = GameState::default();
        state.phase = Phase::Playing;
        state.turn = bg_core::WHITE;
        state.possible_turns = vec![vec![Step { from: 24, to: 18 }]];
        assert!(TurnManager::finalize_turn(&mut state, Seat::White).is_err());
    }

    #[test]
    fn give_up_is_idempotent_once_finished() {
        let mut state = GameState::default();
        state.phase = Phase::Playing;
        let first = TurnManager::give_up(&mut state, Seat::White).unwrap();
        assert!(!first.is_empty());
        assert_eq!(state.phase, Phase::Finished);

        let second = TurnManager::give_up(&mut state, Seat::Black).unwrap();
        assert!(second.is_empty());
        assert_eq!(state.winner, Some(Seat::Black.sign()));
    }
}
