use std::time::Duration;

use rand::Rng;

use bg_rules::{apply_step, enumerate_turns, get_move_details, tray_of, winner, Board, HistoryRecord, Step};

use crate::dice::roll_turn;
use crate::event::Event;
use crate::state::{GameState, Phase};
use crate::types::{wire_turns, Recipient, Seat, WireStep};

/// Sink the AI Manager pushes paced, bot-originated notifications onto.
/// Implemented by `bg-hosting`'s Notification Queue so this crate never
/// needs to depend on the hosting layer — the dependency points the
/// other way, same as `bg-rules` staying ignorant of `bg-session`.
pub trait NotificationSink: Send + Sync {
    fn enqueue(&self, recipient: Recipient, event: Event);
}

/// Outcome of replaying the bot's canonical turn, passed back up so the
/// façade can run the shared victory path exactly as a human-originated
/// step would.
pub enum TurnOutcome {
    /// The bot finished its turn without winning; turn has flipped back
    /// to the human and `turn_finished` has already been enqueued.
    Continues,
    /// A winner emerged mid-sequence. Carries the winning sign and the
    /// steps actually played, so `game_over`'s `bot_turn` field can
    /// animate the final ply.
    Won { winner: i8, bot_turn: Vec<WireStep> },
}

/// Asynchronous pipeline with exactly one outstanding request per
/// session (§4.5). The two halves below — `begin_turn` and
/// `apply_turn` — bracket the async gap where the session lock is
/// released: the façade calls `begin_turn` under the lock, drops the
/// lock, sleeps [`think_delay`] then asks `bg_bot::get_bot_turn`, and
/// finally re-acquires the lock to call `apply_turn`.
pub struct AIManager;

impl AIManager {
    /// Rolls the bot's dice, clears history, and snapshots
    /// `(board, dice, bot_sign)` for the caller to hand to the Bot
    /// Adapter once the session lock is released.
    pub fn begin_turn(state: &mut GameState, bot_sign: i8) -> (Board, Vec<u8>) {
        state.history.clear();
        state.dice = roll_turn();
        state.possible_turns = enumerate_turns(&state.board, &state.dice, bot_sign);
        (state.board, state.dice.clone())
    }

    /// A uniform random duration in [0.5, 6.0] seconds, approximating
    /// human pacing before the external engine is invoked.
    pub fn think_delay() -> Duration {
        Duration::from_secs_f64(rand::rng().random_range(0.5..=6.0))
    }

    /// Replays `canonical` (or "no moves" if the adapter returned
    /// `None`) step by step against the current board, enqueueing the
    /// same per-step notification shape a human's `apply_step` would
    /// produce. Stops and reports a winner the instant one appears.
    pub fn apply_turn(
        state: &mut GameState,
        sink: &dyn NotificationSink,
        human_seat: Seat,
        bot_seat: Seat,
        canonical: Option<Vec<Step>>,
    ) -> TurnOutcome {
        // A give-up can race the bot's think delay and finish the game
        // before this callback re-acquires the lock; idempotent against
        // FINISHED like every other victory-path entry point (§5).
        if state.phase == Phase::Finished {
            return TurnOutcome::Continues;
        }

        sink.enqueue(
            Recipient::Seat(human_seat),
            Event::BotDiceRollResult { dice: state.dice.clone(), all_possible_turns: wire_turns(&state.possible_turns) },
        );

        let Some(steps) = canonical else {
            state.dice.clear();
            state.possible_turns.clear();
            state.turn = human_seat.sign();
            sink.enqueue(Recipient::Both, Event::TurnFinished {});
            return TurnOutcome::Continues;
        };

        let bot_sign = bot_seat.sign();
        let mut played = Vec::new();

        for step in steps {
            state.possible_turns = enumerate_turns(&state.board, &state.dice, bot_sign);
            let Some((die_used, was_blot)) = get_move_details(&state.board, &state.dice, bot_sign, step, &state.possible_turns)
            else {
                // The Bot Adapter only ever hands back a sequence it read
                // out of `enumerate_turns` itself; a step it can't replay
                // against this exact board means the board moved under
                // it, which never happens within one session lock hold.
                break;
            };

            state.board = apply_step(&state.board, step, bot_sign);
            if let Some(pos) = state.dice.iter().position(|&d| d == die_used) {
                state.dice.remove(pos);
            }
            state.history.push(HistoryRecord { step, die_used, was_blot });

            let tray = tray_of(bot_sign);
            if step.to == tray {
                if bot_sign == bg_core::WHITE {
                    state.borne_white += 1;
                } else {
                    state.borne_black += 1;
                }
            }

            played.push(WireStep::from(step));
            sink.enqueue(
                Recipient::Seat(human_seat),
                Event::OnOpponentStepExecuted {
                    step: WireStep::from(step),
                    borne_white: state.borne_white,
                    borne_black: state.borne_black,
                    was_blot,
                    board: state.board,
                    is_bot_move: true,
                },
            );

            let result = winner(state.borne_white, state.borne_black);
            if result != 0 {
                state.winner = Some(result);
                state.phase = Phase::Finished;
                state.possible_turns.clear();
                return TurnOutcome::Won { winner: result, bot_turn: played };
            }
        }

        state.dice.clear();
        state.possible_turns.clear();
        state.history.clear();
        state.turn = human_seat.sign();
        sink.enqueue(Recipient::Both, Event::TurnFinished {});
        TurnOutcome::Continues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Mode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(Recipient, Event)>>,
    }

    impl NotificationSink for RecordingSink {
        fn enqueue(&self, recipient: Recipient, event: Event) {
            self.events.lock().unwrap().push((recipient, event));
        }
    }

    #[test]
    fn no_canonical_turn_finishes_turn_back_to_human() {
        let mut state = GameState::new(Mode::Pve { bot_seat: Seat::Black });
        state.turn = Seat::Black.sign();
        state.dice = vec![3, 1];
        let sink = RecordingSink::default();
        let outcome = AIManager::apply_turn(&mut state, &sink, Seat::White, Seat::Black, None);
        assert!(matches!(outcome, TurnOutcome::Continues));
        assert!(state.dice.is_empty());
        assert_eq!(state.turn, Seat::White.sign());
    }

    #[test]
    fn replaying_a_canonical_turn_applies_every_step() {
        let mut state = GameState::new(Mode::Pve { bot_seat: Seat::Black });
        state.turn = Seat::Black.sign();
        state.dice = vec![1, 1, 1, 1];
        let steps = vec![Step { from: 1, to: 2 }, Step { from: 1, to: 2 }];
        let sink = RecordingSink::default();
        let outcome = AIManager::apply_turn(&mut state, &sink, Seat::White, Seat::Black, Some(steps));
        assert!(matches!(outcome, TurnOutcome::Continues));
        assert_eq!(state.turn, Seat::White.sign());
        let step_events = sink.events.lock().unwrap().iter().filter(|(_, e)| matches!(e, Event::OnOpponentStepExecuted { .. })).count();
        assert_eq!(step_events, 2);
    }
}
