use bg_core::{BgError, InternalFault, FIRST_ROLL_TIE_RETRY_LIMIT};
use bg_rules::enumerate_turns;

use crate::dice::roll_opening_pip;
use crate::event::{Event, Role};
use crate::state::{GameState, Mode, Phase};
use crate::table::Table;
use crate::types::{wire_turns, Recipient, Seat};

/// Owns seat-to-socket mapping, readiness, and the disconnect-timeout
/// state machine described in §4.4. Like [`crate::turn::TurnManager`],
/// every operation is a plain function over `&mut GameState`/`&mut
/// Table` — the façade holds the session lock once per call and passes
/// the guard's contents down.
pub struct PlayerManager;

impl PlayerManager {
    /// `player_ready`. The second ready flips `AWAITING_READY` to
    /// `STARTING_ROLL`, emits `initial_setup` to both seats, and runs
    /// the first-roll routine inline. Returns the combined notifications
    /// plus the seat the AI Manager should drive next, if the bot won
    /// the opening roll.
    pub fn ready(
        state: &mut GameState,
        table: &mut Table,
        sid: Seat,
    ) -> Result<(Vec<(Recipient, Event)>, Option<Seat>), BgError> {
        if state.phase != Phase::AwaitingReady {
            return Err(BgError::rejection("not awaiting ready"));
        }
        if table.occupant(sid).map(|o| o.ready).unwrap_or(false) {
            return Err(BgError::rejection("already ready"));
        }
        table.set_ready(sid);
        if !table.both_ready() {
            return Ok((vec![], None));
        }

        state.phase = Phase::StartingRoll;
        let mut notifications = Vec::new();
        for seat in [Seat::White, Seat::Black] {
            let Some(opponent) = table.occupant(seat.opponent()) else { continue };
            notifications.push((
                Recipient::Seat(seat),
                Event::InitialSetup {
                    white_setup: state.board,
                    black_setup: state.board,
                    opponent_data: crate::event::OpponentData {
                        username: opponent.username.clone(),
                        elo: opponent.elo,
                        icon: opponent.icon.clone(),
                    },
                },
            ));
        }

        let (roll_notifications, bot_to_drive) = Self::first_roll(state, table)?;
        notifications.extend(roll_notifications);
        Ok((notifications, bot_to_drive))
    }

    /// Independent 1..6 rolls for both seats. Ties re-roll internally,
    /// bounded to [`FIRST_ROLL_TIE_RETRY_LIMIT`] attempts before
    /// surfacing a transient fault (§1's supplement over the silent
    /// infinite retry the distillation left unbounded). Transitions
    /// `STARTING_ROLL → PLAYING` on a decisive roll.
    pub fn first_roll(
        state: &mut GameState,
        table: &Table,
    ) -> Result<(Vec<(Recipient, Event)>, Option<Seat>), BgError> {
        let mut notifications = Vec::new();

        for _ in 0..FIRST_ROLL_TIE_RETRY_LIMIT {
            let white_pip = roll_opening_pip();
            let black_pip = roll_opening_pip();
            if white_pip == black_pip {
                notifications.push((
                    Recipient::Both,
                    Event::FirstRollTie { dice: vec![white_pip, black_pip], possible_turns: vec![] },
                ));
                continue;
            }

            let (winner_seat, winner_pip, loser_pip) = if white_pip > black_pip {
                (Seat::White, white_pip, black_pip)
            } else {
                (Seat::Black, black_pip, white_pip)
            };
            state.turn = winner_seat.sign();
            state.dice = vec![winner_pip, loser_pip];
            state.possible_turns = enumerate_turns(&state.board, &state.dice, state.turn);
            state.phase = Phase::Playing;

            match state.mode {
                Mode::Pvp => {
                    notifications.push((
                        Recipient::Seat(winner_seat),
                        Event::DiceRollResult {
                            dice: state.dice.clone(),
                            possible_turns: wire_turns(&state.possible_turns),
                        },
                    ));
                    notifications.push((
                        Recipient::Seat(winner_seat.opponent()),
                        Event::OpponentRollResult { dice: state.dice.clone() },
                    ));
                }
                Mode::Pve { bot_seat } => {
                    let human_seat = bot_seat.opponent();
                    let (player_roll, bot_roll) =
                        if winner_seat == human_seat { (winner_pip, loser_pip) } else { (loser_pip, winner_pip) };
                    notifications.push((
                        Recipient::Seat(human_seat),
                        Event::InitialRollResult {
                            player_roll,
                            bot_roll,
                            first_turn: Role::from(winner_seat),
                            dice: state.dice.clone(),
                        },
                    ));
                }
            }

            let bot_to_drive = if table.is_bot(winner_seat) { Some(winner_seat) } else { None };
            return Ok((notifications, bot_to_drive));
        }

        Err(BgError::Internal(InternalFault::FirstRollExhausted))
    }

    /// Clears `seat`'s socket binding and notifies the remaining human
    /// opponent, if any. Arming the 60s timer itself is the façade's
    /// job — it owns the [`crate::timer::Timer`], which this manager
    /// stays ignorant of (same separation the Turn Manager keeps from
    /// the rule engine's pure functions).
    pub fn disconnect(table: &mut Table, seat: Seat) -> Vec<(Recipient, Event)> {
        table.disconnect(seat);
        let opponent = seat.opponent();
        if table.is_connected(opponent) {
            vec![(Recipient::Seat(opponent), Event::OpponentDisconnected {})]
        } else {
            vec![]
        }
    }

    /// The seat a reconnecting `username` may rebind to, or `None` if no
    /// seat is both seated under that username and currently empty.
    pub fn seat_for_rejoin(table: &Table, username: &str) -> Option<Seat> {
        let seat = table.seat_of_username(username)?;
        if table.is_connected(seat) {
            None
        } else {
            Some(seat)
        }
    }

    /// Rebinds `seat` to `socket_id` and emits `game_restored` plus a
    /// `full_game_sync` snapshot; notifies the opponent if still
    /// present. `can_undo` mirrors [`GameState::can_undo`] gated on it
    /// actually being the rejoining seat's turn.
    pub fn rejoin(state: &GameState, table: &mut Table, seat: Seat, socket_id: impl Into<String>) -> Vec<(Recipient, Event)> {
        table.reconnect(seat, socket_id);
        let can_undo = state.turn == seat.sign() && state.can_undo();

        let mut notifications = vec![
            (Recipient::Seat(seat), Event::GameRestored {}),
            (
                Recipient::Seat(seat),
                Event::FullGameSync {
                    board: state.board,
                    dice: state.dice.clone(),
                    possible_turns: wire_turns(&state.possible_turns),
                    turn: state.turn,
                    borne_white: state.borne_white,
                    borne_black: state.borne_black,
                    can_undo,
                    white_ready: table.occupant(Seat::White).map(|o| o.ready).unwrap_or(false),
                    black_ready: table.occupant(Seat::Black).map(|o| o.ready).unwrap_or(false),
                },
            ),
        ];

        let opponent = seat.opponent();
        if table.is_connected(opponent) && !table.is_bot(opponent) {
            notifications.push((Recipient::Seat(opponent), Event::OpponentReconnected {}));
        }
        notifications
    }

    /// The seat that should be declared the winner when `empty_seat`'s
    /// disconnect timer expires without a rejoin, or `None` if both
    /// seats are empty (the session is simply destroyed with no
    /// `game_over`).
    pub fn timeout_winner(table: &Table, empty_seat: Seat) -> Option<Seat> {
        let opponent = empty_seat.opponent();
        if table.is_connected(opponent) || table.is_bot(opponent) {
            Some(opponent)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Occupant;

    fn seated_table() -> Table {
        let mut table = Table::new();
        table.seat(Seat::White, Occupant::human("alice", 1000, "default.png"));
        table.seat(Seat::Black, Occupant::human("bob", 1000, "default.png"));
        table
    }

    #[test]
    fn first_ready_does_not_transition_phase() {
        let mut state = GameState::new(Mode::Pvp);
        state.phase = Phase::AwaitingReady;
        let mut table = seated_table();
        let (notifications, bot) = PlayerManager::ready(&mut state, &mut table, Seat::White).unwrap();
        assert!(notifications.is_empty());
        assert!(bot.is_none());
        assert_eq!(state.phase, Phase::AwaitingReady);
    }

    #[test]
    fn second_ready_transitions_to_playing_after_first_roll() {
        let mut state = GameState::new(Mode::Pvp);
        state.phase = Phase::AwaitingReady;
        let mut table = seated_table();
        PlayerManager::ready(&mut state, &mut table, Seat::White).unwrap();
        let (notifications, _) = PlayerManager::ready(&mut state, &mut table, Seat::Black).unwrap();
        assert!(!notifications.is_empty());
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.dice.len(), 2);
    }

    #[test]
    fn readying_twice_is_rejected() {
        let mut state = GameState::new(Mode::Pvp);
        state.phase = Phase::AwaitingReady;
        let mut table = seated_table();
        PlayerManager::ready(&mut state, &mut table, Seat::White).unwrap();
        assert!(PlayerManager::ready(&mut state, &mut table, Seat::White).is_err());
    }

    #[test]
    fn rejoin_reports_can_undo_only_on_own_turn_with_history() {
        let mut state = GameState::new(Mode::Pvp);
        state.phase = Phase::Playing;
        state.turn = Seat::White.sign();
        state.history.push(bg_rules::HistoryRecord {
            step: bg_rules::Step { from: 24, to: 18 },
            die_used: 6,
            was_blot: false,
        });
        let mut table = seated_table();

        let white_notifications = PlayerManager::rejoin(&state, &mut table, Seat::White, "sock-w");
        let sync = white_notifications
            .iter()
            .find_map(|(_, e)| if let Event::FullGameSync { can_undo, .. } = e { Some(*can_undo) } else { None })
            .unwrap();
        assert!(sync);

        let black_notifications = PlayerManager::rejoin(&state, &mut table, Seat::Black, "sock-b");
        let sync = black_notifications
            .iter()
            .find_map(|(_, e)| if let Event::FullGameSync { can_undo, .. } = e { Some(*can_undo) } else { None })
            .unwrap();
        assert!(!sync);
    }

    #[test]
    fn timeout_winner_is_none_when_both_seats_empty() {
        let table = Table::new();
        assert!(PlayerManager::timeout_winner(&table, Seat::White).is_none());
    }

    #[test]
    fn timeout_winner_is_opponent_when_present() {
        let mut table = Table::new();
        table.seat(Seat::Black, Occupant::human("bob", 1000, "default.png"));
        table.reconnect(Seat::Black, "sock-b");
        assert_eq!(PlayerManager::timeout_winner(&table, Seat::White), Some(Seat::Black));
    }
}
