use serde::Serialize;

use bg_rules::Board;

use crate::types::{Recipient, Seat, WireStep};

#[derive(Debug, Clone, Serialize)]
pub struct OpponentData {
    pub username: String,
    pub elo: i32,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    White,
    Black,
}

impl From<Seat> for Role {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::White => Role::White,
            Seat::Black => Role::Black,
        }
    }
}

/// Every event this server ever pushes to a client, tagged so the wire
/// shape is always `{"type": "...", "payload": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    ProfileDataUpdate {
        username: String,
        elo: i32,
        money: i32,
        diamonds: i32,
        icon: String,
    },
    GameCreated {
        game_id: String,
    },
    InitialSetup {
        white_setup: Board,
        black_setup: Board,
        opponent_data: OpponentData,
    },
    FirstRollTie {
        dice: Vec<u8>,
        possible_turns: Vec<Vec<WireStep>>,
    },
    InitialRollResult {
        player_roll: u8,
        bot_roll: u8,
        first_turn: Role,
        dice: Vec<u8>,
    },
    DiceRollResult {
        dice: Vec<u8>,
        possible_turns: Vec<Vec<WireStep>>,
    },
    OpponentRollResult {
        dice: Vec<u8>,
    },
    BotDiceRollResult {
        dice: Vec<u8>,
        all_possible_turns: Vec<Vec<WireStep>>,
    },
    StepAccepted {
        dice: Vec<u8>,
        possible_turns: Vec<Vec<WireStep>>,
        can_undo: bool,
        borne_white: u8,
        borne_black: u8,
        board: Board,
    },
    OpponentStepExecuted {
        step: WireStep,
        borne_white: u8,
        borne_black: u8,
        was_blot: bool,
        board: Board,
    },
    OnOpponentStepExecuted {
        step: WireStep,
        borne_white: u8,
        borne_black: u8,
        was_blot: bool,
        board: Board,
        is_bot_move: bool,
    },
    UndoAccepted {
        dice: Vec<u8>,
        possible_turns: Vec<Vec<WireStep>>,
        board: Board,
        borne_white: u8,
        borne_black: u8,
    },
    OpponentUndoExecuted {
        board: Board,
        borne_white: u8,
        borne_black: u8,
    },
    TurnFinished {},
    GameOver {
        winner: i8,
        reason: Option<String>,
        bot_turn: Option<Vec<WireStep>>,
    },
    OpponentDisconnected {},
    OpponentReconnected {},
    OpponentTimeoutVictory {},
    GameRestored {},
    FullGameSync {
        board: Board,
        dice: Vec<u8>,
        possible_turns: Vec<Vec<WireStep>>,
        turn: i8,
        borne_white: u8,
        borne_black: u8,
        can_undo: bool,
        white_ready: bool,
        black_ready: bool,
    },
    MatchFound {
        game_id: String,
        role: Role,
        opponent_data: OpponentData,
    },
    SearchingMatch {},
    SearchCancelled {},
    MatchmakingRejected {
        message: String,
    },
    /// Sent to the surviving socket of a pairing attempt when the other
    /// side's profile lookup failed (§4.6) — the survivor has been
    /// pushed back onto the matchmaking queue and should keep waiting.
    MatchFailedRequeued {
        message: String,
    },
    MoveRejection {
        message: String,
    },
    AuthFailed {
        message: String,
    },
}

/// An [`Event`] paired with who should receive it, queued for delivery
/// by the notification consumer so bot-originated traffic can be paced.
#[derive(Debug, Clone)]
pub struct Notification {
    pub recipient: Recipient,
    pub event: Event,
}

impl Notification {
    pub fn new(recipient: Recipient, event: Event) -> Self {
        Self { recipient, event }
    }

    pub fn is_bot_step(&self) -> bool {
        matches!(self.event, Event::OnOpponentStepExecuted { is_bot_move: true, .. })
    }

    pub fn is_bot_dice_roll(&self) -> bool {
        matches!(self.event, Event::BotDiceRollResult { .. })
    }
}
