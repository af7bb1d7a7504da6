use serde::Deserialize;

use crate::types::WireStep;

/// Messages a client may send over the socket, tagged the same way
/// outbound [`crate::event::Event`]s are: `{"event": "...", "payload": {...}}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum InboundEvent {
    ClientReadyForSync,
    StartPve { bot_level: u8, player_sign: i8 },
    ClientReadyForRoll { game_id: String },
    RequestPlayerRoll,
    SendPlayerStep { step: WireStep },
    RequestUndo,
    SendTurnFinished,
    PlayerGiveUp,
    FindPvpMatch,
    CancelPvpSearch,
    PlayerReady,
}
