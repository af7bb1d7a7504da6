//! Adapter to the external move-selection engine (GNU Backgammon, headless).
//!
//! Stateless: encodes a position, invokes a fresh child process with a
//! fixed command grammar, parses the hinted move, and reconciles it
//! against [`bg_rules::enumerate_turns`] so only canonical turns are ever
//! committed to a session's board.

mod adapter;
mod parse;
mod posid;
mod process;

pub use adapter::{get_bot_turn, reconcile, reduce_turn_path};
pub use parse::{convert_coordinates, extract_move_island, parse_gnubg_to_atomic_moves};
pub use posid::{match_id, player_index_api, player_index_console, position_id};
pub use process::{build_commands, invoke_engine, BOT_ENGINE_PATH_VAR};
