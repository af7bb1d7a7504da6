use bg_core::{BgError, InternalFault};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Environment variable naming the external engine's executable path.
pub const BOT_ENGINE_PATH_VAR: &str = "BOT_ENGINE_PATH";
const DEFAULT_ENGINE_PATH: &str = "gnubg";

/// Spawns a fresh engine process, pipes the fixed command sequence to its
/// stdin, and returns everything printed to stdout. No long-lived engine
/// session is kept across turns: each invocation is a one-shot
/// spawn/communicate, matching the external engine's headless console mode.
pub async fn invoke_engine(commands: &str) -> Result<String, BgError> {
    let path = std::env::var(BOT_ENGINE_PATH_VAR).unwrap_or_else(|_| DEFAULT_ENGINE_PATH.to_string());

    let mut child = Command::new(&path)
        .args(["-t", "-q"])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| BgError::Internal(InternalFault::EngineProcess(e.to_string())))?;

    let mut stdin = child.stdin.take().expect("engine process stdin was piped");
    stdin
        .write_all(commands.as_bytes())
        .await
        .map_err(|e| BgError::Internal(InternalFault::EngineProcess(e.to_string())))?;
    drop(stdin);

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| BgError::Internal(InternalFault::EngineProcess(e.to_string())))?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Builds the fixed gnubg command grammar for one hint request.
pub fn build_commands(match_id: &str, position_id: &str, player_index_console: u8) -> String {
    format!(
        "set matchid {match_id}\nset board {position_id}\nset turn {player_index_console}\nswap players\nhint 1\nexit\n"
    )
}
