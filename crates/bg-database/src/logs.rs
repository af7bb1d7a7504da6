use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use bg_core::{BgError, InternalFault};

/// Append-only JSON-lines stats log. One line per finished game, matching
/// the original service's `log_match_stats`. Writes serialize through a
/// single file mutex, per the concurrency model's "stats and log writes
/// serialize through their own file mutex."
pub struct StatsLog {
    file: Mutex<File>,
}

/// A single finished-game stats record.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MatchStats {
    pub game_id: String,
    pub winner: String,
    pub loser: String,
    pub reason: Option<String>,
    pub elo_delta_winner: i32,
    pub elo_delta_loser: i32,
    pub currency_delta_winner: i32,
}

impl StatsLog {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, BgError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BgError::Internal(InternalFault::Io(e)))?;
        Ok(Self { file: Mutex::new(file) })
    }

    pub fn record(&self, stats: &MatchStats) -> Result<(), BgError> {
        let line = serde_json::to_string(stats).expect("MatchStats always serializes");
        let mut file = self.file.lock().expect("stats log mutex poisoned");
        writeln!(file, "{line}").map_err(|e| BgError::Internal(InternalFault::Io(e)))
    }
}

/// Append-only plain-text events log, matching the original service's
/// `log_event_to_file`.
pub struct EventsLog {
    file: Mutex<File>,
}

impl EventsLog {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, BgError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BgError::Internal(InternalFault::Io(e)))?;
        Ok(Self { file: Mutex::new(file) })
    }

    /// Appends one formatted event line. Callers format `[timestamp]
    /// [TYPE: ...] [User: ...] ... | message` themselves; this just owns
    /// the mutex around the append.
    pub fn append(&self, line: &str) -> Result<(), BgError> {
        let mut file = self.file.lock().expect("events log mutex poisoned");
        writeln!(file, "{line}").map_err(|e| BgError::Internal(InternalFault::Io(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_log_appends_valid_json_lines() {
        let dir = std::env::temp_dir().join(format!("bg-stats-test-{}", std::process::id()));
        let log = StatsLog::open(&dir).unwrap();
        log.record(&MatchStats {
            game_id: "g1".into(),
            winner: "alice".into(),
            loser: "bob".into(),
            reason: None,
            elo_delta_winner: 1,
            elo_delta_loser: -1,
            currency_delta_winner: 10,
        })
        .unwrap();
        let contents = std::fs::read_to_string(&dir).unwrap();
        assert!(contents.contains("\"winner\":\"alice\""));
        std::fs::remove_file(&dir).ok();
    }
}
