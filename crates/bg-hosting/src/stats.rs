use std::sync::Arc;

use tokio_postgres::Client;

use bg_auth::AuthRepository;
use bg_core::{ELO_PENALTY_LOSS, ELO_REWARD_WIN, MONEY_REWARD_WIN};
use bg_database::{MatchStats, StatsLog};
use bg_session::SessionId;

/// Awards the victory path's Elo/currency deltas and appends the match
/// to the stats log (§4.3, §4.9). The reward failing to persist never
/// blocks the game from reporting a winner to the players — it's logged
/// and swallowed, matching [`bg_session::StatsCollaborator::award`]'s
/// `()` return.
pub struct DbStats {
    db: Arc<Client>,
    stats_log: Arc<StatsLog>,
}

impl DbStats {
    pub fn new(db: Arc<Client>, stats_log: Arc<StatsLog>) -> Self {
        Self { db, stats_log }
    }
}

#[async_trait::async_trait]
impl bg_session::StatsCollaborator for DbStats {
    async fn award(&self, game_id: SessionId, winner: &str, loser: &str, reason: Option<&str>) {
        if let Err(err) = self.db.apply_rewards(winner, ELO_REWARD_WIN, MONEY_REWARD_WIN).await {
            log::error!("failed to award winner {winner} for game {game_id}: {err}");
        }
        if let Err(err) = self.db.apply_rewards(loser, ELO_PENALTY_LOSS, 0).await {
            log::error!("failed to penalize loser {loser} for game {game_id}: {err}");
        }

        let stats = MatchStats {
            game_id: game_id.to_string(),
            winner: winner.to_string(),
            loser: loser.to_string(),
            reason: reason.map(str::to_string),
            elo_delta_winner: ELO_REWARD_WIN,
            elo_delta_loser: ELO_PENALTY_LOSS,
            currency_delta_winner: MONEY_REWARD_WIN,
        };
        if let Err(err) = self.stats_log.record(&stats) {
            log::error!("failed to record match stats for game {game_id}: {err}");
        }
        log::info!("game {game_id} finished: {winner} beat {loser}");
    }
}
