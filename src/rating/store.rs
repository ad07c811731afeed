//! Ladder record storage interface and in-memory implementation
//!
//! Records are created lazily with defaults on first touch; the commit of a
//! confirmed match updates both participants as one logical unit.

use crate::error::Result;
use crate::types::{Elo, MatchOutcome, MatchResult, PlayerRanking, UserId};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Trait for ladder record storage operations
pub trait RankingStore: Send + Sync {
    /// Get a user's ladder record, if one exists
    fn get(&self, user_id: UserId) -> Result<Option<PlayerRanking>>;

    /// Get a user's ladder record, creating a default one if absent
    ///
    /// This is the single creation point for ladder records; every caller
    /// shares the same defaults.
    fn get_or_create(&self, user_id: UserId) -> Result<PlayerRanking>;

    /// Commit a confirmed match: both sides' wins/losses/elo/history are
    /// updated as one logical unit, both-or-neither
    fn apply_result(&self, result: &MatchResult) -> Result<()>;

    /// Top `n` records by Elo, descending
    fn top(&self, n: usize) -> Result<Vec<PlayerRanking>>;
}

/// In-memory ladder record storage
#[derive(Debug)]
pub struct InMemoryRankingStore {
    rows: RwLock<HashMap<UserId, PlayerRanking>>,
    default_elo: Elo,
}

impl InMemoryRankingStore {
    /// Create a store with the given starting Elo for new records
    pub fn new(default_elo: Elo) -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            default_elo,
        }
    }
}

impl Default for InMemoryRankingStore {
    fn default() -> Self {
        Self::new(PlayerRanking::DEFAULT_ELO)
    }
}

impl RankingStore for InMemoryRankingStore {
    fn get(&self, user_id: UserId) -> Result<Option<PlayerRanking>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire ranking read lock".to_string(),
            })?;

        Ok(rows.get(&user_id).cloned())
    }

    fn get_or_create(&self, user_id: UserId) -> Result<PlayerRanking> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire ranking write lock".to_string(),
            })?;

        let row = rows.entry(user_id).or_insert_with(|| {
            debug!("Creating ladder record for user {}", user_id);
            let mut fresh = PlayerRanking::new(user_id);
            fresh.elo = self.default_elo;
            fresh
        });

        Ok(row.clone())
    }

    fn apply_result(&self, result: &MatchResult) -> Result<()> {
        if result.winner_id == result.loser_id {
            return Err(crate::error::ArenaError::StoreFailure {
                message: format!(
                    "Refusing to commit a match of user {} against themselves",
                    result.winner_id
                ),
            }
            .into());
        }

        // One write lock spans both row updates, so a failure cannot leave
        // the winner committed without the loser.
        let mut rows = self
            .rows
            .write()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire ranking write lock".to_string(),
            })?;

        let winner = rows
            .entry(result.winner_id)
            .or_insert_with(|| PlayerRanking::new(result.winner_id));
        winner.wins += 1;
        winner.elo = result.new_winner_elo;
        winner.history.push(MatchOutcome::Win);

        let loser = rows
            .entry(result.loser_id)
            .or_insert_with(|| PlayerRanking::new(result.loser_id));
        loser.losses += 1;
        loser.elo = result.new_loser_elo;
        loser.history.push(MatchOutcome::Loss);

        Ok(())
    }

    fn top(&self, n: usize) -> Result<Vec<PlayerRanking>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire ranking read lock".to_string(),
            })?;

        let mut rankings: Vec<PlayerRanking> = rows.values().cloned().collect();
        rankings.sort_by(|a, b| b.elo.cmp(&a.elo));
        rankings.truncate(n);

        Ok(rankings)
    }
}
