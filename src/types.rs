//! Common types used throughout the matchmaking and ranking engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable numeric identity supplied by the chat platform
pub type UserId = u64;

/// Channel (or thread) identifier on the chat platform
pub type ChannelId = u64;

/// Community/server identifier on the chat platform
pub type GuildId = u64;

/// Role (rank badge) identifier on the chat platform
pub type RoleId = u64;

/// Unique identifier for a match proposal
pub type ProposalId = Uuid;

/// Elo rating scalar
pub type Elo = i64;

/// The matchmaking queue a ping is broadcast into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueType {
    Singles,
    Doubles,
    Funnies,
    Ranked,
}

impl QueueType {
    /// Every queue bucket, in display order
    pub const ALL: [QueueType; 4] = [
        QueueType::Singles,
        QueueType::Doubles,
        QueueType::Funnies,
        QueueType::Ranked,
    ];
}

impl std::fmt::Display for QueueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueType::Singles => write!(f, "Singles"),
            QueueType::Doubles => write!(f, "Doubles"),
            QueueType::Funnies => write!(f, "Funnies"),
            QueueType::Ranked => write!(f, "Ranked"),
        }
    }
}

/// Outcome of a single decided match, from one player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Win,
    Loss,
}

/// A time-bounded "looking for game" broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    pub user_id: UserId,
    pub queue_type: QueueType,
    pub channel_id: ChannelId,
    pub created_at: DateTime<Utc>,
    /// Rank badge of the pinging user at ping time; ranked queue only
    pub tier_role: Option<RoleId>,
}

impl Ping {
    /// Create an unranked ping
    pub fn unranked(
        user_id: UserId,
        queue_type: QueueType,
        channel_id: ChannelId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            queue_type,
            channel_id,
            created_at,
            tier_role: None,
        }
    }

    /// Create a ranked ping carrying the pinger's current tier role
    pub fn ranked(
        user_id: UserId,
        channel_id: ChannelId,
        created_at: DateTime<Utc>,
        tier_role: RoleId,
    ) -> Self {
        Self {
            user_id,
            queue_type: QueueType::Ranked,
            channel_id,
            created_at,
            tier_role: Some(tier_role),
        }
    }
}

/// Per-user persistent ladder record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRanking {
    pub user_id: UserId,
    pub wins: u32,
    pub losses: u32,
    pub elo: Elo,
    /// Full match history, oldest first
    pub history: Vec<MatchOutcome>,
}

impl PlayerRanking {
    /// Starting Elo for a freshly created record
    pub const DEFAULT_ELO: Elo = 1000;

    /// Create a fresh record with default stats
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            wins: 0,
            losses: 0,
            elo: Self::DEFAULT_ELO,
            history: Vec::new(),
        }
    }

    /// Total number of decided matches
    pub fn games(&self) -> u32 {
        self.wins + self.losses
    }

    /// Last `n` outcomes, most recent first
    pub fn recent_history(&self, n: usize) -> Vec<MatchOutcome> {
        self.history.iter().rev().take(n).copied().collect()
    }
}

/// Request to report a decided ranked match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub winner_id: UserId,
    pub loser_id: UserId,
    pub channel_id: ChannelId,
    /// Parent channel when the report came from inside a thread
    pub parent_channel: Option<ChannelId>,
    pub timestamp: DateTime<Utc>,
}

/// Committed result of a confirmed match, as applied to the store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner_id: UserId,
    pub loser_id: UserId,
    pub new_winner_elo: Elo,
    pub new_loser_elo: Elo,
    /// Winner-side rating gain
    pub delta: Elo,
}
