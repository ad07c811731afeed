//! Error types for the matchmaking and ranking engine
//!
//! This module defines all error types using anyhow for consistent error
//! handling throughout the application.

use crate::types::{ChannelId, UserId};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific matchmaking and ranking scenarios
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Command invoked outside the ranked arenas: channel {channel_id}")]
    InvalidContext { channel_id: ChannelId },

    #[error("User {user_id} tried to report a match against themselves")]
    SelfReport { user_id: UserId },

    #[error("Reported opponent {user_id} is not a human account")]
    BotOpponent { user_id: UserId },

    #[error("Command is on cooldown, retry in {retry_after_seconds} seconds")]
    OnCooldown { retry_after_seconds: u64 },

    #[error("User {user_id} is not permitted to use this command")]
    NotPermitted { user_id: UserId },

    #[error("Ranking store failure: {message}")]
    StoreFailure { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
