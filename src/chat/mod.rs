//! Chat platform collaborator interfaces
//!
//! The engine never touches the chat platform's object graph directly. It
//! consumes two boundary contracts: a messenger (post messages, observe a
//! matching message within a deadline, open threads) and an identity/role
//! provider (grant/revoke rank badges, resolve operator and bot accounts).

pub mod inprocess;

use crate::error::Result;
use crate::types::{ChannelId, GuildId, RoleId, UserId};
use async_trait::async_trait;
use std::time::Duration;

// Re-export commonly used types
pub use inprocess::{InMemoryRoleProvider, InProcessMessenger};

/// A message observed on the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: UserId,
    pub channel_id: ChannelId,
    pub content: String,
}

/// Predicate for a timed message subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFilter {
    pub channel_id: ChannelId,
    pub author: UserId,
    /// Case-insensitive token the message must equal after trimming
    pub token: String,
}

impl MessageFilter {
    /// Filter for the confirmation acknowledgement token
    pub fn acknowledgement(channel_id: ChannelId, author: UserId, token: &str) -> Self {
        Self {
            channel_id,
            author,
            token: token.to_string(),
        }
    }

    /// Whether a message satisfies this filter
    pub fn matches(&self, message: &ChatMessage) -> bool {
        message.channel_id == self.channel_id
            && message.author == self.author
            && message.content.trim().eq_ignore_ascii_case(&self.token)
    }
}

/// Choice made on the stats prompt reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionChoice {
    /// Grant the tier badge even with few games played
    OptIn,
    /// Strip all tier badges until the next match
    OptOut,
}

/// Messaging collaborator
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post a message into a channel
    async fn post(&self, channel_id: ChannelId, content: &str) -> Result<()>;

    /// Timed subscription: resolve to the first message matching `filter`,
    /// or `None` once `timeout` elapses
    async fn await_message(
        &self,
        filter: MessageFilter,
        timeout: Duration,
    ) -> Result<Option<ChatMessage>>;

    /// Timed reaction prompt: resolve to the user's choice, or `None` once
    /// `timeout` elapses
    async fn await_reaction(
        &self,
        channel_id: ChannelId,
        from: UserId,
        timeout: Duration,
    ) -> Result<Option<ReactionChoice>>;

    /// Open a short-lived sub-conversation from a ping announcement
    async fn create_thread(&self, channel_id: ChannelId, name: &str) -> Result<ChannelId>;
}

/// Identity and role collaborator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleProvider: Send + Sync {
    /// Grant a rank badge to a user within a community
    async fn grant_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()>;

    /// Revoke a set of rank badges from a user within a community
    async fn revoke_roles(&self, guild: GuildId, user: UserId, roles: &[RoleId]) -> Result<()>;

    /// List a user's current roles within a community
    async fn user_roles(&self, guild: GuildId, user: UserId) -> Result<Vec<RoleId>>;

    /// Whether the user holds operator (moderation) privileges
    async fn is_operator(&self, guild: GuildId, user: UserId) -> Result<bool>;

    /// Whether the account is a non-human actor
    async fn is_bot(&self, user: UserId) -> Result<bool>;
}
