//! In-process collaborator implementations
//!
//! These back the collaborator traits with in-memory state and tokio
//! broadcast channels. They power the standalone binary and the test
//! suites; a production embedding would supply chat-platform-backed
//! implementations instead.

use crate::chat::{ChatMessage, MessageFilter, Messenger, ReactionChoice, RoleProvider};
use crate::error::Result;
use crate::types::{ChannelId, GuildId, RoleId, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

/// Messenger backed by tokio broadcast channels
///
/// Messages and reactions injected through [`InProcessMessenger::inject_message`]
/// and [`InProcessMessenger::inject_reaction`] are delivered to any pending
/// timed subscription, which is how tests script the opponent's
/// acknowledgement.
#[derive(Debug)]
pub struct InProcessMessenger {
    messages: broadcast::Sender<ChatMessage>,
    reactions: broadcast::Sender<(ChannelId, UserId, ReactionChoice)>,
    posted: Mutex<Vec<(ChannelId, String)>>,
    next_thread_id: AtomicU64,
}

impl InProcessMessenger {
    pub fn new() -> Self {
        let (messages, _) = broadcast::channel(64);
        let (reactions, _) = broadcast::channel(64);
        Self {
            messages,
            reactions,
            posted: Mutex::new(Vec::new()),
            next_thread_id: AtomicU64::new(1_000_000),
        }
    }

    /// Deliver a message to any pending subscription
    pub fn inject_message(&self, message: ChatMessage) {
        // No receiver just means nothing is waiting
        let _ = self.messages.send(message);
    }

    /// Deliver a reaction to any pending prompt
    pub fn inject_reaction(&self, channel_id: ChannelId, from: UserId, choice: ReactionChoice) {
        let _ = self.reactions.send((channel_id, from, choice));
    }

    /// Everything posted so far, in order
    pub fn posted_messages(&self) -> Vec<(ChannelId, String)> {
        self.posted
            .lock()
            .map(|posted| posted.clone())
            .unwrap_or_default()
    }
}

impl Default for InProcessMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for InProcessMessenger {
    async fn post(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        debug!("Posting to channel {}: {}", channel_id, content);
        self.posted
            .lock()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire posted-message lock".to_string(),
            })?
            .push((channel_id, content.to_string()));
        Ok(())
    }

    async fn await_message(
        &self,
        filter: MessageFilter,
        timeout: Duration,
    ) -> Result<Option<ChatMessage>> {
        let mut receiver = self.messages.subscribe();

        let wait = async {
            loop {
                match receiver.recv().await {
                    Ok(message) if filter.matches(&message) => break Some(message),
                    Ok(_) => continue,
                    // Lagged subscribers skip ahead; a closed channel ends the wait
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break None,
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(message) => Ok(message),
            Err(_) => Ok(None),
        }
    }

    async fn await_reaction(
        &self,
        channel_id: ChannelId,
        from: UserId,
        timeout: Duration,
    ) -> Result<Option<ReactionChoice>> {
        let mut receiver = self.reactions.subscribe();

        let wait = async {
            loop {
                match receiver.recv().await {
                    Ok((channel, user, choice)) if channel == channel_id && user == from => {
                        break Some(choice)
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break None,
                }
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(choice) => Ok(choice),
            Err(_) => Ok(None),
        }
    }

    async fn create_thread(&self, channel_id: ChannelId, name: &str) -> Result<ChannelId> {
        let thread_id = self.next_thread_id.fetch_add(1, Ordering::SeqCst);
        debug!(
            "Opened thread {} ({}) under channel {}",
            thread_id, name, channel_id
        );
        Ok(thread_id)
    }
}

/// Role provider backed by in-memory maps
#[derive(Debug, Default)]
pub struct InMemoryRoleProvider {
    roles: RwLock<HashMap<(GuildId, UserId), HashSet<RoleId>>>,
    operators: RwLock<HashSet<UserId>>,
    bots: RwLock<HashSet<UserId>>,
}

impl InMemoryRoleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user as an operator
    pub fn add_operator(&self, user: UserId) {
        if let Ok(mut operators) = self.operators.write() {
            operators.insert(user);
        }
    }

    /// Mark an account as a non-human actor
    pub fn add_bot(&self, user: UserId) {
        if let Ok(mut bots) = self.bots.write() {
            bots.insert(user);
        }
    }
}

#[async_trait]
impl RoleProvider for InMemoryRoleProvider {
    async fn grant_role(&self, guild: GuildId, user: UserId, role: RoleId) -> Result<()> {
        let mut roles = self
            .roles
            .write()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire role write lock".to_string(),
            })?;

        roles.entry((guild, user)).or_default().insert(role);
        Ok(())
    }

    async fn revoke_roles(&self, guild: GuildId, user: UserId, revoked: &[RoleId]) -> Result<()> {
        let mut roles = self
            .roles
            .write()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire role write lock".to_string(),
            })?;

        if let Some(held) = roles.get_mut(&(guild, user)) {
            for role in revoked {
                held.remove(role);
            }
        }
        Ok(())
    }

    async fn user_roles(&self, guild: GuildId, user: UserId) -> Result<Vec<RoleId>> {
        let roles = self
            .roles
            .read()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire role read lock".to_string(),
            })?;

        Ok(roles
            .get(&(guild, user))
            .map(|held| held.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn is_operator(&self, guild: GuildId, user: UserId) -> Result<bool> {
        let _ = guild;
        let operators =
            self.operators
                .read()
                .map_err(|_| crate::error::ArenaError::InternalError {
                    message: "Failed to acquire operator read lock".to_string(),
                })?;

        Ok(operators.contains(&user))
    }

    async fn is_bot(&self, user: UserId) -> Result<bool> {
        let bots = self
            .bots
            .read()
            .map_err(|_| crate::error::ArenaError::InternalError {
                message: "Failed to acquire bot read lock".to_string(),
            })?;

        Ok(bots.contains(&user))
    }
}
