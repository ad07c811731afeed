//! Ping registry interface and in-memory implementation
//!
//! Pings are keyed by `(user_id, queue_type)`: re-pinging the same queue
//! overwrites the previous ping and refreshes its timestamp. Expiry is
//! enforced lazily at list time; a periodic sweep may additionally reclaim
//! stale entries for memory hygiene.

use crate::error::Result;
use crate::types::{Ping, QueueType, UserId};
use crate::utils::minutes_ago;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info, warn};

/// A visible ping together with its display age
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentPing {
    pub ping: Ping,
    /// Age rounded to the nearest whole minute, for display
    pub minutes_ago: i64,
}

impl std::fmt::Display for RecentPing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "user {} in channel {}, {} minutes ago",
            self.ping.user_id, self.ping.channel_id, self.minutes_ago
        )
    }
}

/// Result of listing a queue bucket
///
/// An empty filter result is a distinct case so callers can render a
/// friendly placeholder instead of an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecentPings {
    /// Visible pings, most recently created first
    Entries(Vec<RecentPing>),
    /// No ping in this bucket is inside the visibility window
    NoneRecent,
}

impl RecentPings {
    /// Entries if any are visible
    pub fn entries(&self) -> Option<&[RecentPing]> {
        match self {
            RecentPings::Entries(entries) => Some(entries),
            RecentPings::NoneRecent => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RecentPings::NoneRecent)
    }
}

/// Trait for ping registry operations
pub trait PingRegistry: Send + Sync {
    /// Upsert a ping keyed by `(user_id, queue_type)`
    fn add(&self, ping: Ping) -> Result<()>;

    /// List all pings of a queue type still inside the visibility window,
    /// most recently created first
    fn list(&self, queue_type: QueueType, now: DateTime<Utc>) -> Result<RecentPings>;

    /// Delete a ping if present; removing an absent ping is a logged no-op
    fn remove(&self, user_id: UserId, queue_type: QueueType) -> Result<bool>;

    /// Empty one queue-type bucket, returning how many pings were dropped
    fn clear_all(&self, queue_type: QueueType) -> Result<usize>;

    /// Empty every queue-type bucket (startup hygiene and admin reset)
    fn clear_everything(&self) -> Result<()>;

    /// Drop entries already outside the visibility window
    fn sweep(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// In-memory ping registry implementation
#[derive(Debug)]
pub struct InMemoryPingRegistry {
    buckets: RwLock<HashMap<QueueType, HashMap<UserId, Ping>>>,
    visibility: Duration,
}

impl InMemoryPingRegistry {
    /// Create a registry with the given visibility window
    pub fn new(visibility: Duration) -> Self {
        let mut buckets = HashMap::new();
        for queue_type in QueueType::ALL {
            buckets.insert(queue_type, HashMap::new());
        }

        Self {
            buckets: RwLock::new(buckets),
            visibility,
        }
    }

    fn is_visible(&self, ping: &Ping, now: DateTime<Utc>) -> bool {
        now - ping.created_at < self.visibility
    }
}

impl Default for InMemoryPingRegistry {
    fn default() -> Self {
        Self::new(Duration::minutes(30))
    }
}

impl PingRegistry for InMemoryPingRegistry {
    fn add(&self, ping: Ping) -> Result<()> {
        let mut buckets =
            self.buckets
                .write()
                .map_err(|_| crate::error::ArenaError::InternalError {
                    message: "Failed to acquire ping bucket write lock".to_string(),
                })?;

        let bucket = buckets.entry(ping.queue_type).or_default();
        // Last write wins: a re-ping refreshes the user's signal
        if bucket.insert(ping.user_id, ping.clone()).is_some() {
            debug!(
                "Overwrote existing {} ping for user {}",
                ping.queue_type, ping.user_id
            );
        }

        Ok(())
    }

    fn list(&self, queue_type: QueueType, now: DateTime<Utc>) -> Result<RecentPings> {
        let buckets =
            self.buckets
                .read()
                .map_err(|_| crate::error::ArenaError::InternalError {
                    message: "Failed to acquire ping bucket read lock".to_string(),
                })?;

        let mut visible: Vec<RecentPing> = buckets
            .get(&queue_type)
            .into_iter()
            .flat_map(|bucket| bucket.values())
            .filter(|ping| self.is_visible(ping, now))
            .map(|ping| RecentPing {
                ping: ping.clone(),
                minutes_ago: minutes_ago(now, ping.created_at),
            })
            .collect();

        if visible.is_empty() {
            return Ok(RecentPings::NoneRecent);
        }

        // Most recently created first
        visible.sort_by(|a, b| b.ping.created_at.cmp(&a.ping.created_at));

        Ok(RecentPings::Entries(visible))
    }

    fn remove(&self, user_id: UserId, queue_type: QueueType) -> Result<bool> {
        let mut buckets =
            self.buckets
                .write()
                .map_err(|_| crate::error::ArenaError::InternalError {
                    message: "Failed to acquire ping bucket write lock".to_string(),
                })?;

        let removed = buckets
            .get_mut(&queue_type)
            .and_then(|bucket| bucket.remove(&user_id))
            .is_some();

        if !removed {
            warn!(
                "Tried to delete a {} ping for user {} but it was already gone",
                queue_type, user_id
            );
        }

        Ok(removed)
    }

    fn clear_all(&self, queue_type: QueueType) -> Result<usize> {
        let mut buckets =
            self.buckets
                .write()
                .map_err(|_| crate::error::ArenaError::InternalError {
                    message: "Failed to acquire ping bucket write lock".to_string(),
                })?;

        let dropped = buckets
            .get_mut(&queue_type)
            .map(|bucket| {
                let count = bucket.len();
                bucket.clear();
                count
            })
            .unwrap_or(0);

        info!("Cleared {} pings from the {} bucket", dropped, queue_type);
        Ok(dropped)
    }

    fn clear_everything(&self) -> Result<()> {
        for queue_type in QueueType::ALL {
            self.clear_all(queue_type)?;
        }
        Ok(())
    }

    fn sweep(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut buckets =
            self.buckets
                .write()
                .map_err(|_| crate::error::ArenaError::InternalError {
                    message: "Failed to acquire ping bucket write lock".to_string(),
                })?;

        let mut swept = 0;
        for bucket in buckets.values_mut() {
            let before = bucket.len();
            bucket.retain(|_, ping| now - ping.created_at < self.visibility);
            swept += before - bucket.len();
        }

        if swept > 0 {
            debug!("Swept {} stale pings", swept);
        }

        Ok(swept)
    }
}
