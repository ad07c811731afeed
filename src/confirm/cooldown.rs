//! Per-user command cooldowns
//!
//! Each reporting command carries its own cooldown per invoking user,
//! independent of the confirmation state machine. Guard rejections refund
//! the cooldown so an invalid invocation does not count against the user.

use crate::error::Result;
use crate::types::UserId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Command family a cooldown applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownKind {
    /// Report and force-report commands
    Report,
    /// Opening a ranked ping
    RankedPing,
}

/// Result of a cooldown acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownCheck {
    /// Cooldown acquired; the command may proceed
    Ready,
    /// Still cooling down
    Cooling { retry_after_seconds: u64 },
}

/// Tracks per-user, per-command cooldowns
#[derive(Debug)]
pub struct CooldownTracker {
    report_window: Duration,
    ranked_ping_window: Duration,
    last_used: RwLock<HashMap<(UserId, CooldownKind), DateTime<Utc>>>,
}

impl CooldownTracker {
    pub fn new(report_seconds: u64, ranked_ping_seconds: u64) -> Self {
        Self {
            report_window: Duration::seconds(report_seconds as i64),
            ranked_ping_window: Duration::seconds(ranked_ping_seconds as i64),
            last_used: RwLock::new(HashMap::new()),
        }
    }

    fn window(&self, kind: CooldownKind) -> Duration {
        match kind {
            CooldownKind::Report => self.report_window,
            CooldownKind::RankedPing => self.ranked_ping_window,
        }
    }

    /// Attempt to start the cooldown window for a command invocation
    pub fn try_acquire(
        &self,
        user: UserId,
        kind: CooldownKind,
        now: DateTime<Utc>,
    ) -> Result<CooldownCheck> {
        let mut last_used =
            self.last_used
                .write()
                .map_err(|_| crate::error::ArenaError::InternalError {
                    message: "Failed to acquire cooldown write lock".to_string(),
                })?;

        if let Some(last) = last_used.get(&(user, kind)) {
            let elapsed = now - *last;
            let window = self.window(kind);
            if elapsed < window {
                let retry_after_seconds = (window - elapsed).num_seconds().max(1) as u64;
                return Ok(CooldownCheck::Cooling {
                    retry_after_seconds,
                });
            }
        }

        last_used.insert((user, kind), now);
        Ok(CooldownCheck::Ready)
    }

    /// Refund a previously acquired cooldown (guard rejections)
    pub fn refund(&self, user: UserId, kind: CooldownKind) -> Result<()> {
        let mut last_used =
            self.last_used
                .write()
                .map_err(|_| crate::error::ArenaError::InternalError {
                    message: "Failed to acquire cooldown write lock".to_string(),
                })?;

        if last_used.remove(&(user, kind)).is_some() {
            debug!("Refunded {:?} cooldown for user {}", kind, user);
        }
        Ok(())
    }
}
