//! Tier badge reconciliation
//!
//! Decides whether a user's externally visible rank badge must change after
//! a stat update, and performs the strip-and-regrant through the role
//! collaborator.

use crate::chat::RoleProvider;
use crate::error::Result;
use crate::rating::RankingStore;
use crate::tiers::table::{Tier, TierTable};
use crate::types::{GuildId, RoleId, UserId};
use std::sync::Arc;
use tracing::{debug, info};

/// Assigns and reconciles tier badges
pub struct TierAssigner {
    table: Arc<TierTable>,
    store: Arc<dyn RankingStore>,
    roles: Arc<dyn RoleProvider>,
}

impl TierAssigner {
    pub fn new(
        table: Arc<TierTable>,
        store: Arc<dyn RankingStore>,
        roles: Arc<dyn RoleProvider>,
    ) -> Self {
        Self {
            table,
            store,
            roles,
        }
    }

    /// The tier table backing this assigner
    pub fn table(&self) -> &TierTable {
        &self.table
    }

    /// The tier a ranked ping should carry for this user
    ///
    /// Users without a ladder record are treated as holding the default
    /// middle band.
    pub fn ping_tier(&self, user: UserId) -> Result<Tier> {
        Ok(match self.store.get(user)? {
            Some(row) => self.table.current_tier(row.elo),
            None => self.table.default_tier(),
        })
    }

    /// Roles a ranked ping from this tier should notify: the tier itself
    /// plus its neighbors, clipped at the ladder ends
    pub fn audience_roles(&self, tier: Tier) -> Vec<RoleId> {
        self.table
            .adjacent_tiers(tier)
            .into_iter()
            .map(|adjacent| adjacent.role)
            .collect()
    }

    /// Recompute and, if needed, regrant a user's tier badge
    ///
    /// No change happens below `threshold` games. When the badge is stale,
    /// all tier roles are stripped and the single correct one granted.
    /// Returns whether a role change was performed.
    pub async fn reconcile(&self, guild: GuildId, user: UserId, threshold: u32) -> Result<bool> {
        let Some(row) = self.store.get(user)? else {
            debug!("No ladder record for user {}, skipping reconcile", user);
            return Ok(false);
        };

        if row.games() < threshold {
            debug!(
                "User {} has {} games, below threshold {}, keeping roles as-is",
                user,
                row.games(),
                threshold
            );
            return Ok(false);
        }

        let tier = self.table.current_tier(row.elo);
        let held = self.roles.user_roles(guild, user).await?;
        if held.contains(&tier.role) {
            return Ok(false);
        }

        self.roles
            .revoke_roles(guild, user, &self.table.all_roles())
            .await?;
        self.roles.grant_role(guild, user, tier.role).await?;

        info!(
            "Updated tier badge of user {} to tier {} (elo {})",
            user, tier.ordinal, row.elo
        );
        Ok(true)
    }

    /// Strip all tier badges regardless of games played
    pub async fn opt_out(&self, guild: GuildId, user: UserId) -> Result<()> {
        self.roles
            .revoke_roles(guild, user, &self.table.all_roles())
            .await?;
        info!("User {} opted out of tier badges", user);
        Ok(())
    }
}
