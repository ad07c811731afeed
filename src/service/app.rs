//! Arena service: component wiring and command-facing operations
//!
//! The hosting application's command layer calls into this service; the
//! service owns the registry, store, tier assigner and confirmation flow,
//! and talks to the chat platform only through the collaborator traits.

use crate::chat::{Messenger, ReactionChoice, RoleProvider};
use crate::confirm::{CooldownCheck, CooldownKind, CooldownTracker, MatchConfirmation, ReportOutcome};
use crate::config::AppConfig;
use crate::error::{ArenaError, Result};
use crate::pings::{InMemoryPingRegistry, PingRegistry, RecentPings};
use crate::rating::{InMemoryRankingStore, RankingStore};
use crate::tiers::{TierAssigner, TierTable};
use crate::types::{
    ChannelId, GuildId, MatchOutcome, MatchReport, Ping, PlayerRanking, QueueType, RoleId, UserId,
};
use crate::utils::current_timestamp;
use std::sync::Arc;
use tokio::time::interval;
use tracing::{info, warn};

/// Result of a ranked ping attempt
#[derive(Debug, Clone)]
pub enum RankedPingOutcome {
    /// The ping was stored and announced
    Opened {
        /// Recent ranked pings including the fresh one
        listing: RecentPings,
        /// Tier roles the announcement should notify
        audience: Vec<RoleId>,
        /// Thread opened under the announcement
        thread: ChannelId,
    },
    /// Still cooling down; the caller gets the current listing instead
    OnCooldown {
        retry_after_seconds: u64,
        listing: RecentPings,
    },
}

/// A user's ladder stats for display
#[derive(Debug, Clone)]
pub struct RankStats {
    pub ranking: PlayerRanking,
    /// Last five outcomes, most recent first
    pub recent: Vec<MatchOutcome>,
}

/// The assembled matchmaking/ranking engine
pub struct ArenaService {
    config: AppConfig,
    registry: Arc<dyn PingRegistry>,
    store: Arc<dyn RankingStore>,
    assigner: Arc<TierAssigner>,
    confirmation: Arc<MatchConfirmation>,
    messenger: Arc<dyn Messenger>,
    cooldowns: Arc<CooldownTracker>,
}

impl ArenaService {
    /// Wire up the engine from configuration and the two collaborators
    ///
    /// Clears every ping bucket as startup hygiene, like the reference
    /// deployment does after a restart.
    pub fn new(
        config: AppConfig,
        messenger: Arc<dyn Messenger>,
        roles: Arc<dyn RoleProvider>,
    ) -> Result<Self> {
        let registry: Arc<dyn PingRegistry> =
            Arc::new(InMemoryPingRegistry::new(config.ping_visibility()));
        let store: Arc<dyn RankingStore> =
            Arc::new(InMemoryRankingStore::new(config.rating.default_elo));
        let table = Arc::new(TierTable::new(&config.ranked.tier_roles)?);
        let assigner = Arc::new(TierAssigner::new(table, store.clone(), roles.clone()));
        let cooldowns = Arc::new(CooldownTracker::new(
            config.ranked.report_cooldown_seconds,
            config.pings.ranked_cooldown_seconds,
        ));

        let confirmation = Arc::new(MatchConfirmation::new(
            config.ranked.clone(),
            &config.rating,
            store.clone(),
            assigner.clone(),
            messenger.clone(),
            roles,
            cooldowns.clone(),
        )?);

        info!("Starting to delete pings in the matchmaking buckets...");
        registry.clear_everything()?;

        Ok(Self {
            config,
            registry,
            store,
            assigner,
            confirmation,
            messenger,
            cooldowns,
        })
    }

    /// The ping registry (admin and test access)
    pub fn ping_registry(&self) -> Arc<dyn PingRegistry> {
        self.registry.clone()
    }

    /// The ladder store (admin and test access)
    pub fn ranking_store(&self) -> Arc<dyn RankingStore> {
        self.store.clone()
    }

    /// Open a ping in one of the informal queues and return the current
    /// listing for that queue
    pub async fn unranked_ping(
        &self,
        user: UserId,
        queue_type: QueueType,
        channel: ChannelId,
    ) -> Result<RecentPings> {
        if queue_type == QueueType::Ranked {
            return Err(ArenaError::InternalError {
                message: "Ranked pings must go through the ranked ping flow".to_string(),
            }
            .into());
        }

        let now = current_timestamp();
        self.registry
            .add(Ping::unranked(user, queue_type, channel, now))?;
        self.registry.list(queue_type, now)
    }

    /// Open a ranked ping: store it with the user's tier, announce it to
    /// the adjacent tier roles, and open a discussion thread
    pub async fn ranked_ping(&self, user: UserId, channel: ChannelId) -> Result<RankedPingOutcome> {
        let now = current_timestamp();

        if let CooldownCheck::Cooling {
            retry_after_seconds,
        } = self
            .cooldowns
            .try_acquire(user, CooldownKind::RankedPing, now)?
        {
            // Cooled-down users still get to see who pinged recently
            let listing = self.registry.list(QueueType::Ranked, now)?;
            return Ok(RankedPingOutcome::OnCooldown {
                retry_after_seconds,
                listing,
            });
        }

        if !self.config.ranked.arena_channels.contains(&channel) {
            self.cooldowns.refund(user, CooldownKind::RankedPing)?;
            return Err(ArenaError::InvalidContext {
                channel_id: channel,
            }
            .into());
        }

        let tier = self.assigner.ping_tier(user)?;
        self.registry
            .add(Ping::ranked(user, channel, now, tier.role))?;

        let listing = self.registry.list(QueueType::Ranked, now)?;
        let audience = self.assigner.audience_roles(tier);

        let mentions: String = audience
            .iter()
            .map(|role| format!(" <@&{}>", role))
            .collect();
        self.messenger
            .post(
                channel,
                &format!(
                    "<@{}> is looking for ranked matchmaking games!{}",
                    user, mentions
                ),
            )
            .await?;

        let thread = self
            .messenger
            .create_thread(channel, &format!("Ranked Arena of {}", user))
            .await?;
        self.messenger
            .post(
                thread,
                &format!(
                    "Hi there, <@{}>! Please use this thread for communicating \
                     with your opponent and for reporting matches.",
                    user
                ),
            )
            .await?;

        // The listing filter already hides stale pings; this reclaims the
        // entry once the visibility window has passed.
        let registry = self.registry.clone();
        let visibility = self.config.ping_visibility();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(
                visibility.num_seconds().max(0) as u64,
            ))
            .await;
            if let Err(error) = registry.remove(user, QueueType::Ranked) {
                warn!("Failed to reclaim expired ranked ping: {}", error);
            }
        });

        Ok(RankedPingOutcome::Opened {
            listing,
            audience,
            thread,
        })
    }

    /// Recent pings of one queue type
    pub fn recent_pings(&self, queue_type: QueueType) -> Result<RecentPings> {
        self.registry.list(queue_type, current_timestamp())
    }

    /// Explicitly delete a user's ping; absent pings are absorbed
    pub fn remove_ping(&self, user: UserId, queue_type: QueueType) -> Result<bool> {
        self.registry.remove(user, queue_type)
    }

    /// Administrative reset of every ping bucket
    pub fn clear_pings(&self) -> Result<()> {
        self.registry.clear_everything()
    }

    /// Top 10 ladder records by Elo
    pub fn leaderboard(&self) -> Result<Vec<PlayerRanking>> {
        self.store.top(10)
    }

    /// The winner reports a ranked match; on confirmation, both players'
    /// outstanding ranked pings are cleaned up
    pub async fn report_match(&self, guild: GuildId, report: MatchReport) -> Result<ReportOutcome> {
        let outcome = self.confirmation.report_match(guild, report.clone()).await?;
        if matches!(outcome, ReportOutcome::Confirmed(_)) {
            self.registry.remove(report.winner_id, QueueType::Ranked)?;
            self.registry.remove(report.loser_id, QueueType::Ranked)?;
        }
        Ok(outcome)
    }

    /// Operator-forced report for abandoned or unreported matches
    pub async fn force_report_match(
        &self,
        guild: GuildId,
        operator: UserId,
        report: MatchReport,
    ) -> Result<ReportOutcome> {
        let outcome = self
            .confirmation
            .force_report_match(guild, operator, report.clone())
            .await?;
        if matches!(outcome, ReportOutcome::Confirmed(_)) {
            self.registry.remove(report.winner_id, QueueType::Ranked)?;
            self.registry.remove(report.loser_id, QueueType::Ranked)?;
        }
        Ok(outcome)
    }

    /// Ladder stats lookup
    ///
    /// Looking up your own stats inside the home community additionally
    /// offers a timed reaction prompt to opt in to (threshold 1) or out of
    /// the tier badge; the prompt timing out changes nothing.
    pub async fn rank_stats(
        &self,
        guild: GuildId,
        channel: ChannelId,
        requester: UserId,
        subject: Option<UserId>,
    ) -> Result<RankStats> {
        let subject = subject.unwrap_or(requester);
        let ranking = self.store.get_or_create(subject)?;
        let stats = RankStats {
            recent: ranking.recent_history(5),
            ranking,
        };

        let self_lookup = subject == requester;
        if self_lookup && guild == self.config.ranked.home_guild {
            self.messenger
                .post(
                    channel,
                    "React within 120s to turn ranked notifications on or off until the next match",
                )
                .await?;

            match self
                .messenger
                .await_reaction(channel, requester, self.config.opt_in_timeout())
                .await?
            {
                Some(ReactionChoice::OptIn) => {
                    self.assigner
                        .reconcile(guild, requester, self.config.ranked.opt_in_role_threshold)
                        .await?;
                }
                Some(ReactionChoice::OptOut) => {
                    self.assigner.opt_out(guild, requester).await?;
                }
                None => {}
            }
        }

        Ok(stats)
    }

    /// Periodic expiry sweep for memory hygiene; runs until the task is
    /// cancelled
    pub async fn run_sweeper(&self) {
        let mut ticker = interval(self.config.sweep_interval());
        loop {
            ticker.tick().await;
            if let Err(error) = self.registry.sweep(current_timestamp()) {
                warn!("Ping sweep failed: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatMessage, InMemoryRoleProvider, InProcessMessenger};
    use crate::types::MatchResult;

    const GUILD: GuildId = 1;
    const ARENA: ChannelId = 1;

    struct TestHarness {
        service: Arc<ArenaService>,
        messenger: Arc<InProcessMessenger>,
        roles: Arc<InMemoryRoleProvider>,
    }

    fn harness() -> TestHarness {
        let config = AppConfig::default();
        let messenger = Arc::new(InProcessMessenger::new());
        let roles = Arc::new(InMemoryRoleProvider::new());
        let service = Arc::new(
            ArenaService::new(config, messenger.clone(), roles.clone()).unwrap(),
        );
        TestHarness {
            service,
            messenger,
            roles,
        }
    }

    fn seed_games(service: &ArenaService, winner: UserId, loser: UserId, count: u32) {
        let store = service.ranking_store();
        for _ in 0..count {
            let winner_row = store.get_or_create(winner).unwrap();
            let loser_row = store.get_or_create(loser).unwrap();
            store
                .apply_result(&MatchResult {
                    winner_id: winner,
                    loser_id: loser,
                    new_winner_elo: winner_row.elo + 16,
                    new_loser_elo: loser_row.elo - 16,
                    delta: 16,
                })
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_unranked_ping_lists_itself() {
        let harness = harness();

        let listing = harness
            .service
            .unranked_ping(1, QueueType::Singles, 50)
            .await
            .unwrap();
        let entries = listing.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ping.user_id, 1);
        assert_eq!(entries[0].minutes_ago, 0);
    }

    #[tokio::test]
    async fn test_unranked_ping_rejects_ranked_queue() {
        let harness = harness();
        assert!(harness
            .service
            .unranked_ping(1, QueueType::Ranked, 50)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_ranked_ping_announces_to_adjacent_tiers() {
        let harness = harness();

        let outcome = harness.service.ranked_ping(1, ARENA).await.unwrap();
        let RankedPingOutcome::Opened {
            listing,
            audience,
            thread,
        } = outcome
        else {
            panic!("expected an opened ping");
        };

        // Unknown player defaults to the middle band; default config roles
        // are 1..=6 so the audience is the band plus both neighbors
        assert_eq!(audience, vec![2, 3, 4]);
        assert_eq!(listing.entries().unwrap().len(), 1);
        assert_eq!(
            listing.entries().unwrap()[0].ping.tier_role,
            Some(3)
        );

        let posts = harness.messenger.posted_messages();
        assert!(posts[0].1.contains("looking for ranked matchmaking games"));
        assert!(posts[0].1.contains("<@&2>"));
        // Thread welcome went into the fresh thread
        assert_eq!(posts[1].0, thread);
    }

    #[tokio::test]
    async fn test_ranked_ping_cooldown_still_returns_listing() {
        let harness = harness();

        harness.service.ranked_ping(1, ARENA).await.unwrap();
        let second = harness.service.ranked_ping(1, ARENA).await.unwrap();

        let RankedPingOutcome::OnCooldown {
            retry_after_seconds,
            listing,
        } = second
        else {
            panic!("expected a cooldown outcome");
        };
        assert!(retry_after_seconds > 0);
        assert_eq!(listing.entries().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ranked_ping_outside_arena_is_rejected_and_refunded() {
        let harness = harness();

        assert!(harness.service.ranked_ping(1, 999).await.is_err());

        // Refund means the valid retry is not on cooldown
        let outcome = harness.service.ranked_ping(1, ARENA).await.unwrap();
        assert!(matches!(outcome, RankedPingOutcome::Opened { .. }));
    }

    #[tokio::test]
    async fn test_clear_pings_resets_every_bucket() {
        let harness = harness();

        harness
            .service
            .unranked_ping(1, QueueType::Singles, 50)
            .await
            .unwrap();
        harness.service.ranked_ping(2, ARENA).await.unwrap();

        harness.service.clear_pings().unwrap();
        assert!(harness
            .service
            .recent_pings(QueueType::Singles)
            .unwrap()
            .is_empty());
        assert!(harness
            .service
            .recent_pings(QueueType::Ranked)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_leaderboard_is_top_ten_by_elo() {
        let harness = harness();
        let store = harness.service.ranking_store();

        for user in 1..=12u64 {
            store.get_or_create(user).unwrap();
            store
                .apply_result(&MatchResult {
                    winner_id: user,
                    loser_id: 100 + user,
                    new_winner_elo: 1000 + user as i64,
                    new_loser_elo: 984,
                    delta: 16,
                })
                .unwrap();
        }

        let board = harness.service.leaderboard().unwrap();
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].user_id, 12);
        assert_eq!(board[0].elo, 1012);
        assert!(board.windows(2).all(|pair| pair[0].elo >= pair[1].elo));
    }

    #[tokio::test]
    async fn test_rank_stats_creates_record_lazily() {
        let harness = harness();

        // Lookup of another user: no prompt, record created with defaults
        let stats = harness
            .service
            .rank_stats(GUILD, ARENA, 1, Some(2))
            .await
            .unwrap();
        assert_eq!(stats.ranking.user_id, 2);
        assert_eq!(stats.ranking.elo, 1000);
        assert!(stats.recent.is_empty());
        assert!(harness.messenger.posted_messages().is_empty());
    }

    #[tokio::test]
    async fn test_self_stats_opt_in_grants_badge_at_one_game() {
        let harness = harness();
        seed_games(&harness.service, 1, 2, 1);

        let task = {
            let service = harness.service.clone();
            tokio::spawn(async move { service.rank_stats(GUILD, ARENA, 1, None).await })
        };
        tokio::task::yield_now().await;
        harness
            .messenger
            .inject_reaction(ARENA, 1, ReactionChoice::OptIn);

        let stats = task.await.unwrap().unwrap();
        assert_eq!(stats.ranking.games(), 1);

        // Elo 1016 is the [950,1050) band: default config role 3
        assert_eq!(harness.roles.user_roles(GUILD, 1).await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_self_stats_opt_out_strips_badges() {
        let harness = harness();
        seed_games(&harness.service, 1, 2, 3);
        harness.roles.grant_role(GUILD, 1, 3).await.unwrap();

        let task = {
            let service = harness.service.clone();
            tokio::spawn(async move { service.rank_stats(GUILD, ARENA, 1, None).await })
        };
        tokio::task::yield_now().await;
        harness
            .messenger
            .inject_reaction(ARENA, 1, ReactionChoice::OptOut);

        task.await.unwrap().unwrap();
        assert!(harness.roles.user_roles(GUILD, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirmed_report_cleans_up_ranked_pings() {
        let harness = harness();
        harness.service.ranked_ping(1, ARENA).await.unwrap();

        let task = {
            let service = harness.service.clone();
            tokio::spawn(async move {
                service
                    .report_match(
                        GUILD,
                        MatchReport {
                            winner_id: 1,
                            loser_id: 2,
                            channel_id: ARENA,
                            parent_channel: None,
                            timestamp: current_timestamp(),
                        },
                    )
                    .await
            })
        };
        tokio::task::yield_now().await;
        harness.messenger.inject_message(ChatMessage {
            author: 2,
            channel_id: ARENA,
            content: "y".to_string(),
        });

        let outcome = task.await.unwrap().unwrap();
        assert!(matches!(outcome, ReportOutcome::Confirmed(_)));
        assert!(harness
            .service
            .recent_pings(QueueType::Ranked)
            .unwrap()
            .is_empty());
    }
}
