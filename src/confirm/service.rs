//! Match confirmation orchestration
//!
//! Runs the full handshake for a reported result: entry guards, the timed
//! acknowledgement wait, the atomic stat commit, and tier reconciliation
//! for both players. Commits for the same user are serialized through
//! per-user locks so overlapping confirmations cannot lose an update.

use crate::chat::{MessageFilter, Messenger, RoleProvider};
use crate::confirm::cooldown::{CooldownCheck, CooldownKind, CooldownTracker};
use crate::confirm::proposal::MatchProposal;
use crate::config::{RankedSettings, RatingSettings};
use crate::error::{ArenaError, Result};
use crate::rating::{EloEngine, RankingStore};
use crate::tiers::TierAssigner;
use crate::types::{GuildId, MatchReport, MatchResult, UserId};
use crate::utils::current_timestamp;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

/// The token the acknowledging party must type, compared case-insensitively
const ACK_TOKEN: &str = "y";

/// Resolution of a report attempt that passed the entry guards
#[derive(Debug, Clone)]
pub enum ReportOutcome {
    /// The opponent acknowledged in time and stats were committed
    Confirmed(MatchResult),
    /// The deadline passed; nothing was written
    TimedOut,
}

/// Per-user commit locks
///
/// Two confirmations sharing a participant must serialize their
/// read-modify-write of that user's record. Locks are taken in sorted user
/// order so two flows over the same pair cannot deadlock.
#[derive(Debug, Default)]
struct CommitLocks {
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl CommitLocks {
    async fn lock_for(&self, user: UserId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(user).or_default().clone()
    }

    async fn lock_pair(&self, a: UserId, b: UserId) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        let first_lock = self.lock_for(first).await;
        let second_lock = self.lock_for(second).await;
        let first_guard = first_lock.lock_owned().await;
        let second_guard = second_lock.lock_owned().await;
        (first_guard, second_guard)
    }
}

/// Orchestrates the two-party confirmation handshake
pub struct MatchConfirmation {
    settings: RankedSettings,
    engine: EloEngine,
    store: Arc<dyn RankingStore>,
    assigner: Arc<TierAssigner>,
    messenger: Arc<dyn Messenger>,
    roles: Arc<dyn RoleProvider>,
    cooldowns: Arc<CooldownTracker>,
    commit_locks: CommitLocks,
}

impl MatchConfirmation {
    pub fn new(
        settings: RankedSettings,
        rating: &RatingSettings,
        store: Arc<dyn RankingStore>,
        assigner: Arc<TierAssigner>,
        messenger: Arc<dyn Messenger>,
        roles: Arc<dyn RoleProvider>,
        cooldowns: Arc<CooldownTracker>,
    ) -> Result<Self> {
        Ok(Self {
            settings,
            engine: EloEngine::new(rating)?,
            store,
            assigner,
            messenger,
            roles,
            cooldowns,
            commit_locks: CommitLocks::default(),
        })
    }

    fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.settings.ack_timeout_seconds)
    }

    fn in_ranked_context(&self, report: &MatchReport) -> bool {
        self.settings.arena_channels.contains(&report.channel_id)
            || report
                .parent_channel
                .map(|parent| self.settings.arena_channels.contains(&parent))
                .unwrap_or(false)
    }

    /// Entry guards shared by both report paths; rejections refund the
    /// reporter's cooldown so the invalid invocation costs nothing
    async fn guard(&self, invoker: UserId, report: &MatchReport) -> Result<()> {
        if !self.in_ranked_context(report) {
            self.cooldowns.refund(invoker, CooldownKind::Report)?;
            return Err(ArenaError::InvalidContext {
                channel_id: report.channel_id,
            }
            .into());
        }

        if report.winner_id == report.loser_id {
            self.cooldowns.refund(invoker, CooldownKind::Report)?;
            return Err(ArenaError::SelfReport {
                user_id: report.winner_id,
            }
            .into());
        }

        if self.roles.is_bot(report.winner_id).await? {
            self.cooldowns.refund(invoker, CooldownKind::Report)?;
            return Err(ArenaError::BotOpponent {
                user_id: report.winner_id,
            }
            .into());
        }
        if self.roles.is_bot(report.loser_id).await? {
            self.cooldowns.refund(invoker, CooldownKind::Report)?;
            return Err(ArenaError::BotOpponent {
                user_id: report.loser_id,
            }
            .into());
        }

        Ok(())
    }

    /// The winner reports a decided match; the named loser must acknowledge
    pub async fn report_match(&self, guild: GuildId, report: MatchReport) -> Result<ReportOutcome> {
        let reporter = report.winner_id;

        if let CooldownCheck::Cooling {
            retry_after_seconds,
        } = self
            .cooldowns
            .try_acquire(reporter, CooldownKind::Report, current_timestamp())?
        {
            return Err(ArenaError::OnCooldown {
                retry_after_seconds,
            }
            .into());
        }

        self.guard(reporter, &report).await?;

        // The named loser must type the acknowledgement token
        let acknowledger = report.loser_id;
        self.run_handshake(guild, report, acknowledger).await
    }

    /// Privileged variant: an operator reports a match between two named
    /// users and types the acknowledgement token themselves
    pub async fn force_report_match(
        &self,
        guild: GuildId,
        operator: UserId,
        report: MatchReport,
    ) -> Result<ReportOutcome> {
        if guild != self.settings.home_guild {
            return Err(ArenaError::InvalidContext {
                channel_id: report.channel_id,
            }
            .into());
        }
        if !self.roles.is_operator(guild, operator).await? {
            return Err(ArenaError::NotPermitted { user_id: operator }.into());
        }

        if let CooldownCheck::Cooling {
            retry_after_seconds,
        } = self
            .cooldowns
            .try_acquire(operator, CooldownKind::Report, current_timestamp())?
        {
            return Err(ArenaError::OnCooldown {
                retry_after_seconds,
            }
            .into());
        }

        self.guard(operator, &report).await?;

        // The reporting operator types the acknowledgement token themselves
        self.run_handshake(guild, report, operator).await
    }

    /// Shared state machine: prompt, timed acknowledgement wait, commit,
    /// tier reconciliation
    async fn run_handshake(
        &self,
        guild: GuildId,
        report: MatchReport,
        acknowledger: UserId,
    ) -> Result<ReportOutcome> {
        let mut proposal = MatchProposal::new(&report);

        self.messenger
            .post(
                report.channel_id,
                &format!(
                    "The winner of the match <@{}> vs. <@{}> is: <@{}>! \
                     <@{}>, do you agree with the result? **Type {} to verify.**",
                    report.winner_id,
                    report.loser_id,
                    report.winner_id,
                    acknowledger,
                    ACK_TOKEN
                ),
            )
            .await?;
        proposal.mark_awaiting_ack()?;

        let filter = MessageFilter::acknowledgement(report.channel_id, acknowledger, ACK_TOKEN);
        let acknowledged = self
            .messenger
            .await_message(filter, self.ack_timeout())
            .await?;

        if acknowledged.is_none() {
            // No data effects: indistinguishable from never having proposed
            proposal.mark_expired()?;
            debug!(
                "Proposal {} expired without acknowledgement from {}",
                proposal.id, acknowledger
            );
            self.messenger
                .post(
                    report.channel_id,
                    "You took too long to respond! Please try reporting the match again.",
                )
                .await?;
            return Ok(ReportOutcome::TimedOut);
        }

        proposal.mark_confirmed()?;
        let result = self.commit(&report).await?;

        info!(
            "Match confirmed: winner {} ({} elo), loser {} ({} elo), delta {}",
            result.winner_id,
            result.new_winner_elo,
            result.loser_id,
            result.new_loser_elo,
            result.delta
        );

        self.messenger
            .post(
                report.channel_id,
                &format!(
                    "Game successfully reported!\n<@{}> won!\n\
                     Updated Elo score: <@{}> = {} (+{}) | <@{}> = {} (-{})",
                    result.winner_id,
                    result.winner_id,
                    result.new_winner_elo,
                    result.delta,
                    result.loser_id,
                    result.new_loser_elo,
                    result.delta
                ),
            )
            .await?;

        let threshold = self.settings.auto_role_threshold;
        self.assigner
            .reconcile(guild, result.winner_id, threshold)
            .await?;
        self.assigner
            .reconcile(guild, result.loser_id, threshold)
            .await?;

        Ok(ReportOutcome::Confirmed(result))
    }

    /// Atomic per-user commit: read both records, compute, write both as one
    /// unit while holding the pair's commit locks
    async fn commit(&self, report: &MatchReport) -> Result<MatchResult> {
        let (_winner_guard, _loser_guard) = self
            .commit_locks
            .lock_pair(report.winner_id, report.loser_id)
            .await;

        let winner_row = self.store.get_or_create(report.winner_id)?;
        let loser_row = self.store.get_or_create(report.loser_id)?;

        let update = self.engine.compute(winner_row.elo, loser_row.elo);
        let result = MatchResult {
            winner_id: report.winner_id,
            loser_id: report.loser_id,
            new_winner_elo: update.new_winner_elo,
            new_loser_elo: update.new_loser_elo,
            delta: update.delta,
        };

        self.store.apply_result(&result)?;
        Ok(result)
    }
}
