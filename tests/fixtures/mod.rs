//! Shared harness for integration testing
//!
//! Builds the assembled engine on the in-process chat adapter so tests can
//! script both sides of a confirmation exchange.

use ranked_arena::chat::{ChatMessage, InMemoryRoleProvider, InProcessMessenger};
use ranked_arena::config::AppConfig;
use ranked_arena::confirm::ReportOutcome;
use ranked_arena::service::ArenaService;
use ranked_arena::types::{ChannelId, Elo, GuildId, MatchReport, MatchResult, UserId};
use ranked_arena::utils::current_timestamp;
use std::sync::Arc;

/// The home community id used by the default test configuration
pub const GUILD: GuildId = 1;
/// The arena channel id used by the default test configuration
pub const ARENA: ChannelId = 1;

/// An engine wired on the in-process collaborators
pub struct TestSystem {
    pub service: Arc<ArenaService>,
    pub messenger: Arc<InProcessMessenger>,
    pub roles: Arc<InMemoryRoleProvider>,
}

/// Build a complete engine with the default configuration
///
/// The defaults put one arena channel (id 1), home guild 1, and six tier
/// roles with ids 1 through 6 (so the middle band carries role 3).
pub fn create_test_system() -> TestSystem {
    let messenger = Arc::new(InProcessMessenger::new());
    let roles = Arc::new(InMemoryRoleProvider::new());
    let service = Arc::new(
        ArenaService::new(AppConfig::default(), messenger.clone(), roles.clone())
            .expect("default configuration must wire up"),
    );

    TestSystem {
        service,
        messenger,
        roles,
    }
}

impl TestSystem {
    /// Write a finished match straight into the ladder, bypassing the
    /// confirmation flow, to set up rating/history preconditions
    pub fn seed_result(
        &self,
        winner: UserId,
        loser: UserId,
        new_winner_elo: Elo,
        new_loser_elo: Elo,
        delta: Elo,
    ) {
        let store = self.service.ranking_store();
        store.get_or_create(winner).expect("seed winner row");
        store.get_or_create(loser).expect("seed loser row");
        store
            .apply_result(&MatchResult {
                winner_id: winner,
                loser_id: loser,
                new_winner_elo,
                new_loser_elo,
                delta,
            })
            .expect("seed result");
    }

    /// A report filed directly in the arena channel
    pub fn arena_report(&self, winner: UserId, loser: UserId) -> MatchReport {
        MatchReport {
            winner_id: winner,
            loser_id: loser,
            channel_id: ARENA,
            parent_channel: None,
            timestamp: current_timestamp(),
        }
    }

    /// Run a report through the handshake, answering the prompt with the
    /// acknowledgement token typed by `acknowledger`
    pub async fn report_with_ack(
        &self,
        report: MatchReport,
        acknowledger: UserId,
    ) -> ReportOutcome {
        let task = {
            let service = self.service.clone();
            let report = report.clone();
            tokio::spawn(async move { service.report_match(GUILD, report).await })
        };

        // Let the report task reach its subscription before injecting
        tokio::task::yield_now().await;
        self.messenger.inject_message(ChatMessage {
            author: acknowledger,
            channel_id: report.channel_id,
            content: "y".to_string(),
        });

        task.await
            .expect("report task must not panic")
            .expect("guarded report must resolve")
    }

    /// Run an operator-forced report, with the operator answering the prompt
    pub async fn force_report_with_ack(
        &self,
        operator: UserId,
        report: MatchReport,
    ) -> ReportOutcome {
        let task = {
            let service = self.service.clone();
            let report = report.clone();
            tokio::spawn(async move { service.force_report_match(GUILD, operator, report).await })
        };

        tokio::task::yield_now().await;
        self.messenger.inject_message(ChatMessage {
            author: operator,
            channel_id: report.channel_id,
            content: "y".to_string(),
        });

        task.await
            .expect("force report task must not panic")
            .expect("guarded force report must resolve")
    }
}
