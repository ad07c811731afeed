//! Match proposal state machine
//!
//! A proposal lives only for the duration of one confirmation exchange and
//! is discarded on resolution; it is never persisted.

use crate::error::Result;
use crate::types::{ChannelId, MatchReport, ProposalId, UserId};
use crate::utils::{current_timestamp, generate_proposal_id};
use chrono::{DateTime, Utc};

/// Possible states of a match proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalState {
    /// Guards passed, no prompt emitted yet
    Proposed,
    /// Prompt emitted, waiting for the acknowledgement token
    AwaitingAck,
    /// Acknowledged in time; stats were committed (terminal)
    Confirmed,
    /// Deadline passed with no acknowledgement; no data effects (terminal)
    Expired,
}

/// A transient two-party confirmation exchange
#[derive(Debug, Clone)]
pub struct MatchProposal {
    pub id: ProposalId,
    pub winner_id: UserId,
    pub loser_id: UserId,
    pub channel_id: ChannelId,
    pub opened_at: DateTime<Utc>,
    state: ProposalState,
}

impl MatchProposal {
    /// Open a proposal from a guarded report
    pub fn new(report: &MatchReport) -> Self {
        Self {
            id: generate_proposal_id(),
            winner_id: report.winner_id,
            loser_id: report.loser_id,
            channel_id: report.channel_id,
            opened_at: current_timestamp(),
            state: ProposalState::Proposed,
        }
    }

    pub fn state(&self) -> ProposalState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ProposalState::Confirmed | ProposalState::Expired)
    }

    /// Transition to awaiting the acknowledgement token
    pub fn mark_awaiting_ack(&mut self) -> Result<()> {
        if self.state != ProposalState::Proposed {
            return Err(crate::error::ArenaError::InternalError {
                message: format!(
                    "Proposal {} cannot await acknowledgement from state {:?}",
                    self.id, self.state
                ),
            }
            .into());
        }
        self.state = ProposalState::AwaitingAck;
        Ok(())
    }

    /// Transition to confirmed after a matching acknowledgement
    pub fn mark_confirmed(&mut self) -> Result<()> {
        if self.state != ProposalState::AwaitingAck {
            return Err(crate::error::ArenaError::InternalError {
                message: format!(
                    "Proposal {} cannot confirm from state {:?}",
                    self.id, self.state
                ),
            }
            .into());
        }
        self.state = ProposalState::Confirmed;
        Ok(())
    }

    /// Transition to expired after the deadline passed
    pub fn mark_expired(&mut self) -> Result<()> {
        if self.state != ProposalState::AwaitingAck {
            return Err(crate::error::ArenaError::InternalError {
                message: format!(
                    "Proposal {} cannot expire from state {:?}",
                    self.id, self.state
                ),
            }
            .into());
        }
        self.state = ProposalState::Expired;
        Ok(())
    }
}
