//! Two-party match confirmation
//!
//! A reported result only touches the ladder after the named opponent (or,
//! for the privileged force path, the reporting operator) acknowledges it
//! within a hard deadline. This module holds the proposal state machine,
//! the per-command cooldown tracker, and the orchestrating service.

pub mod cooldown;
pub mod proposal;
pub mod service;

// Re-export commonly used types
pub use cooldown::{CooldownCheck, CooldownKind, CooldownTracker};
pub use proposal::{MatchProposal, ProposalState};
pub use service::{MatchConfirmation, ReportOutcome};
