//! Ranked Arena - community matchmaking and ranking engine
//!
//! This crate provides the core of a chat-bot matchmaking system: a
//! time-bounded ping registry shared by all queue types, a classic Elo
//! rating engine, a two-party match-confirmation handshake, and tier
//! (rank badge) assignment. The chat platform itself is consumed through
//! collaborator traits.

pub mod chat;
pub mod config;
pub mod confirm;
pub mod error;
pub mod pings;
pub mod rating;
pub mod service;
pub mod tiers;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{ArenaError, Result};
pub use types::*;

// Re-export key components
pub use confirm::{MatchConfirmation, ReportOutcome};
pub use pings::{PingRegistry, RecentPings};
pub use rating::{EloEngine, RankingStore};
pub use service::ArenaService;
pub use tiers::{TierAssigner, TierTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
