//! Service wiring and command surface
//!
//! Aggregates the core components behind the operations the hosting
//! chat-bot exposes as commands.

pub mod app;

// Re-export commonly used types
pub use app::{ArenaService, RankStats, RankedPingOutcome};
