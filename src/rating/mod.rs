//! Elo rating engine and ladder record storage
//!
//! This module provides the classic two-player Elo calculation and the
//! storage interface for per-user ladder records.

pub mod elo;
pub mod store;

// Re-export commonly used types
pub use elo::{EloEngine, EloUpdate};
pub use store::{InMemoryRankingStore, RankingStore};
