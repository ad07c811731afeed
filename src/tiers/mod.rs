//! Tier (rank badge) table and assignment
//!
//! Six Elo bands map to visible rank roles. The table is immutable,
//! ordinal-indexed configuration loaded once at startup; the assigner
//! reconciles a user's badge against their current Elo.

pub mod assigner;
pub mod table;

// Re-export commonly used types
pub use assigner::TierAssigner;
pub use table::{Tier, TierTable};
