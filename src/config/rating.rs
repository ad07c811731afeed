//! Rating engine settings

use serde::{Deserialize, Serialize};

/// Settings for the classic Elo rating calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingSettings {
    /// K-factor applied to every decided match
    pub k_factor: u32,
    /// Starting Elo for new ladder records
    pub default_elo: i64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: 32,
            default_elo: 1000,
        }
    }
}
