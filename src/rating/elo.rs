//! Classic Elo rating calculation
//!
//! Pure calculation with no state: given the winner's and loser's current
//! ratings, produce both new ratings and the winner-side delta.

use crate::config::RatingSettings;
use crate::error::Result;
use crate::types::Elo;
use serde::{Deserialize, Serialize};

/// Result of a single Elo calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EloUpdate {
    pub new_winner_elo: Elo,
    pub new_loser_elo: Elo,
    /// Winner-side gain, `new_winner_elo - winner_elo`
    pub delta: Elo,
}

/// Classic Elo rating engine
///
/// Both sides are rounded independently (half away from zero, via
/// `f64::round`), matching the reference ladder behavior. The loser's loss
/// is therefore not forced to equal the winner's gain; callers that display
/// both changes must read them from the update rather than negate `delta`.
#[derive(Debug, Clone)]
pub struct EloEngine {
    k_factor: f64,
}

impl EloEngine {
    /// Create an engine from rating settings
    pub fn new(settings: &RatingSettings) -> Result<Self> {
        if settings.k_factor == 0 {
            return Err(crate::error::ArenaError::ConfigurationError {
                message: "Elo K-factor must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(Self {
            k_factor: settings.k_factor as f64,
        })
    }

    /// Compute new ratings for a decided match
    pub fn compute(&self, winner_elo: Elo, loser_elo: Elo) -> EloUpdate {
        let winner_expected =
            1.0 / (1.0 + 10f64.powf((loser_elo - winner_elo) as f64 / 400.0));
        let loser_expected =
            1.0 / (1.0 + 10f64.powf((winner_elo - loser_elo) as f64 / 400.0));

        let new_winner_elo =
            (winner_elo as f64 + self.k_factor * (1.0 - winner_expected)).round() as Elo;
        let new_loser_elo =
            (loser_elo as f64 + self.k_factor * (0.0 - loser_expected)).round() as Elo;

        EloUpdate {
            new_winner_elo,
            new_loser_elo,
            delta: new_winner_elo - winner_elo,
        }
    }
}

impl Default for EloEngine {
    fn default() -> Self {
        Self { k_factor: 32.0 }
    }
}
