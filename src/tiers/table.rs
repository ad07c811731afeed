//! Static tier table with Elo band lookup and adjacency

use crate::error::Result;
use crate::types::{Elo, RoleId};
use serde::{Deserialize, Serialize};

/// A single rank tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Position in the ladder, 0 (lowest) through 5 (highest)
    pub ordinal: usize,
    /// Inclusive lower Elo bound; `None` for the open-ended bottom tier
    pub lower_bound: Option<Elo>,
    /// Rank badge granted for this tier
    pub role: RoleId,
}

/// Immutable, order-preserving tier configuration
///
/// Bands are lower-inclusive and upper-exclusive: an Elo sitting exactly on
/// a boundary belongs to the higher tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    /// Lower bounds of the six bands, ascending
    pub const LOWER_BOUNDS: [Option<Elo>; 6] = [
        None,
        Some(800),
        Some(950),
        Some(1050),
        Some(1200),
        Some(1300),
    ];

    /// Ordinal of the band new or unknown players are treated as holding
    /// when a ranked ping needs a broadcast audience
    pub const DEFAULT_ORDINAL: usize = 2;

    /// Build the table from the six configured role ids, ascending by band
    pub fn new(roles: &[RoleId]) -> Result<Self> {
        if roles.len() != Self::LOWER_BOUNDS.len() {
            return Err(crate::error::ArenaError::ConfigurationError {
                message: format!(
                    "Expected {} tier roles, got {}",
                    Self::LOWER_BOUNDS.len(),
                    roles.len()
                ),
            }
            .into());
        }

        let tiers = Self::LOWER_BOUNDS
            .iter()
            .zip(roles)
            .enumerate()
            .map(|(ordinal, (lower_bound, role))| Tier {
                ordinal,
                lower_bound: *lower_bound,
                role: *role,
            })
            .collect();

        Ok(Self { tiers })
    }

    /// The tier whose band contains `elo`
    pub fn current_tier(&self, elo: Elo) -> Tier {
        // Highest band first; the bottom tier has no lower bound
        for tier in self.tiers.iter().rev() {
            match tier.lower_bound {
                Some(bound) if elo >= bound => return *tier,
                Some(_) => continue,
                None => return *tier,
            }
        }
        self.tiers[0]
    }

    /// The default tier for users with no ladder record
    pub fn default_tier(&self) -> Tier {
        self.tiers[Self::DEFAULT_ORDINAL]
    }

    /// Tier by ordinal
    pub fn by_ordinal(&self, ordinal: usize) -> Option<Tier> {
        self.tiers.get(ordinal).copied()
    }

    /// `[tier-1, tier, tier+1]` clipped at both ends of the ladder
    pub fn adjacent_tiers(&self, tier: Tier) -> Vec<Tier> {
        let start = tier.ordinal.saturating_sub(1);
        let end = (tier.ordinal + 1).min(self.tiers.len() - 1);
        self.tiers[start..=end].to_vec()
    }

    /// Every tier role, ascending by band
    pub fn all_roles(&self) -> Vec<RoleId> {
        self.tiers.iter().map(|tier| tier.role).collect()
    }

    /// All tiers, ascending by band
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TierTable {
        TierTable::new(&[10, 11, 12, 13, 14, 15]).unwrap()
    }

    #[test]
    fn test_rejects_wrong_role_count() {
        assert!(TierTable::new(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_boundary_values_belong_to_higher_tier() {
        let table = table();

        assert_eq!(table.current_tier(799).ordinal, 0);
        assert_eq!(table.current_tier(800).ordinal, 1);
        assert_eq!(table.current_tier(949).ordinal, 1);
        assert_eq!(table.current_tier(950).ordinal, 2);
        assert_eq!(table.current_tier(1000).ordinal, 2);
        assert_eq!(table.current_tier(1050).ordinal, 3);
        assert_eq!(table.current_tier(1299).ordinal, 4);
        assert_eq!(table.current_tier(1300).ordinal, 5);
        assert_eq!(table.current_tier(2500).ordinal, 5);
    }

    #[test]
    fn test_bottom_tier_is_open_ended() {
        let table = table();
        assert_eq!(table.current_tier(0).ordinal, 0);
        assert_eq!(table.current_tier(-50).ordinal, 0);
    }

    #[test]
    fn test_adjacency_clips_at_the_ends() {
        let table = table();

        let bottom = table.adjacent_tiers(table.by_ordinal(0).unwrap());
        let ordinals: Vec<usize> = bottom.iter().map(|tier| tier.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1]);

        let top = table.adjacent_tiers(table.by_ordinal(5).unwrap());
        let ordinals: Vec<usize> = top.iter().map(|tier| tier.ordinal).collect();
        assert_eq!(ordinals, vec![4, 5]);

        let middle = table.adjacent_tiers(table.by_ordinal(2).unwrap());
        let ordinals: Vec<usize> = middle.iter().map(|tier| tier.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }

    #[test]
    fn test_default_tier_is_the_middle_band() {
        let table = table();
        let default = table.default_tier();
        assert_eq!(default.ordinal, 2);
        assert_eq!(default.lower_bound, Some(950));
    }

    #[test]
    fn test_all_roles_ascending() {
        assert_eq!(table().all_roles(), vec![10, 11, 12, 13, 14, 15]);
    }
}
