//! Tier radius table
//!
//! Owned by each simulation instead of living in process-wide state.

use serde::{Deserialize, Serialize};

use crate::consts::{BASE_RADIUS, NUM_RADII, NUM_RANDOM_RADII, RADIUS_GROWTH};

/// Ascending radii, one per size tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusTable {
    radii: [f32; NUM_RADII],
}

impl Default for RadiusTable {
    fn default() -> Self {
        Self::geometric()
    }
}

impl RadiusTable {
    /// `radii[0] = 1/3`, each following tier `RADIUS_GROWTH` times larger
    pub fn geometric() -> Self {
        let mut radii = [BASE_RADIUS; NUM_RADII];
        for i in 1..NUM_RADII {
            radii[i] = radii[i - 1] * RADIUS_GROWTH;
        }
        Self { radii }
    }

    /// Radius for a tier, clamping out-of-range tiers to the largest
    #[inline]
    pub fn get(&self, tier: u32) -> f32 {
        self.radii[Self::clamp_tier(tier) as usize]
    }

    /// Clamp a tier index into `0..NUM_RADII`
    #[inline]
    pub fn clamp_tier(tier: u32) -> u32 {
        tier.min(NUM_RADII as u32 - 1)
    }

    /// Largest tier index
    #[inline]
    pub fn max_tier(&self) -> u32 {
        NUM_RADII as u32 - 1
    }

    pub fn len(&self) -> usize {
        NUM_RADII
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Tiers eligible for random spawns
    pub fn num_random(&self) -> usize {
        NUM_RANDOM_RADII
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.radii
    }
}
